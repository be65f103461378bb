use engine::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

/// Pushes `hitbox` out of every obstacle it overlaps along one axis. The
/// side it snaps to comes from the sign of `direction` on that axis; a zero
/// component leaves the hitbox where it is. Returns whether anything was hit.
pub(crate) fn resolve_axis(
    hitbox: &mut Rect,
    direction: Vec2,
    axis: Axis,
    obstacles: &[Rect],
) -> bool {
    let mut hit = false;
    for obstacle in obstacles {
        if !hitbox.overlaps(obstacle) {
            continue;
        }
        hit = true;
        match axis {
            Axis::Horizontal => {
                if direction.x > 0.0 {
                    hitbox.set_right(obstacle.left());
                } else if direction.x < 0.0 {
                    hitbox.set_left(obstacle.right());
                }
            }
            Axis::Vertical => {
                if direction.y > 0.0 {
                    hitbox.set_bottom(obstacle.top());
                } else if direction.y < 0.0 {
                    hitbox.set_top(obstacle.bottom());
                }
            }
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_right_snaps_to_left_edge() {
        let mut hitbox = Rect::new(95.0, 0.0, 10.0, 10.0);
        let obstacles = [Rect::new(100.0, -50.0, 20.0, 100.0)];
        assert!(resolve_axis(
            &mut hitbox,
            Vec2::new(1.0, 0.0),
            Axis::Horizontal,
            &obstacles
        ));
        assert_eq!(hitbox.right(), 100.0);
    }

    #[test]
    fn moving_up_snaps_to_bottom_edge() {
        let mut hitbox = Rect::new(0.0, 15.0, 10.0, 10.0);
        let obstacles = [Rect::new(-10.0, 0.0, 40.0, 20.0)];
        resolve_axis(&mut hitbox, Vec2::new(0.0, -1.0), Axis::Vertical, &obstacles);
        assert_eq!(hitbox.top(), 20.0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let mut hitbox = Rect::new(90.0, 0.0, 10.0, 10.0);
        let obstacles = [Rect::new(100.0, 0.0, 10.0, 10.0)];
        assert!(!resolve_axis(
            &mut hitbox,
            Vec2::new(1.0, 0.0),
            Axis::Horizontal,
            &obstacles
        ));
        assert_eq!(hitbox.x, 90.0);
    }

    #[test]
    fn zero_component_leaves_overlap_in_place() {
        let mut hitbox = Rect::new(95.0, 0.0, 10.0, 10.0);
        let obstacles = [Rect::new(100.0, 0.0, 10.0, 10.0)];
        assert!(resolve_axis(
            &mut hitbox,
            Vec2::new(0.0, 1.0),
            Axis::Horizontal,
            &obstacles
        ));
        assert_eq!(hitbox.x, 95.0);
    }
}
