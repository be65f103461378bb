use engine::{InputSnapshot, Rect, Vec2};

use super::boundary::ContainmentBox;
use super::collision::{resolve_axis, Axis};
use super::entity::EntityBody;

/// The controllable character of the current map.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) body: EntityBody,
    pub(crate) obstacles: Vec<Rect>,
    pub(crate) at_home: bool,
    pub(crate) containment: ContainmentBox,
}

impl Player {
    pub(crate) fn new(body: EntityBody, at_home: bool, containment: ContainmentBox) -> Self {
        Self {
            body,
            obstacles: Vec::new(),
            at_home,
            containment,
        }
    }

    pub(crate) fn update(&mut self, dt: f32, input: &InputSnapshot) {
        self.body.y_sort = self.body.rect.center_y();
        if !self.body.blocked {
            self.read_input(input);
            self.move_body(dt);
        }
        self.body.animate(dt);
    }

    fn read_input(&mut self, input: &InputSnapshot) {
        self.body.direction = input.movement_axis().normalize_or_zero();
    }

    /// Moves horizontally, resolves, then vertically, resolves. Containment
    /// applies after both passes.
    pub(crate) fn move_body(&mut self, dt: f32) {
        let step = self.body.direction * (self.body.speed * dt);

        let center_x = self.body.rect.center_x() + step.x;
        self.body.rect.set_center_x(center_x);
        self.body.recenter_hitbox();
        self.resolve(Axis::Horizontal);

        let center_y = self.body.rect.center_y() + step.y;
        self.body.rect.set_center_y(center_y);
        self.body.recenter_hitbox();
        self.resolve(Axis::Vertical);

        if !self.at_home {
            let clamped = self.containment.clamp(self.body.rect.center());
            self.body.rect.set_center(clamped);
            self.body.recenter_hitbox();
        }
    }

    fn resolve(&mut self, axis: Axis) {
        let direction = self.body.direction;
        if resolve_axis(&mut self.body.hitbox, direction, axis, &self.obstacles) {
            let hitbox_center = self.body.hitbox.center();
            match axis {
                Axis::Horizontal => self.body.rect.set_center_x(hitbox_center.x),
                Axis::Vertical => self.body.rect.set_center_y(hitbox_center.y),
            }
        }
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.body.rect.center()
    }

    pub(crate) fn block(&mut self) {
        self.body.block();
    }

    pub(crate) fn unblock(&mut self) {
        self.body.unblock();
    }
}

#[cfg(test)]
mod tests {
    use engine::InputAction;

    use super::*;
    use crate::app::config::ContainmentConfig;
    use crate::app::overworld::entity::test_support::{frames, tuning};
    use crate::app::overworld::entity::Facing;

    fn player_at(center: Vec2, at_home: bool) -> Player {
        let body = EntityBody::new(
            center,
            Facing::Down,
            frames(Vec2::new(128.0, 128.0)),
            tuning(),
        );
        Player::new(
            body,
            at_home,
            ContainmentBox::from_config(&ContainmentConfig::default()),
        )
    }

    fn held(actions: &[InputAction]) -> InputSnapshot {
        actions
            .iter()
            .fold(InputSnapshot::empty(), |snapshot, action| {
                snapshot.with_action_down(*action, true)
            })
    }

    #[test]
    fn rightward_collision_stops_at_left_edge_while_vertical_continues() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        // hitbox spans x 68..132; wall starts at 140 and covers the vertical path
        player.obstacles = vec![Rect::new(140.0, -1000.0, 50.0, 3000.0)];

        player.update(0.1, &held(&[InputAction::MoveRight, InputAction::MoveDown]));

        assert_eq!(player.body.hitbox.right(), 140.0);
        assert_eq!(player.body.rect.center_x(), player.body.hitbox.center_x());
        let step = 250.0 * 0.1 * std::f32::consts::FRAC_1_SQRT_2;
        assert!((player.body.rect.center_y() - (100.0 + step)).abs() < 1e-3);
        assert_eq!(player.body.facing, Facing::Down);
    }

    #[test]
    fn single_tick_of_movement_settles_facing() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        player.update(1.0 / 60.0, &held(&[InputAction::MoveRight]));
        assert_eq!(player.body.facing, Facing::Right);

        player.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(player.body.state().name(), "right_idle");
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        player.update(1.0, &held(&[InputAction::MoveLeft, InputAction::MoveUp]));
        let moved = Vec2::new(100.0, 100.0) - player.center();
        assert!((moved.length() - 250.0).abs() < 1e-2);
    }

    #[test]
    fn blocked_player_ignores_input_but_keeps_animating() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        player.block();
        player.update(1.0, &held(&[InputAction::MoveRight]));
        assert_eq!(player.center(), Vec2::new(100.0, 100.0));
        assert!(!player.body.is_moving());

        player.unblock();
        player.update(0.1, &held(&[InputAction::MoveRight]));
        assert!(player.center().x > 100.0);
    }

    #[test]
    fn containment_applies_away_from_home() {
        let mut player = player_at(Vec2::new(4223.0, 3661.0), false);
        player.update(10.0, &held(&[InputAction::MoveRight]));
        assert_eq!(player.center().x, 4403.0);
        assert_eq!(player.body.hitbox.center(), player.center());
    }

    #[test]
    fn containment_is_skipped_at_home() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        player.update(1.0, &held(&[InputAction::MoveRight]));
        assert_eq!(player.center().x, 350.0);
    }

    #[test]
    fn y_sort_is_taken_before_moving() {
        let mut player = player_at(Vec2::new(100.0, 100.0), true);
        player.update(1.0, &held(&[InputAction::MoveDown]));
        assert_eq!(player.body.y_sort, 100.0);
        assert_eq!(player.center().y, 350.0);
    }
}
