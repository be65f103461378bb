use std::collections::HashMap;

use engine::{FrameRef, Rect, Vec2};

use crate::app::config::OverworldConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Row order of a character sheet.
    pub(crate) const SHEET_ROWS: [Facing; 4] =
        [Facing::Down, Facing::Left, Facing::Right, Facing::Up];

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Animation state: a facing plus whether the entity is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct AnimationKey {
    pub(crate) facing: Facing,
    pub(crate) moving: bool,
}

impl AnimationKey {
    pub(crate) fn name(self) -> String {
        if self.moving {
            self.facing.as_str().to_string()
        } else {
            format!("{}_idle", self.facing.as_str())
        }
    }
}

/// Walk and idle frames for every facing of one character sheet.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharacterFrames {
    frames: HashMap<AnimationKey, Vec<FrameRef>>,
    frame_size: Vec2,
}

impl CharacterFrames {
    pub(crate) fn new(frames: HashMap<AnimationKey, Vec<FrameRef>>, frame_size: Vec2) -> Self {
        Self { frames, frame_size }
    }

    pub(crate) fn frame_size(&self) -> Vec2 {
        self.frame_size
    }

    pub(crate) fn get(&self, key: AnimationKey) -> &[FrameRef] {
        self.frames.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Movement tuning shared by every character on a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EntityTuning {
    pub(crate) speed: f32,
    pub(crate) animation_speed: f32,
    pub(crate) hitbox_width_ratio: f32,
    pub(crate) hitbox_height_inset: f32,
}

impl EntityTuning {
    pub(crate) fn from_config(config: &OverworldConfig) -> Self {
        Self {
            speed: config.player_speed,
            animation_speed: config.animation_speed,
            hitbox_width_ratio: config.hitbox_width_ratio,
            hitbox_height_inset: config.hitbox_height_inset,
        }
    }
}

/// Shared state of the player and NPCs: a visual rectangle centred on the
/// spawn point and a smaller hitbox that follows its centre.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EntityBody {
    pub(crate) rect: Rect,
    pub(crate) hitbox: Rect,
    pub(crate) facing: Facing,
    pub(crate) direction: Vec2,
    pub(crate) speed: f32,
    pub(crate) y_sort: f32,
    pub(crate) blocked: bool,
    frame_index: f32,
    animation_speed: f32,
    frames: CharacterFrames,
}

impl EntityBody {
    pub(crate) fn new(
        center: Vec2,
        facing: Facing,
        frames: CharacterFrames,
        tuning: EntityTuning,
    ) -> Self {
        let size = frames.frame_size();
        let rect = Rect::from_center(center, size.x, size.y);
        let hitbox = rect.inflate(
            -rect.width * tuning.hitbox_width_ratio,
            -tuning.hitbox_height_inset,
        );
        Self {
            rect,
            hitbox,
            facing,
            direction: Vec2::ZERO,
            speed: tuning.speed,
            y_sort: rect.center_y(),
            blocked: false,
            frame_index: 0.0,
            animation_speed: tuning.animation_speed,
            frames,
        }
    }

    pub(crate) fn is_moving(&self) -> bool {
        !self.direction.is_zero()
    }

    /// Turns the facing toward the current direction while moving. The
    /// vertical component wins over the horizontal one.
    fn settle_facing(&mut self) {
        if self.direction.x != 0.0 {
            self.facing = if self.direction.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
        }
        if self.direction.y != 0.0 {
            self.facing = if self.direction.y > 0.0 {
                Facing::Down
            } else {
                Facing::Up
            };
        }
    }

    pub(crate) fn state(&self) -> AnimationKey {
        AnimationKey {
            facing: self.facing,
            moving: self.is_moving(),
        }
    }

    /// One simulation step of animation: settles the facing, then advances
    /// the fractional frame index.
    pub(crate) fn animate(&mut self, dt: f32) {
        self.settle_facing();
        self.frame_index += self.animation_speed * dt;
    }

    pub(crate) fn current_frame(&self) -> Option<&FrameRef> {
        let key = self.state();
        let frames = self.frames.get(key);
        if frames.is_empty() {
            return None;
        }
        let index = (self.frame_index.max(0.0) as usize) % frames.len();
        frames.get(index)
    }

    pub(crate) fn frame_size(&self) -> Vec2 {
        self.frames.frame_size()
    }

    pub(crate) fn recenter_hitbox(&mut self) {
        self.hitbox.set_center(self.rect.center());
    }

    pub(crate) fn block(&mut self) {
        self.blocked = true;
        self.direction = Vec2::ZERO;
    }

    pub(crate) fn unblock(&mut self) {
        self.blocked = false;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{frames, tuning};
    use super::*;

    fn body() -> EntityBody {
        EntityBody::new(
            Vec2::new(100.0, 100.0),
            Facing::Down,
            frames(Vec2::new(128.0, 128.0)),
            tuning(),
        )
    }

    #[test]
    fn hitbox_is_inset_and_centred() {
        let body = body();
        assert_eq!(body.rect, Rect::new(36.0, 36.0, 128.0, 128.0));
        assert_eq!(body.hitbox.width, 64.0);
        assert_eq!(body.hitbox.height, 68.0);
        assert_eq!(body.hitbox.center(), body.rect.center());
        assert_eq!(body.y_sort, 100.0);
    }

    #[test]
    fn vertical_direction_wins_facing() {
        let mut body = body();
        body.direction = Vec2::new(1.0, -1.0).normalize_or_zero();
        body.animate(0.0);
        let key = body.state();
        assert_eq!(key.facing, Facing::Up);
        assert!(key.moving);
        assert_eq!(key.name(), "up");

        body.direction = Vec2::new(-1.0, 0.0);
        body.animate(0.0);
        assert_eq!(body.state().facing, Facing::Left);
    }

    #[test]
    fn idle_keeps_last_facing() {
        let mut body = body();
        body.direction = Vec2::new(1.0, 0.0);
        body.animate(1.0 / 60.0);
        body.direction = Vec2::ZERO;
        body.animate(1.0 / 60.0);
        let key = body.state();
        assert_eq!(key.facing, Facing::Right);
        assert_eq!(key.name(), "right_idle");
    }

    #[test]
    fn animation_wraps_over_frame_count() {
        let mut body = body();
        body.direction = Vec2::new(0.0, 1.0);
        body.animate(0.5);
        body.animate(0.5);
        let frame = body.current_frame().cloned().expect("frame");
        assert_eq!(frame.source.map(|source| source.x), Some(2));

        body.direction = Vec2::ZERO;
        let idle = body.current_frame().cloned().expect("idle frame");
        assert_eq!(idle.source.map(|source| source.x), Some(0));
    }

    #[test]
    fn block_zeroes_direction_until_unblocked() {
        let mut body = body();
        body.direction = Vec2::new(0.0, 1.0);
        body.block();
        assert!(body.blocked);
        assert!(!body.is_moving());
        body.unblock();
        assert!(!body.blocked);
    }

    #[test]
    fn facing_parses_map_properties() {
        assert_eq!(Facing::parse("left"), Some(Facing::Left));
        assert_eq!(Facing::parse("sideways"), None);
    }
}
