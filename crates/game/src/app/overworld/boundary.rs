use engine::Vec2;

use crate::app::config::ContainmentConfig;

/// Box the player's centre is kept inside while away from home.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ContainmentBox {
    pub(crate) enabled: bool,
    pub(crate) center: Vec2,
    pub(crate) half_extents: Vec2,
}

impl ContainmentBox {
    pub(crate) fn from_config(config: &ContainmentConfig) -> Self {
        Self {
            enabled: config.enabled,
            center: config.center(),
            half_extents: config.half_extents(),
        }
    }

    /// Clamps `point` into the box and truncates it to whole pixels.
    /// Returns the point unchanged when the box is disabled.
    pub(crate) fn clamp(&self, point: Vec2) -> Vec2 {
        if !self.enabled {
            return point;
        }
        let min = self.center - self.half_extents;
        let max = self.center + self.half_extents;
        Vec2::new(
            point.x.clamp(min.x, max.x).trunc(),
            point.y.clamp(min.y, max.y).trunc(),
        )
    }
}
