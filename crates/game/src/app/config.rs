use std::fs;
use std::path::{Path, PathBuf};

use engine::{LoopConfig, SceneKey, Vec2};
use serde::Deserialize;
use thiserror::Error;

pub(crate) const SETTINGS_FILE_NAME: &str = "settings.json";

/// Tuning for the whole game. Every field has a default, so a missing or
/// partial `settings.json` is fine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) overworld: OverworldConfig,
    pub(crate) pet: PetConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) target_tps: u32,
    pub(crate) max_render_fps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OverworldConfig {
    pub(crate) tile_size: f32,
    pub(crate) animation_speed: f32,
    pub(crate) player_speed: f32,
    /// Fraction of the sprite width removed from the hitbox.
    pub(crate) hitbox_width_ratio: f32,
    /// Pixels removed from the sprite height for the hitbox.
    pub(crate) hitbox_height_inset: f32,
    pub(crate) tint_speed: f32,
    pub(crate) start_map: String,
    pub(crate) start_spawn: String,
    pub(crate) home_map: String,
    pub(crate) containment: ContainmentConfig,
    pub(crate) characters_dir: String,
    pub(crate) water_dir: String,
    pub(crate) coast_sheet: String,
    pub(crate) character_fallback_size: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ContainmentConfig {
    pub(crate) enabled: bool,
    pub(crate) center_x: f32,
    pub(crate) center_y: f32,
    pub(crate) half_width: f32,
    pub(crate) half_height: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PetConfig {
    pub(crate) feed_cost: u32,
    pub(crate) clean_cost: u32,
    pub(crate) health_check_cost: u32,
    pub(crate) save_file: String,
    pub(crate) images_dir: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kaugame".to_string(),
            width: 1280,
            height: 720,
            target_tps: 60,
            max_render_fps: Some(60),
        }
    }
}

impl Default for OverworldConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            animation_speed: 6.0,
            player_speed: 250.0,
            hitbox_width_ratio: 0.5,
            hitbox_height_inset: 60.0,
            tint_speed: 400.0,
            start_map: "world".to_string(),
            start_spawn: "house".to_string(),
            home_map: "house".to_string(),
            containment: ContainmentConfig::default(),
            characters_dir: "graphics/characters".to_string(),
            water_dir: "graphics/tilesets/water".to_string(),
            coast_sheet: "graphics/tilesets/coast.png".to_string(),
            character_fallback_size: 128.0,
        }
    }
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            center_x: 4223.94,
            center_y: 3661.26,
            half_width: 180.0,
            half_height: 150.0,
        }
    }
}

impl ContainmentConfig {
    pub(crate) fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }

    pub(crate) fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            feed_cost: 5,
            clean_cost: 3,
            health_check_cost: 10,
            save_file: "pet_save.json".to_string(),
            images_dir: "graphics/pets".to_string(),
        }
    }
}

impl GameConfig {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window.title.clone(),
            window_width: self.window.width,
            window_height: self.window.height,
            target_tps: self.window.target_tps,
            max_render_fps: self.window.max_render_fps,
            start_scene: SceneKey::Overworld,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be positive"));
        }
        if self.window.target_tps == 0 {
            return Err(invalid("window.target_tps", "must be positive"));
        }
        if self.window.max_render_fps == Some(0) {
            return Err(invalid("window.max_render_fps", "must be positive or null"));
        }

        let overworld = &self.overworld;
        require_positive("overworld.tile_size", overworld.tile_size)?;
        require_non_negative("overworld.animation_speed", overworld.animation_speed)?;
        require_non_negative("overworld.player_speed", overworld.player_speed)?;
        require_positive("overworld.tint_speed", overworld.tint_speed)?;
        require_positive(
            "overworld.character_fallback_size",
            overworld.character_fallback_size,
        )?;
        if !(0.0..1.0).contains(&overworld.hitbox_width_ratio) {
            return Err(invalid(
                "overworld.hitbox_width_ratio",
                "must be in [0, 1)",
            ));
        }
        require_non_negative("overworld.hitbox_height_inset", overworld.hitbox_height_inset)?;
        require_non_negative(
            "overworld.containment.half_width",
            overworld.containment.half_width,
        )?;
        require_non_negative(
            "overworld.containment.half_height",
            overworld.containment.half_height,
        )?;
        if overworld.start_map.trim().is_empty() {
            return Err(invalid("overworld.start_map", "must not be empty"));
        }

        let save_file = self.pet.save_file.trim();
        if save_file.is_empty() || save_file.contains(['/', '\\']) || save_file == ".." {
            return Err(invalid("pet.save_file", "must be a plain file name"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings {path} at {field_path}: {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reads `path`, or returns the defaults when the file does not exist.
pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    if !path.exists() {
        return Ok(GameConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_game_config(path, &raw)
}

fn parse_game_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: GameConfig =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field_path = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                field_path,
                source: error.into_inner(),
            }
        })?;
    config.validate()?;
    Ok(config)
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn parse(raw: &str) -> Result<GameConfig, ConfigError> {
        parse_game_config(Path::new("settings.json"), raw)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_game_config(&temp.path().join(SETTINGS_FILE_NAME)).expect("config");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.overworld.player_speed, 250.0);
        assert_eq!(config.pet.save_file, "pet_save.json");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse(r#"{ "overworld": { "player_speed": 300 }, "pet": { "feed_cost": 7 } }"#)
            .expect("config");
        assert_eq!(config.overworld.player_speed, 300.0);
        assert_eq!(config.overworld.tile_size, 64.0);
        assert_eq!(config.pet.feed_cost, 7);
        assert_eq!(config.pet.clean_cost, 3);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn parse_error_reports_field_path() {
        let error = parse(r#"{ "overworld": { "tint_speed": "fast" } }"#).expect_err("error");
        match error {
            ConfigError::Parse { field_path, .. } => {
                assert_eq!(field_path, "overworld.tint_speed")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse(r#"{ "window": { "colour": "red" } }"#).expect_err("error");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = parse(r#"{ "overworld": { "tile_size": 0 } }"#).expect_err("error");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "overworld.tile_size",
                ..
            }
        ));

        let error = parse(r#"{ "pet": { "save_file": "../pet.json" } }"#).expect_err("error");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "pet.save_file",
                ..
            }
        ));
    }

    #[test]
    fn loop_config_follows_window_section() {
        let config = parse(r#"{ "window": { "title": "Test", "target_tps": 30, "max_render_fps": null } }"#)
            .expect("config");
        let loop_config = config.loop_config();
        assert_eq!(loop_config.window_title, "Test");
        assert_eq!(loop_config.target_tps, 30);
        assert_eq!(loop_config.max_render_fps, None);
        assert_eq!(loop_config.start_scene, SceneKey::Overworld);
        assert_eq!(loop_config.metrics_log_interval, Duration::from_secs(5));
    }
}
