use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{load_game_config, GameConfig, SETTINGS_FILE_NAME};
use super::overworld::OverworldScene;
use super::petcare::PetCareScene;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) overworld: Box<dyn Scene>,
    pub(crate) pet_care: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Kaugame Startup ===");

    let paths = resolve_app_paths()?;
    let settings_path = paths.assets_dir.join(SETTINGS_FILE_NAME);
    let game_config = match load_game_config(&settings_path) {
        Ok(config) => config,
        Err(error) => {
            warn!(error = %error, "settings_invalid_using_defaults");
            GameConfig::default()
        }
    };

    Ok(wire_scenes(game_config, paths))
}

fn wire_scenes(game_config: GameConfig, paths: AppPaths) -> AppWiring {
    let config = game_config.loop_config();
    let overworld = OverworldScene::new(game_config.overworld, paths.maps_dir.clone());
    let pet_care = PetCareScene::new(&game_config.pet, &paths.save_dir);

    AppWiring {
        config,
        paths,
        overworld: Box::new(overworld),
        pet_care: Box::new(pet_care),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use engine::SceneKey;

    use super::*;

    #[test]
    fn wiring_uses_configured_window() {
        let mut game_config = GameConfig::default();
        game_config.window.title = "Test".to_string();
        let paths = AppPaths {
            root: PathBuf::from("/game"),
            assets_dir: PathBuf::from("/game/assets"),
            maps_dir: PathBuf::from("/game/assets/maps"),
            save_dir: PathBuf::from("/game/saves"),
        };

        let wiring = wire_scenes(game_config, paths);
        assert_eq!(wiring.config.window_title, "Test");
        assert_eq!(wiring.config.start_scene, SceneKey::Overworld);
        assert_eq!(wiring.paths.save_dir, PathBuf::from("/game/saves"));
        assert!(wiring.overworld.debug_title().is_none());
        assert!(wiring.pet_care.debug_title().is_some());
    }
}
