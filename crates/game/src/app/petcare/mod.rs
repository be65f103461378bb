mod pet;
mod save;
mod ui;

use std::path::{Path, PathBuf};

use engine::{Canvas, InputSnapshot, Scene, SceneCommand, SceneKey, SpriteCache};
use tracing::{debug, info, warn};

use crate::app::config::PetConfig;

use self::pet::{Pet, PetAction, PetCosts};
use self::save::{load_pet, save_pet};
use self::ui::{PetUi, UiCommand};

/// Pet status screen. The pet is loaded on scene load and written back
/// whenever the scene is left or torn down.
pub(crate) struct PetCareScene {
    pet: Pet,
    ui: PetUi,
    costs: PetCosts,
    save_path: PathBuf,
}

impl PetCareScene {
    pub(crate) fn new(config: &PetConfig, save_dir: &Path) -> Self {
        let costs = PetCosts::from_config(config);
        let pet = Pet::default();
        let mut ui = PetUi::new(costs, config.images_dir.as_str());
        ui.sync_name(&pet.name);
        Self {
            pet,
            ui,
            costs,
            save_path: save_dir.join(&config.save_file),
        }
    }

    fn apply(&mut self, command: UiCommand) {
        match command {
            UiCommand::Act(action) => {
                if self.pet.apply(action, self.costs) {
                    debug!(action = action.as_str(), money = self.pet.money(), "pet_action");
                } else {
                    let reason = self.refusal(action);
                    debug!(action = action.as_str(), reason, "pet_action_refused");
                    self.ui.show_status(reason);
                }
            }
            UiCommand::NextSpecies => {
                self.pet.species = self.pet.species.next();
                info!(species = self.pet.species.as_str(), "pet_species_changed");
            }
            UiCommand::Rename(name) => {
                info!(name = %name, "pet_renamed");
                self.pet.name = name;
                self.ui.sync_name(&self.pet.name);
            }
        }
    }

    fn refusal(&self, action: PetAction) -> &'static str {
        let cost = match action {
            PetAction::Feed => self.costs.feed,
            PetAction::Clean => self.costs.clean,
            PetAction::HealthCheck => self.costs.health_check,
            PetAction::Play => return "Too tired or hungry to play",
            PetAction::Rest => return "Cannot rest now",
        };
        if self.pet.money() < cost {
            "Not enough money"
        } else {
            "Already full"
        }
    }

    fn persist(&self) {
        match save_pet(&self.save_path, &self.pet) {
            Ok(()) => info!(path = %self.save_path.display(), "pet_saved"),
            Err(error) => warn!(error = %error, "pet_save_failed"),
        }
    }
}

impl Scene for PetCareScene {
    fn load(&mut self, _sprites: &mut SpriteCache) {
        match load_pet(&self.save_path) {
            Ok(Some(pet)) => {
                info!(name = %pet.name, species = pet.species.as_str(), "pet_loaded");
                self.pet = pet;
            }
            Ok(None) => info!(path = %self.save_path.display(), "pet_save_missing"),
            Err(error) => warn!(error = %error, "pet_load_failed"),
        }
        self.ui.sync_name(&self.pet.name);
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.switch_scene_pressed() && !self.ui.is_editing() {
            return SceneCommand::SwitchTo(SceneKey::Overworld);
        }

        self.pet.pass_time(fixed_dt_seconds);
        self.ui.tick(fixed_dt_seconds);
        for command in self.ui.handle_input(input) {
            self.apply(command);
        }
        SceneCommand::None
    }

    fn render(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache) {
        self.ui.draw(canvas, sprites, &self.pet);
    }

    fn unload(&mut self) {
        self.persist();
    }

    fn deactivate(&mut self) {
        self.persist();
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "{} the {} | ${} | {}",
            self.pet.name,
            self.pet.species.as_str(),
            self.pet.money(),
            self.pet.reaction().as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use engine::Vec2;

    use super::pet::{PetRecord, Species};
    use super::*;

    fn scene_in(dir: &Path) -> PetCareScene {
        let mut scene = PetCareScene::new(&PetConfig::default(), dir);
        let mut sprites = SpriteCache::new(dir.to_path_buf());
        scene.load(&mut sprites);
        scene
    }

    fn click(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::empty()
            .with_window_size((700, 420))
            .with_cursor_position_px(Some(Vec2::new(x, y)))
            .with_left_click_pressed(true)
    }

    #[test]
    fn tab_returns_to_overworld() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = scene_in(temp.path());
        let command = scene.update(
            1.0 / 60.0,
            &InputSnapshot::empty().with_switch_scene_pressed(true),
        );
        assert_eq!(command, SceneCommand::SwitchTo(SceneKey::Overworld));
    }

    #[test]
    fn clicking_clean_spends_money() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = scene_in(temp.path());
        let before = scene.pet.money();

        scene.update(0.0, &click(200.0, 370.0));
        assert_eq!(scene.pet.money(), before - scene.costs.clean);
        assert_eq!(scene.pet.expenses_total(), scene.costs.clean);
    }

    #[test]
    fn refused_action_shows_status() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = scene_in(temp.path());
        scene.pet = Pet::from_record(PetRecord {
            money: 0,
            ..PetRecord::default()
        });

        scene.update(0.0, &click(200.0, 50.0));
        assert_eq!(scene.pet.money(), 0);
        assert_eq!(scene.ui.status(), Some("Not enough money"));
    }

    #[test]
    fn next_species_cycles() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = scene_in(temp.path());
        assert_eq!(scene.pet.species, Species::Cat);
        scene.update(0.0, &click(600.0, 380.0));
        assert_eq!(scene.pet.species, Species::Dog);
    }

    #[test]
    fn deactivate_saves_and_load_restores() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut scene = scene_in(temp.path());
        scene.apply(UiCommand::Rename("Mochi".to_string()));
        scene.apply(UiCommand::NextSpecies);
        scene.deactivate();

        let restored = scene_in(temp.path());
        assert_eq!(restored.pet.name, "Mochi");
        assert_eq!(restored.pet.species, Species::Dog);
        assert_eq!(restored.ui.name_buffer(), "Mochi");
    }

    #[test]
    fn corrupt_save_keeps_default_pet() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("pet_save.json"), "{ not json").expect("write");
        let scene = scene_in(temp.path());
        assert_eq!(scene.pet, Pet::default());
    }
}
