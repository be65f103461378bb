mod boundary;
mod collision;
mod entity;
mod frames;
mod player;
mod registry;
mod setup;
mod sprites;
mod transition;

use std::collections::BTreeMap;
use std::path::PathBuf;

use engine::{
    load_map_directory, Canvas, InputSnapshot, MapData, Rect, Scene, SceneCommand, SceneKey,
    SpriteCache, Vec2,
};
use tracing::{info, warn};

use crate::app::config::OverworldConfig;

use self::entity::AnimationKey;
use self::frames::FrameLibrary;
use self::setup::{build_map_world, MapWorld, SetupError};
use self::transition::{find_trigger, MapTarget, ScreenTint, TintEvent};

const BACKGROUND_COLOR: [u8; 4] = [0, 0, 0, 255];
const MESSAGE_COLOR: [u8; 4] = [230, 230, 230, 255];
const MESSAGE_SCALE: i32 = 3;

/// Walkable tile-map world with map transitions.
pub(crate) struct OverworldScene {
    config: OverworldConfig,
    maps_dir: PathBuf,
    maps: BTreeMap<String, MapData>,
    frames: FrameLibrary,
    world: Option<MapWorld>,
    tint: ScreenTint,
}

impl OverworldScene {
    pub(crate) fn new(config: OverworldConfig, maps_dir: PathBuf) -> Self {
        let tint = ScreenTint::new(config.tint_speed);
        Self {
            config,
            maps_dir,
            maps: BTreeMap::new(),
            frames: FrameLibrary::default(),
            world: None,
            tint,
        }
    }

    fn enter_map(&mut self, target: &MapTarget) -> Result<(), SetupError> {
        let map = self
            .maps
            .get(&target.map)
            .ok_or_else(|| SetupError::MapNotFound {
                map: target.map.clone(),
            })?;
        let world = build_map_world(map, &target.spawn, &self.frames, &self.config)?;
        self.world = Some(world);
        Ok(())
    }

    /// Starts a fade when the player steps into a trigger. Only checked
    /// while the screen is clear.
    fn check_transitions(&mut self) {
        if !self.tint.is_idle() {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let Some(trigger) = find_trigger(&world.triggers, &world.player.body.hitbox) else {
            return;
        };
        let target = trigger.target.clone();
        world.player.block();
        info!(
            from = %world.name,
            to = %target.map,
            spawn = %target.spawn,
            "map_transition_started"
        );
        self.tint.begin(target);
    }

    fn apply_tint_event(&mut self, event: TintEvent) {
        match event {
            TintEvent::None => {}
            TintEvent::SwapMap(target) => {
                if let Err(error) = self.enter_map(&target) {
                    warn!(error = %error, "map_transition_failed");
                }
                // stays frozen until the fade-in finishes
                if let Some(world) = self.world.as_mut() {
                    world.player.block();
                }
            }
            TintEvent::Cleared => {
                if let Some(world) = self.world.as_mut() {
                    world.player.unblock();
                }
            }
        }
    }

    /// Offset that puts the player in the middle of the screen.
    fn camera_offset(screen_size: Vec2, player_center: Vec2) -> Vec2 {
        screen_size * 0.5 - player_center
    }
}

impl Scene for OverworldScene {
    fn load(&mut self, sprites: &mut SpriteCache) {
        self.maps = match load_map_directory(&self.maps_dir, sprites.asset_root()) {
            Ok(maps) => maps,
            Err(error) => {
                warn!(error = %error, maps_dir = %self.maps_dir.display(), "maps_unavailable");
                BTreeMap::new()
            }
        };
        self.frames = FrameLibrary::load(sprites, &self.config);

        let start = MapTarget {
            map: self.config.start_map.clone(),
            spawn: self.config.start_spawn.clone(),
        };
        match self.enter_map(&start) {
            Ok(()) => info!(map = %start.map, spawn = %start.spawn, "overworld_loaded"),
            Err(error) => warn!(error = %error, "overworld_start_failed"),
        }
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.switch_scene_pressed() && self.tint.is_idle() {
            return SceneCommand::SwitchTo(SceneKey::PetCare);
        }

        self.check_transitions();
        if let Some(world) = self.world.as_mut() {
            world.player.update(fixed_dt_seconds, input);
            world.registry.update_all(fixed_dt_seconds);
        }
        let event = self.tint.step(fixed_dt_seconds);
        self.apply_tint_event(event);
        SceneCommand::None
    }

    fn render(&mut self, canvas: &mut Canvas<'_>, sprites: &mut SpriteCache) {
        canvas.clear(BACKGROUND_COLOR);
        let screen_size = canvas.size();
        match self.world.as_mut() {
            Some(world) => {
                let offset = Self::camera_offset(screen_size, world.player.center());
                world
                    .registry
                    .draw(canvas, sprites, offset, Some(&mut world.player.body));
            }
            None => {
                let message = "NO MAP LOADED";
                let width = engine::text_width(message, MESSAGE_SCALE) as f32;
                let position = Vec2::new((screen_size.x - width) * 0.5, screen_size.y * 0.5);
                canvas.draw_text(position, message, MESSAGE_SCALE, MESSAGE_COLOR);
            }
        }

        let alpha = self.tint.alpha();
        if alpha > 0 {
            canvas.fill_rect(
                Rect::new(0.0, 0.0, screen_size.x, screen_size.y),
                [0, 0, 0, alpha],
            );
        }
    }

    fn unload(&mut self) {
        self.world = None;
        self.maps.clear();
        info!("overworld_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let world = self.world.as_ref()?;
        let center = world.player.center();
        let animation = AnimationKey {
            facing: world.player.body.facing,
            moving: world.player.body.is_moving(),
        };
        Some(format!(
            "map {} | pos ({:.0}, {:.0}) | {} | {:?}",
            world.name,
            center.x,
            center.y,
            animation.name(),
            self.tint.phase()
        ))
    }
}
