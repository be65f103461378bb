use engine::{MapData, MapObject, Rect, TileLayer, Vec2};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::config::OverworldConfig;

use super::boundary::ContainmentBox;
use super::entity::{EntityBody, EntityTuning, Facing};
use super::frames::FrameLibrary;
use super::player::Player;
use super::registry::EntityRegistry;
use super::sprites::{
    AnimatedSprite, BorderSprite, CollidableSprite, MonsterPatch, NpcSprite, StaticSprite,
    WorldLayer,
};
use super::transition::{MapTarget, TransitionTrigger};

const PLAYER_OBJECT_NAME: &str = "Player";
const PLAYER_SHEET: &str = "player";
const TOP_OBJECT_NAME: &str = "top";
const TILE_LAYERS: [&str; 2] = ["Terrain", "Terrain Top"];

/// Everything that lives on the current map.
pub(crate) struct MapWorld {
    pub(crate) name: String,
    pub(crate) registry: EntityRegistry,
    pub(crate) player: Player,
    pub(crate) triggers: Vec<TransitionTrigger>,
}

#[derive(Debug, Error)]
pub(crate) enum SetupError {
    #[error("map {map} not found")]
    MapNotFound { map: String },
    #[error("map {map} has no player spawn {spawn}")]
    SpawnNotFound { map: String, spawn: String },
}

/// Builds the sprites, triggers and player of `map`, placing the player at
/// the `Player` object whose `pos` property equals `spawn`.
pub(crate) fn build_map_world(
    map: &MapData,
    spawn: &str,
    frames: &FrameLibrary,
    config: &OverworldConfig,
) -> Result<MapWorld, SetupError> {
    let tile_size = config.tile_size;
    let mut registry = EntityRegistry::default();
    let mut triggers = Vec::new();
    let mut player_body = None;
    let tuning = EntityTuning::from_config(config);

    for layer_name in TILE_LAYERS {
        let Some(layer) = tile_layer(map, layer_name) else {
            continue;
        };
        for placed in &layer.tiles {
            let rect = Rect::new(
                placed.column as f32 * tile_size,
                placed.row as f32 * tile_size,
                placed.tile.width as f32,
                placed.tile.height as f32,
            );
            registry.add(StaticSprite::new(
                placed.tile.frame.clone(),
                rect,
                WorldLayer::Bg,
            ));
        }
    }

    for object in objects(map, "Water") {
        for rect in water_cells(object.rect(), tile_size) {
            registry.add(AnimatedSprite::new(
                frames.water.clone(),
                rect,
                WorldLayer::Water,
                config.animation_speed,
            ));
        }
    }

    for object in objects(map, "Coast") {
        let terrain = object.property_str("terrain").unwrap_or_default();
        let side = object.property_str("side").unwrap_or_default();
        let Some(animation) = frames.coast.get(terrain, side) else {
            warn!(map = %map.name, object = object.id, terrain, side, "coast_frames_unknown");
            continue;
        };
        registry.add(AnimatedSprite::new(
            animation.to_vec(),
            Rect::new(object.x, object.y, tile_size, tile_size),
            WorldLayer::Bg,
            config.animation_speed,
        ));
    }

    for object in objects(map, "Objects") {
        let Some(tile) = &object.tile else {
            debug!(map = %map.name, object = object.id, "object_without_image_skipped");
            continue;
        };
        if object.name == TOP_OBJECT_NAME {
            registry.add(StaticSprite::new(
                tile.frame.clone(),
                object.rect(),
                WorldLayer::Top,
            ));
        } else {
            registry.add(CollidableSprite::new(tile.frame.clone(), object.rect()));
        }
    }

    for object in objects(map, "Transition") {
        match (object.property_str("target"), object.property_str("pos")) {
            (Some(target), Some(pos)) => triggers.push(TransitionTrigger {
                rect: object.rect(),
                target: MapTarget {
                    map: target.to_string(),
                    spawn: pos.to_string(),
                },
            }),
            _ => warn!(map = %map.name, object = object.id, "transition_target_missing"),
        }
    }

    for object in objects(map, "Collisions") {
        registry.add(BorderSprite::new(object.rect()));
    }

    for object in objects(map, "Monsters") {
        let Some(tile) = &object.tile else {
            debug!(map = %map.name, object = object.id, "monster_patch_without_image_skipped");
            continue;
        };
        let biome = object.property_str("biome").unwrap_or_default();
        registry.add(MonsterPatch::new(tile.frame.clone(), object.rect(), biome));
    }

    for object in objects(map, "Entities") {
        let facing = object_facing(object);
        if object.name == PLAYER_OBJECT_NAME {
            if object.property_str("pos") == Some(spawn) {
                player_body = Some(EntityBody::new(
                    object.position(),
                    facing,
                    frames.character(PLAYER_SHEET),
                    tuning,
                ));
            }
            continue;
        }
        let Some(graphic) = object.property_str("graphic") else {
            warn!(map = %map.name, object = object.id, "character_graphic_missing");
            continue;
        };
        registry.add(NpcSprite::new(EntityBody::new(
            object.position(),
            facing,
            frames.character(graphic),
            tuning,
        )));
    }

    let Some(body) = player_body else {
        return Err(SetupError::SpawnNotFound {
            map: map.name.clone(),
            spawn: spawn.to_string(),
        });
    };
    let at_home = map.name == config.home_map;
    let mut player = Player::new(
        body,
        at_home,
        ContainmentBox::from_config(&config.containment),
    );
    player.obstacles = registry.collision_hitboxes();

    info!(
        map = %map.name,
        spawn,
        sprite_count = registry.len(),
        obstacle_count = player.obstacles.len(),
        trigger_count = triggers.len(),
        at_home,
        "map_built"
    );
    Ok(MapWorld {
        name: map.name.clone(),
        registry,
        player,
        triggers,
    })
}

fn tile_layer<'a>(map: &'a MapData, name: &str) -> Option<&'a TileLayer> {
    let layer = map.tile_layer(name);
    if layer.is_none() {
        warn!(map = %map.name, layer = name, "map_layer_missing");
    }
    layer
}

fn objects<'a>(map: &'a MapData, name: &str) -> &'a [MapObject] {
    match map.object_layer(name) {
        Some(layer) => &layer.objects,
        None => {
            warn!(map = %map.name, layer = name, "map_layer_missing");
            &[]
        }
    }
}

fn object_facing(object: &MapObject) -> Facing {
    object
        .property_str("direction")
        .and_then(Facing::parse)
        .unwrap_or_default()
}

/// Tiles covering `area`, starting at its top-left corner.
fn water_cells(area: Rect, tile_size: f32) -> Vec<Rect> {
    let columns = (area.width / tile_size).ceil().max(0.0) as u32;
    let rows = (area.height / tile_size).ceil().max(0.0) as u32;
    let mut cells = Vec::with_capacity((columns * rows) as usize);
    for column in 0..columns {
        for row in 0..rows {
            let origin = area.top_left()
                + Vec2::new(column as f32 * tile_size, row as f32 * tile_size);
            cells.push(Rect::new(origin.x, origin.y, tile_size, tile_size));
        }
    }
    cells
}
