use std::collections::HashMap;
use std::path::Path;

use engine::{FrameRef, PixelRect, SpriteCache, Vec2};
use tracing::{info, warn};

use crate::app::config::OverworldConfig;

use super::entity::{AnimationKey, CharacterFrames, Facing};

const CHARACTER_SHEET_COLUMNS: u32 = 4;
const CHARACTER_SHEET_ROWS: u32 = 4;
const COAST_SHEET_COLUMNS: u32 = 24;
const COAST_SHEET_ROWS: u32 = 12;
/// Animation rows of one coast tile are this far apart in the sheet.
const COAST_FRAME_STRIDE: u32 = 3;

pub(crate) const COAST_TERRAINS: [&str; 8] = [
    "grass", "grass_i", "sand_i", "sand", "rock", "rock_i", "ice", "ice_i",
];

/// Side name and its cell inside a terrain's 3x3 block.
pub(crate) const COAST_SIDES: [(&str, (u32, u32)); 8] = [
    ("topleft", (0, 0)),
    ("top", (1, 0)),
    ("topright", (2, 0)),
    ("left", (0, 1)),
    ("right", (2, 1)),
    ("bottomleft", (0, 2)),
    ("bottom", (1, 2)),
    ("bottomright", (2, 2)),
];

/// Coast animations keyed by terrain and side.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CoastFrames {
    frames: HashMap<(String, String), Vec<FrameRef>>,
}

impl CoastFrames {
    pub(crate) fn get(&self, terrain: &str, side: &str) -> Option<&[FrameRef]> {
        self.frames
            .get(&(terrain.to_string(), side.to_string()))
            .map(Vec::as_slice)
    }
}

/// Every frame table the overworld needs, built once when the scene loads.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FrameLibrary {
    characters: HashMap<String, CharacterFrames>,
    pub(crate) water: Vec<FrameRef>,
    pub(crate) coast: CoastFrames,
    characters_dir: String,
    fallback_size: Vec2,
}

impl FrameLibrary {
    pub(crate) fn load(sprites: &mut SpriteCache, config: &OverworldConfig) -> Self {
        let fallback_size = Vec2::new(
            config.character_fallback_size,
            config.character_fallback_size,
        );
        let mut characters = HashMap::new();
        for key in sprites.folder_keys(&config.characters_dir) {
            let Some(name) = Path::new(&key)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
            else {
                continue;
            };
            let frames = character_frames(&key, sprites.dimensions(&key), fallback_size);
            characters.insert(name, frames);
        }

        let water = sprites.folder_keys(&config.water_dir);
        if water.is_empty() {
            warn!(folder = %config.water_dir, "water_frames_missing");
        }
        let water: Vec<FrameRef> = water.into_iter().map(FrameRef::whole).collect();

        let coast_size = sprites.dimensions(&config.coast_sheet).unwrap_or((
            COAST_SHEET_COLUMNS * config.tile_size as u32,
            COAST_SHEET_ROWS * config.tile_size as u32,
        ));
        let coast = coast_frames(&config.coast_sheet, coast_size);

        info!(
            characters = characters.len(),
            water_frames = water.len(),
            "overworld_frames_loaded"
        );
        Self {
            characters,
            water,
            coast,
            characters_dir: config.characters_dir.trim_end_matches('/').to_string(),
            fallback_size,
        }
    }

    /// Frames for the sheet called `name`. Unknown names get frames pointing
    /// at the expected path, which draw as placeholders.
    pub(crate) fn character(&self, name: &str) -> CharacterFrames {
        if let Some(frames) = self.characters.get(name) {
            return frames.clone();
        }
        warn!(character = name, "character_sheet_missing");
        let key = format!("{}/{name}.png", self.characters_dir);
        character_frames(&key, None, self.fallback_size)
    }
}

/// Splits a 4x4 sheet into walk cycles (rows down, left, right, up) plus an
/// idle frame per row (its first column).
pub(crate) fn character_frames(
    key: &str,
    sheet_size: Option<(u32, u32)>,
    fallback_size: Vec2,
) -> CharacterFrames {
    let (cell_width, cell_height) = match sheet_size {
        Some((width, height)) => (
            width / CHARACTER_SHEET_COLUMNS,
            height / CHARACTER_SHEET_ROWS,
        ),
        None => (fallback_size.x as u32, fallback_size.y as u32),
    };
    let mut frames = HashMap::new();
    for (row, facing) in Facing::SHEET_ROWS.into_iter().enumerate() {
        let walk = (0..CHARACTER_SHEET_COLUMNS)
            .map(|column| {
                FrameRef::region(
                    key,
                    PixelRect::new(
                        column * cell_width,
                        row as u32 * cell_height,
                        cell_width,
                        cell_height,
                    ),
                )
            })
            .collect::<Vec<_>>();
        let idle = walk.iter().take(1).cloned().collect::<Vec<_>>();
        frames.insert(
            AnimationKey {
                facing,
                moving: false,
            },
            idle,
        );
        frames.insert(
            AnimationKey {
                facing,
                moving: true,
            },
            walk,
        );
    }
    CharacterFrames::new(frames, Vec2::new(cell_width as f32, cell_height as f32))
}

/// Splits the 24x12 coast sheet. Each terrain owns a 3-column block; each
/// side animates over the rows 0, 3, 6 and 9 below its cell.
pub(crate) fn coast_frames(key: &str, sheet_size: (u32, u32)) -> CoastFrames {
    let cell_width = sheet_size.0 / COAST_SHEET_COLUMNS;
    let cell_height = sheet_size.1 / COAST_SHEET_ROWS;
    let mut frames = HashMap::new();
    for (index, terrain) in COAST_TERRAINS.iter().enumerate() {
        for (side, (column, row)) in COAST_SIDES {
            let column = column + index as u32 * COAST_FRAME_STRIDE;
            let animation = (0..COAST_SHEET_ROWS)
                .step_by(COAST_FRAME_STRIDE as usize)
                .map(|offset| {
                    FrameRef::region(
                        key,
                        PixelRect::new(
                            column * cell_width,
                            (row + offset) * cell_height,
                            cell_width,
                            cell_height,
                        ),
                    )
                })
                .collect::<Vec<_>>();
            frames.insert((terrain.to_string(), side.to_string()), animation);
        }
    }
    CoastFrames { frames }
}
