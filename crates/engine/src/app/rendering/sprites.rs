use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

use crate::app::geometry::{Rect, Vec2};
use crate::sprite_keys::validate_sprite_key;

use super::canvas::{Canvas, Color, PixelRect};

const PLACEHOLDER_FILL_COLOR: Color = [220, 80, 200, 255];
const PLACEHOLDER_EDGE_COLOR: Color = [40, 10, 40, 255];

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0; 4];
        color.copy_from_slice(self.rgba.get(offset..offset + 4)?);
        Some(color)
    }
}

/// One drawable frame: an asset key plus an optional region of that image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub key: String,
    pub source: Option<PixelRect>,
}

impl FrameRef {
    pub fn whole(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: None,
        }
    }

    pub fn region(key: impl Into<String>, source: PixelRect) -> Self {
        Self {
            key: key.into(),
            source: Some(source),
        }
    }
}

/// Lazily decoded images keyed by asset-root-relative path.
///
/// Failed loads are cached as misses and warned about once per key.
pub struct SpriteCache {
    asset_root: PathBuf,
    images: HashMap<String, Option<SpriteImage>>,
    warned_keys: HashSet<String>,
}

impl SpriteCache {
    pub fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            images: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn get(&mut self, key: &str) -> Option<&SpriteImage> {
        if !self.images.contains_key(key) {
            let loaded = match self.load(key) {
                Ok(image) => Some(image),
                Err(reason) => {
                    self.warn_once(key, &reason);
                    None
                }
            };
            self.images.insert(key.to_string(), loaded);
        }
        self.images.get(key).and_then(Option::as_ref)
    }

    pub fn contains(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn dimensions(&mut self, key: &str) -> Option<(u32, u32)> {
        self.get(key).map(|image| (image.width(), image.height()))
    }

    /// Registers an in-memory image under `key`, replacing any cached entry.
    pub fn insert(&mut self, key: impl Into<String>, image: SpriteImage) {
        self.images.insert(key.into(), Some(image));
    }

    /// Image keys inside `folder_key`, sorted by file name. Missing folders yield nothing.
    pub fn folder_keys(&self, folder_key: &str) -> Vec<String> {
        let folder_key = folder_key.trim_end_matches('/');
        let Ok(entries) = fs::read_dir(self.asset_root.join(folder_key)) else {
            return Vec::new();
        };
        let mut names = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_image_file_name(name))
            .collect::<Vec<_>>();
        names.sort();
        names
            .into_iter()
            .map(|name| format!("{folder_key}/{name}"))
            .collect()
    }

    /// Draws `frame` with its top-left corner at `position`, or a placeholder
    /// of `fallback_size` when the image is unavailable.
    pub fn draw_frame(
        &mut self,
        canvas: &mut Canvas<'_>,
        frame: &FrameRef,
        position: Vec2,
        fallback_size: Vec2,
    ) {
        match self.get(&frame.key) {
            Some(image) => canvas.blit(image, frame.source, position),
            None => draw_placeholder(
                canvas,
                Rect::new(position.x, position.y, fallback_size.x, fallback_size.y),
            ),
        }
    }

    /// Draws `frame` stretched into `dest`, or a placeholder filling `dest`.
    pub fn draw_frame_scaled(&mut self, canvas: &mut Canvas<'_>, frame: &FrameRef, dest: Rect) {
        match self.get(&frame.key) {
            Some(image) => canvas.blit_scaled(image, frame.source, dest),
            None => draw_placeholder(canvas, dest),
        }
    }

    fn load(&self, key: &str) -> Result<SpriteImage, String> {
        validate_sprite_key(key).map_err(|error| format!("invalid_key:{error}"))?;
        load_rgba(&self.asset_root.join(key))
    }

    fn warn_once(&mut self, key: &str, reason: &str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        warn!(
            sprite_key = key,
            path = %self.asset_root.join(key).display(),
            reason,
            "sprite_load_failed_using_placeholder"
        );
    }
}

pub fn draw_placeholder(canvas: &mut Canvas<'_>, rect: Rect) {
    canvas.fill_rect(rect, PLACEHOLDER_FILL_COLOR);
    canvas.rect_outline(rect, 2.0, PLACEHOLDER_EDGE_COLOR);
}

fn load_rgba(path: &Path) -> Result<SpriteImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    let (width, height) = image.dimensions();
    SpriteImage::from_rgba(width, height, image.into_raw())
        .ok_or_else(|| "decode_failed:buffer_size_mismatch".to_string())
}

fn is_image_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("png"))
}
