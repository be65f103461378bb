use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tiled::{LayerType, Loader, ObjectShape, Orientation};
use tracing::{info, warn};

use crate::app::{FrameRef, PixelRect};

use super::map::{
    MapData, MapLayer, MapObject, ObjectLayer, PlacedTile, Properties, PropertyValue, TileLayer,
    TileRef,
};

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse map {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: tiled::Error,
    },
    #[error("unsupported map {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },
}

/// Loads every `*.tmx` file in `dir`, keyed by file stem. Files that fail to
/// parse are logged and skipped. External tilesets are shared between maps.
pub fn load_map_directory(
    dir: &Path,
    asset_root: &Path,
) -> Result<BTreeMap<String, MapData>, MapLoadError> {
    let entries = fs::read_dir(dir).map_err(|source| MapLoadError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, "tmx"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut loader = Loader::new();
    let mut maps = BTreeMap::new();
    for path in paths {
        match load_with(&mut loader, &path, asset_root) {
            Ok(map) => {
                maps.insert(map.name.clone(), map);
            }
            Err(error) => warn!(error = %error, "map_load_failed"),
        }
    }
    info!(dir = %dir.display(), map_count = maps.len(), "maps_loaded");
    Ok(maps)
}

pub fn load_tmx_map(path: &Path, asset_root: &Path) -> Result<MapData, MapLoadError> {
    load_with(&mut Loader::new(), path, asset_root)
}

fn load_with(loader: &mut Loader, path: &Path, asset_root: &Path) -> Result<MapData, MapLoadError> {
    let map = loader
        .load_tmx_map(path)
        .map_err(|source| MapLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if map.orientation != Orientation::Orthogonal {
        return Err(MapLoadError::Unsupported {
            path: path.to_path_buf(),
            reason: format!("{:?} orientation; only orthogonal maps load", map.orientation),
        });
    }

    let context = Context { path, asset_root };
    let mut layers = Vec::new();
    for layer in map.layers() {
        context.collect_layer(layer, &mut layers);
    }

    Ok(MapData {
        name: map_name(path),
        width: map.width,
        height: map.height,
        tile_width: map.tile_width,
        tile_height: map.tile_height,
        layers,
    })
}

struct Context<'a> {
    path: &'a Path,
    asset_root: &'a Path,
}

impl Context<'_> {
    /// Converts one layer into `layers`. Groups are flattened in file order.
    fn collect_layer(&self, layer: tiled::Layer<'_>, layers: &mut Vec<MapLayer>) {
        let name = layer.name.clone();
        match layer.layer_type() {
            LayerType::Tiles(tiles) => layers.push(MapLayer::Tiles(self.tile_layer(name, tiles))),
            LayerType::Objects(objects) => {
                layers.push(MapLayer::Objects(self.object_layer(name, objects)))
            }
            LayerType::Group(group) => {
                for child in group.layers() {
                    self.collect_layer(child, layers);
                }
            }
            LayerType::Image(_) => {}
        }
    }

    fn tile_layer(&self, name: String, layer: tiled::TileLayer<'_>) -> TileLayer {
        let tiled::TileLayer::Finite(finite) = layer else {
            warn!(path = %self.path.display(), layer = name.as_str(), "map_infinite_layer_skipped");
            return TileLayer {
                name,
                width: 0,
                height: 0,
                tiles: Vec::new(),
            };
        };

        let (width, height) = (finite.width(), finite.height());
        let mut tiles = Vec::new();
        let mut unresolved = 0usize;
        for row in 0..height {
            for column in 0..width {
                let Some(cell) = finite.get_tile(column as i32, row as i32) else {
                    continue;
                };
                match self.tile_ref(cell.get_tileset(), cell.id()) {
                    Some(tile) => tiles.push(PlacedTile { column, row, tile }),
                    None => unresolved += 1,
                }
            }
        }
        if unresolved > 0 {
            warn!(
                path = %self.path.display(),
                layer = name.as_str(),
                unresolved,
                "map_layer_has_unknown_tiles"
            );
        }

        TileLayer {
            name,
            width,
            height,
            tiles,
        }
    }

    fn object_layer(&self, name: String, layer: tiled::ObjectLayer<'_>) -> ObjectLayer {
        let objects = layer.objects().map(|object| self.object(&object)).collect();
        ObjectLayer { name, objects }
    }

    fn object(&self, object: &tiled::Object<'_>) -> MapObject {
        let (shape_width, shape_height) = match object.shape {
            ObjectShape::Rect { width, height } | ObjectShape::Ellipse { width, height } => {
                (width, height)
            }
            _ => (0.0, 0.0),
        };
        let mut width = shape_width;
        let mut height = shape_height;
        let mut y = object.y;

        let cell = object.get_tile();
        let tile = cell.as_ref().and_then(|cell| {
            let tile = self.tile_ref(cell.get_tileset(), cell.id());
            if tile.is_none() {
                warn!(
                    path = %self.path.display(),
                    tile_id = cell.id(),
                    "map_object_has_unknown_tile"
                );
            }
            tile
        });
        if let Some(tile) = tile.as_ref() {
            if width <= 0.0 {
                width = tile.width as f32;
            }
            if height <= 0.0 {
                height = tile.height as f32;
            }
        }
        if cell.is_some() {
            // Tile objects are anchored at their bottom-left corner.
            y -= height;
        }

        MapObject {
            id: object.id(),
            name: object.name.clone(),
            x: object.x,
            y,
            width,
            height,
            tile,
            properties: convert_properties(&object.properties),
        }
    }

    /// Image for a tileset-local tile id: a region of the atlas image, or the
    /// tile's own image in an image-collection tileset.
    fn tile_ref(&self, tileset: &tiled::Tileset, id: u32) -> Option<TileRef> {
        if let Some(atlas) = tileset.image.as_ref() {
            if tileset.columns == 0 || id >= tileset.tilecount {
                return None;
            }
            let column = id % tileset.columns;
            let row = id / tileset.columns;
            let source = PixelRect::new(
                tileset.margin + column * (tileset.tile_width + tileset.spacing),
                tileset.margin + row * (tileset.tile_height + tileset.spacing),
                tileset.tile_width,
                tileset.tile_height,
            );
            return Some(TileRef {
                frame: FrameRef::region(self.image_key(&atlas.source), source),
                width: tileset.tile_width,
                height: tileset.tile_height,
            });
        }

        let tile = tileset.get_tile(id)?;
        let image = tile.image.as_ref()?;
        Some(TileRef {
            frame: FrameRef::whole(self.image_key(&image.source)),
            width: positive_or(image.width, tileset.tile_width),
            height: positive_or(image.height, tileset.tile_height),
        })
    }

    fn image_key(&self, source: &Path) -> String {
        let resolved = normalize_lexically(source);
        let root = normalize_lexically(self.asset_root);
        match resolved.strip_prefix(&root) {
            Ok(relative) => path_to_key(relative),
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    image = %resolved.display(),
                    "map_image_outside_asset_root"
                );
                path_to_key(&resolved)
            }
        }
    }
}

fn convert_properties(properties: &tiled::Properties) -> Properties {
    properties
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                tiled::PropertyValue::StringValue(value)
                | tiled::PropertyValue::FileValue(value) => PropertyValue::String(value.clone()),
                tiled::PropertyValue::IntValue(value) => PropertyValue::Int(i64::from(*value)),
                tiled::PropertyValue::FloatValue(value) => {
                    PropertyValue::Float(f64::from(*value))
                }
                tiled::PropertyValue::BoolValue(value) => PropertyValue::Bool(*value),
                _ => return None,
            };
            Some((name.clone(), value))
        })
        .collect()
}

fn positive_or(value: i32, fallback: u32) -> u32 {
    u32::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .unwrap_or(fallback)
}

fn map_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .is_some_and(|value| value.eq_ignore_ascii_case(extension))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn path_to_key(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
