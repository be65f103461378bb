use std::collections::BTreeMap;
use std::fmt;

use crate::app::{FrameRef, Rect, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(value) => Some(*value as f64),
            PropertyValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(value) => f.write_str(value),
            PropertyValue::Int(value) => write!(f, "{value}"),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

pub type Properties = BTreeMap<String, PropertyValue>;

/// Image for one tile id: a frame plus its size in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRef {
    pub frame: FrameRef,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub column: u32,
    pub row: u32,
    pub tile: TileRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<PlacedTile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    /// Top-left corner in map pixels. Tile objects are already converted
    /// from Tiled's bottom-left anchor.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tile: Option<TileRef>,
    pub properties: Properties,
}

impl MapObject {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLayer {
    pub name: String,
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapLayer {
    Tiles(TileLayer),
    Objects(ObjectLayer),
}

impl MapLayer {
    pub fn name(&self) -> &str {
        match self {
            MapLayer::Tiles(layer) => &layer.name,
            MapLayer::Objects(layer) => &layer.name,
        }
    }
}

/// One parsed tile map. Layers keep file order; groups are flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: Vec<MapLayer>,
}

impl MapData {
    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    pub fn tile_layer(&self, name: &str) -> Option<&TileLayer> {
        match self.layer(name)? {
            MapLayer::Tiles(layer) => Some(layer),
            MapLayer::Objects(_) => None,
        }
    }

    pub fn object_layer(&self, name: &str) -> Option<&ObjectLayer> {
        match self.layer(name)? {
            MapLayer::Objects(layer) => Some(layer),
            MapLayer::Tiles(_) => None,
        }
    }

    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            (self.width * self.tile_width) as f32,
            (self.height * self.tile_height) as f32,
        )
    }
}
