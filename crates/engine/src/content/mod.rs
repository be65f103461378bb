mod atomic_io;
mod map;
mod tmx;

pub use atomic_io::write_atomic;
pub use map::{
    MapData, MapLayer, MapObject, ObjectLayer, PlacedTile, Properties, PropertyValue, TileLayer,
    TileRef,
};
pub use tmx::{load_map_directory, load_tmx_map, MapLoadError};
