//! World
//!
//! The static town: the packed tile grid and the decoder that builds it
//! (plus the prop billboards) from the map atlas image.

pub mod decode;
pub mod tilemap;

pub use decode::{DecodedMap, MapError, decode_ground_atlas};
pub use tilemap::{TILE_SIZE, TileMap};
