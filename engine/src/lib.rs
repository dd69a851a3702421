//! Tiletown Engine
//!
//! A first-person walk through a sprite-and-tile town: the map decodes
//! from one packed RGBA atlas, walls render as instanced quads, and the
//! inhabitants are depth-sorted billboards wandering a quarter-turn grid.
//!
//! Layering, bottom to top:
//! - [`angle`], [`world`], [`physics`]: pure simulation primitives
//! - [`camera`], [`input`], [`entity`]: per-frame simulation
//! - [`scene`], [`frame`], [`config`]: orchestration
//! - [`render`]: draw list extraction and the wgpu backend

pub mod angle;
pub mod camera;
pub mod config;
pub mod entity;
pub mod frame;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;
pub mod world;

pub use camera::{Camera, CameraMode};
pub use config::Settings;
pub use frame::FrameLoop;
pub use scene::TownScene;
pub use world::{TileMap, decode_ground_atlas};
