//! Physics
//!
//! Movement resolution against the tile grid. No forces or integration
//! here; friction lives in the camera and the characters re-derive their
//! velocity from their heading every frame.

pub mod collision;

pub use collision::{COLLIDER_HALF_EXTENT, CollisionAxes, ResolvedMovement, resolve_movement};
