//! Camera
//!
//! The first-person viewpoint: position, look angles, accumulated velocity
//! and the derived matrices the renderer consumes.

pub mod controller;

pub use controller::{Camera, CameraMode, FRICTION, PLAYER_PITCH_LIMIT, Projection};
