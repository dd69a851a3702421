//! Settings
//!
//! Tunables loaded from an optional JSON file next to the binary. Every
//! field has a default matching the shipped tuning, so a missing or broken
//! file degrades to the stock experience with a logged warning.

use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::controller::{FRICTION, LOOK_RATE, PLAYER_PITCH_LIMIT, TURN_RATE};
use crate::entity::spawn::CHARACTER_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-axis camera velocity retained each frame.
    pub friction: f32,
    /// Pitch clamp while walking, radians.
    pub player_pitch_limit: f32,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Yaw/pitch radians per frame at full action deflection.
    pub turn_rate: f32,
    pub look_rate: f32,
    /// Wandering characters spawned at startup.
    pub character_count: usize,
    /// Fixed RNG seed for reproducible crowds; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            friction: FRICTION.x,
            player_pitch_limit: PLAYER_PITCH_LIMIT,
            fov_y: FRAC_PI_4,
            turn_rate: TURN_RATE,
            look_rate: LOOK_RATE,
            character_count: CHARACTER_COUNT,
            rng_seed: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults when the
    /// file is absent or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "bad settings file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
