//! Entities
//!
//! Everything that renders as a billboard in the town: wandering characters
//! and static decorative props. Both share one transform/render payload; the
//! character-only AI and animation state lives in the [`EntityKind`] variant.

pub mod simulator;
pub mod spawn;

use glam::{Mat4, Vec3, Vec4};

use crate::world::tilemap::TILE_SIZE;

/// One character cell on the 1024x640 character sheet (16 columns, 10 rows).
pub const CHAR_CELL_W: f32 = 64.0 / 1024.0;
pub const CHAR_CELL_H: f32 = 64.0 / 640.0;

/// One prop cell on the 64x576 prop sheet (single column of 64x96 sprites).
pub const PROP_CELL_W: f32 = 1.0;
pub const PROP_CELL_H: f32 = 96.0 / 576.0;

/// Walk cycle: three frames advancing every 250 ms; frame groups sit five
/// columns apart on the character sheet.
pub const WALK_FRAMES: u8 = 3;
pub const WALK_FRAME_INTERVAL_MS: u64 = 250;
pub const WALK_FRAME_STRIDE: f32 = 5.0;

/// Sprite sheet a billboard samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSheet {
    /// Character walk-cycle sheet.
    Characters,
    /// Static prop sheet (wells, stalls, trees...).
    Props,
}

/// What a character is currently doing. Idle characters still face the
/// camera and pick heading sprites but never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiActivity {
    Idle,
    Walking,
}

/// Per-character steering state.
#[derive(Debug, Clone, Copy)]
pub struct AiState {
    pub activity: AiActivity,
    /// Timestamp of the last turn (ms).
    pub last_turn_ms: u64,
    /// Randomized interval until the next scheduled turn (1-6 s).
    pub time_to_turn_ms: u64,
    /// Fixed turn direction bias, -1.0 or +1.0, assigned at spawn.
    pub preference_to_turn: f32,
}

/// Variant payload: props carry nothing, characters carry AI and animation.
#[derive(Debug, Clone, Copy)]
pub enum EntityKind {
    Static,
    Character {
        /// Row on the character sheet (0-8).
        kind: u8,
        /// Current walk-cycle frame (0-2).
        frame: u8,
        /// Timestamp of the last frame advance (ms).
        frame_time_ms: u64,
        /// Forward velocity, rebuilt from the heading each frame.
        velocity: Vec3,
        ai: AiState,
    },
}

/// A billboard in the world.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Grid cell, re-derived from `position` each frame for characters.
    pub grid_x: i32,
    pub grid_y: i32,
    pub position: Vec3,
    /// Heading (yaw, radians).
    pub rotation: f32,
    /// UV rectangle: origin plus signed extent; a negative width mirrors
    /// the sprite horizontally.
    pub uv: Vec4,
    pub sheet: SpriteSheet,
    pub tint: Vec3,
    pub model: Mat4,
    pub projection_view_model: Mat4,
    pub kind: EntityKind,
}

impl Entity {
    /// World position of a grid cell (signs inverted relative to the grid).
    pub fn world_position(x: i32, y: i32) -> Vec3 {
        Vec3::new(-(x as f32) * TILE_SIZE, 0.0, -(y as f32) * TILE_SIZE)
    }

    /// A static prop billboard for a decoded sprite tile.
    ///
    /// `sprite` is the raw 3-bit kind from the tile byte; its sheet row is
    /// `sprite - 2`.
    pub fn new_prop(x: i32, y: i32, sprite: u8) -> Self {
        let row = sprite as f32 - 2.0;
        Self {
            grid_x: x,
            grid_y: y,
            position: Self::world_position(x, y),
            rotation: 0.0,
            uv: Vec4::new(0.0, row * PROP_CELL_H, PROP_CELL_W, PROP_CELL_H),
            sheet: SpriteSheet::Props,
            tint: Vec3::ONE,
            model: Mat4::IDENTITY,
            projection_view_model: Mat4::IDENTITY,
            kind: EntityKind::Static,
        }
    }

    /// A walking character at a grid cell.
    pub fn new_character(
        x: i32,
        y: i32,
        kind: u8,
        rotation: f32,
        preference_to_turn: f32,
        time_to_turn_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            grid_x: x,
            grid_y: y,
            position: Self::world_position(x, y),
            rotation,
            uv: Vec4::new(0.0, CHAR_CELL_H * kind as f32, CHAR_CELL_W, CHAR_CELL_H),
            sheet: SpriteSheet::Characters,
            tint: Vec3::ONE,
            model: Mat4::IDENTITY,
            projection_view_model: Mat4::IDENTITY,
            kind: EntityKind::Character {
                kind,
                frame: 0,
                frame_time_ms: now_ms,
                velocity: Vec3::new(0.0, 0.0, -1.0),
                ai: AiState {
                    activity: AiActivity::Walking,
                    last_turn_ms: now_ms,
                    time_to_turn_ms,
                    preference_to_turn,
                },
            },
        }
    }

    /// A character that stands in place (the town greeter).
    pub fn new_idle_character(x: i32, y: i32, kind: u8, now_ms: u64) -> Self {
        let mut entity = Self::new_character(x, y, kind, 0.0, 1.0, u64::MAX, now_ms);
        if let EntityKind::Character { ref mut ai, .. } = entity.kind {
            ai.activity = AiActivity::Idle;
        }
        entity
    }

    pub fn is_character(&self) -> bool {
        matches!(self.kind, EntityKind::Character { .. })
    }
}
