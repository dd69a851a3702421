//! Entity Simulator
//!
//! Per-frame entity update: billboard transforms from the camera, heading
//! octant sprite selection, walk-cycle animation and the wandering AI.
//!
//! Characters steer on a quarter-turn lattice. A character walks straight
//! ahead and turns 90 degrees either when its lookahead probe hits a wall
//! or when its personal turn timer elapses; both triggers may fire in the
//! same frame, stacking into a half turn.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8};

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::angle::{shortest_arc, wrap_angle};
use crate::camera::Camera;
use crate::entity::{
    AiActivity, CHAR_CELL_W, Entity, EntityKind, WALK_FRAME_INTERVAL_MS, WALK_FRAME_STRIDE,
    WALK_FRAMES,
};
use crate::physics::collision::{collides_with_x, collides_with_z};
use crate::world::tilemap::{TileMap, tile_coord};

/// How many walk-steps ahead the wall probe looks. One step is one frame
/// of movement, so the probe reaches half a tile at walking speed.
pub const LOOKAHEAD_STEPS: f32 = 31.0;

/// Quarter turn applied by both the wall probe and the timer.
pub const TURN_STEP: f32 = FRAC_PI_2;

/// Sprite column for a heading relative to the camera yaw.
///
/// Headings quantize into eight 45-degree octants, offset by half an
/// octant so boundaries fall between view directions. A negative index
/// selects the mirrored counterpart of column `-index`.
pub fn heading_octant(rotation: f32, camera_yaw: f32) -> i32 {
    let arc = shortest_arc(wrap_angle(rotation), wrap_angle(camera_yaw) + FRAC_PI_8);
    if arc < 0.0 {
        -(arc / FRAC_PI_4).floor() as i32
    } else {
        -(arc / FRAC_PI_4).ceil() as i32
    }
}

/// Randomized delay before the next scheduled turn: 1-6 seconds in whole
/// second steps.
pub fn roll_time_to_turn<R: Rng>(rng: &mut R) -> u64 {
    1000 + rng.gen_range(0..=5) * 1000
}

/// Advance every entity one frame.
///
/// Transforms come first so billboards always face the camera's current
/// rotation, then characters animate and steer. Movement uses the heading
/// from the start of the frame; a turn only changes direction on the next.
pub fn update_entities<R: Rng>(
    entities: &mut [Entity],
    camera: &Camera,
    map: &TileMap,
    now_ms: u64,
    rng: &mut R,
) {
    for entity in entities.iter_mut() {
        entity.model = Mat4::from_translation(entity.position) * camera.rotation;
        entity.projection_view_model = camera.projection_view * entity.model;

        let EntityKind::Character {
            ref mut frame,
            ref mut frame_time_ms,
            ref mut velocity,
            ref mut ai,
            ..
        } = entity.kind
        else {
            continue;
        };

        let octant = heading_octant(entity.rotation, camera.yaw);
        if octant < 0 {
            entity.uv.x = CHAR_CELL_W * -octant as f32;
            entity.uv.z = -CHAR_CELL_W;
        } else {
            entity.uv.x = CHAR_CELL_W * octant as f32;
            entity.uv.z = CHAR_CELL_W;
        }

        if ai.activity != AiActivity::Walking {
            continue;
        }

        if now_ms - *frame_time_ms > WALK_FRAME_INTERVAL_MS {
            *frame = (*frame + 1) % WALK_FRAMES;
            *frame_time_ms = now_ms;
        }
        entity.uv.x += CHAR_CELL_W * WALK_FRAME_STRIDE * *frame as f32;

        *velocity = Mat4::from_rotation_y(entity.rotation).transform_vector3(Vec3::new(
            0.0, 0.0, -1.0,
        ));
        let lookahead = entity.position + *velocity * LOOKAHEAD_STEPS;

        let next_x = tile_coord(lookahead.x);
        let next_y = tile_coord(lookahead.z);
        entity.grid_x = tile_coord(entity.position.x);
        entity.grid_y = tile_coord(entity.position.z);

        if next_x != entity.grid_x
            && collides_with_x(map, next_x, next_y, entity.grid_x, entity.grid_y)
        {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            entity.rotation += sign * ai.preference_to_turn * TURN_STEP;
            ai.last_turn_ms = now_ms;
            ai.time_to_turn_ms = roll_time_to_turn(rng);
        }

        if next_y != entity.grid_y
            && collides_with_z(map, next_x, next_y, entity.grid_x, entity.grid_y)
        {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            entity.rotation += sign * ai.preference_to_turn * TURN_STEP;
            ai.last_turn_ms = now_ms;
            ai.time_to_turn_ms = roll_time_to_turn(rng);
        }

        if now_ms - ai.last_turn_ms > ai.time_to_turn_ms {
            entity.rotation += ai.preference_to_turn * TURN_STEP;
            ai.last_turn_ms = now_ms;
            ai.time_to_turn_ms = roll_time_to_turn(rng);
        }

        entity.position += *velocity;
    }
}
