//! Scene Tests - Frame Stepping and Camera Movement
//!
//! End-to-end tests driving a whole TownScene through its step loop with a
//! synthetic map atlas, the way the windowed shell does.

use tiletown_engine::camera::CameraMode;
use tiletown_engine::camera::controller::FRICTION;
use tiletown_engine::config::Settings;
use tiletown_engine::input::Key;
use tiletown_engine::scene::{CAMERA_START_CELL, TownScene};
use tiletown_engine::world::decode::{DecodedMap, decode_ground_atlas};

const MAP_W: u32 = 96;
const MAP_H: u32 = 72;

/// Build an all-street atlas: every tile exterior, no walls, no props.
fn open_town() -> DecodedMap {
    let atlas_w = MAP_W * 3;
    let mut pixels = vec![0u8; (atlas_w * MAP_H * 4) as usize];
    for y in 0..MAP_H {
        for x in 0..MAP_W {
            pixels[((y * atlas_w + x) * 4) as usize] = 0x01;
        }
    }
    decode_ground_atlas(&pixels, atlas_w, MAP_H, MAP_W, MAP_H).unwrap()
}

fn quiet_settings() -> Settings {
    Settings {
        character_count: 0,
        rng_seed: Some(1),
        ..Settings::default()
    }
}

// ============================================================================
// Scene Construction
// ============================================================================

#[test]
fn test_scene_starts_at_camera_cell() {
    let scene = TownScene::new(open_town(), &quiet_settings(), 0);
    assert_eq!(scene.camera.position.x, -(CAMERA_START_CELL.0 as f32) * 64.0);
    assert_eq!(scene.camera.position.z, -(CAMERA_START_CELL.1 as f32) * 64.0);
    assert_eq!(scene.camera.mode, CameraMode::Player);
    // Just the idle greeter with zero wanderers requested.
    assert_eq!(scene.entities.len(), 1);
}

#[test]
fn test_draw_list_carries_every_entity() {
    let mut settings = quiet_settings();
    settings.character_count = 25;
    let mut scene = TownScene::new(open_town(), &settings, 0);
    let draw_list = scene.step(16);
    assert_eq!(draw_list.billboards.len(), 26);
}

// ============================================================================
// Camera Through the Scene Loop
// ============================================================================

#[test]
fn test_forward_impulse_decays_by_friction_series() {
    let mut scene = TownScene::new(open_town(), &quiet_settings(), 0);
    scene.input.set_look_lock(true);

    // Hold forward for exactly one frame, then coast.
    scene.input.keyboard.press(Key::KeyW);
    scene.step(16);
    scene.input.keyboard.release(Key::KeyW);
    let frames: i32 = 30;
    for i in 1..frames {
        scene.step(16 + i as u64 * 16);
    }

    // Start yaw is -pi/2, so the impulse pushes along +X.
    let f = FRICTION.x;
    let expected = (1.0 - f.powi(frames)) / (1.0 - f);
    let start_x = -(CAMERA_START_CELL.0 as f32) * 64.0;
    let travelled = scene.camera.position.x - start_x;
    assert!(
        (travelled - expected).abs() < 1e-2,
        "travelled {travelled}, expected {expected}"
    );
    assert!(scene.camera.velocity.length() < 1e-2);
}

#[test]
fn test_mode_toggle_round_trip_resets_height() {
    let mut scene = TownScene::new(open_town(), &quiet_settings(), 0);
    scene.toggle_camera_mode();
    assert_eq!(scene.camera.mode, CameraMode::Free);

    // Fly up a while.
    scene.input.set_look_lock(true);
    scene.input.keyboard.press(Key::KeyQ);
    for i in 0..10 {
        scene.step(i * 16);
    }
    assert!(scene.camera.position.y < 0.0, "up is negative y");

    scene.toggle_camera_mode();
    assert_eq!(scene.camera.mode, CameraMode::Player);
    assert_eq!(scene.camera.position.y, 0.0);
}

#[test]
fn test_pointer_delta_turns_camera() {
    let mut scene = TownScene::new(open_town(), &quiet_settings(), 0);
    scene.set_viewport(800.0, 600.0);
    let yaw0 = scene.camera.yaw;
    let pitch0 = scene.camera.pitch;

    // Without the look lock pointer input is discarded.
    scene.input.push_pointer_delta(400.0, 0.0);
    scene.step(16);
    assert_eq!(scene.camera.yaw, yaw0);

    scene.input.set_look_lock(true);
    scene.input.push_pointer_delta(400.0, -150.0);
    scene.step(32);
    // Pointer right turns yaw negative; pointer up pitches up.
    assert!((scene.camera.yaw - (yaw0 - 0.5)).abs() < 1e-5);
    assert!((scene.camera.pitch - (pitch0 - 0.25)).abs() < 1e-5);
}

#[test]
fn test_seeded_scenes_are_reproducible() {
    let mut settings = quiet_settings();
    settings.character_count = 40;
    let mut a = TownScene::new(open_town(), &settings, 0);
    let mut b = TownScene::new(open_town(), &settings, 0);
    for i in 0..20 {
        a.step(i * 16);
        b.step(i * 16);
    }
    for (ea, eb) in a.entities.iter().zip(&b.entities) {
        assert_eq!(ea.position, eb.position);
        assert_eq!(ea.rotation, eb.rotation);
    }
}
