//! Camera Controller
//!
//! Per-frame camera update: look angles from pointer deltas and turn/look
//! actions, velocity accumulated from movement actions, friction, and the
//! mode-dependent integration (free flight vs. collision-resolved walking).
//!
//! Velocity is deliberately not normalized; diagonal movement is faster
//! than axis-aligned movement and the town was tuned around that.

use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};

use crate::input::{Action, Input};
use crate::physics::collision::{CollisionAxes, resolve_movement};
use crate::world::tilemap::TileMap;

/// Movement basis directions in camera-local space. World Y points down,
/// so `UP` is negative Y.
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
pub const BACKWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);
pub const STRAFE_LEFT: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
pub const STRAFE_RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const UP: Vec3 = Vec3::new(0.0, -1.0, 0.0);
pub const DOWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Per-axis velocity retained each frame.
pub const FRICTION: Vec3 = Vec3::new(0.8, 0.8, 0.8);

/// Pitch clamp while walking; free flight is unclamped.
pub const PLAYER_PITCH_LIMIT: f32 = FRAC_PI_4;

/// Yaw/pitch change per frame at full turn/look action deflection.
pub const TURN_RATE: f32 = 0.05;
pub const LOOK_RATE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Unconstrained flight, full 3D look rotation.
    Free,
    /// Walking on the ground plane with grid collision.
    Player,
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near_z: f32,
    pub far_z: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            aspect_ratio: 1.0,
            near_z: 0.1,
            far_z: 1e9,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near_z, self.far_z)
    }
}

/// The first-person viewpoint.
pub struct Camera {
    pub mode: CameraMode,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Look angles, radians. Pitch grows looking down (pointer-down).
    pub pitch: f32,
    pub yaw: f32,
    pub friction: Vec3,
    pub pitch_limit: f32,
    pub turn_rate: f32,
    pub look_rate: f32,
    pub projection_params: Projection,
    /// Axes the last walking step survived with; `Both` in free mode.
    pub last_resolution: CollisionAxes,
    pub rotation: Mat4,
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub projection_view: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        let projection_params = Projection::default();
        Self {
            mode: CameraMode::Player,
            position,
            velocity: Vec3::ZERO,
            pitch: 0.0,
            yaw,
            friction: FRICTION,
            pitch_limit: PLAYER_PITCH_LIMIT,
            turn_rate: TURN_RATE,
            look_rate: LOOK_RATE,
            projection_params,
            last_resolution: CollisionAxes::Both,
            rotation: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: projection_params.matrix(),
            projection_view: Mat4::IDENTITY,
        }
    }

    /// Recompute the projection for a new surface aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.projection_params.aspect_ratio = aspect_ratio;
        self.projection = self.projection_params.matrix();
    }

    /// Switch between free flight and walking. Entering walking snaps the
    /// camera back to eye level.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Free => {
                self.position.y = 0.0;
                CameraMode::Player
            }
            CameraMode::Player => CameraMode::Free,
        };
        tracing::debug!(mode = ?self.mode, "camera mode toggled");
    }

    /// Apply a raw pointer delta, scaled by the viewport so a full sweep
    /// across the window is about one radian.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32, viewport_w: f32, viewport_h: f32) {
        if viewport_w <= 0.0 || viewport_h <= 0.0 {
            return;
        }
        self.pitch += dy / viewport_h;
        self.yaw += -dx / viewport_w;
    }

    /// Advance the camera one frame.
    pub fn update(&mut self, input: &Input, map: &TileMap) {
        if input.look_lock() {
            let turn = input.state_of(Action::TurnRight) - input.state_of(Action::TurnLeft);
            let look = input.state_of(Action::LookDown) - input.state_of(Action::LookUp);
            self.yaw -= turn * self.turn_rate;
            self.pitch += look * self.look_rate;
        }
        if self.mode == CameraMode::Player {
            self.pitch = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);
        }

        // Free mode strafes along the pitched view axes; walking keeps the
        // movement basis on the ground plane and composes pitch afterwards,
        // so looking down never steers the walk into the floor.
        let (basis, rotation) = match self.mode {
            CameraMode::Free => {
                let rotation = Mat4::from_rotation_y(self.yaw) * Mat4::from_rotation_x(self.pitch);
                (rotation, rotation)
            }
            CameraMode::Player => {
                let heading = Mat4::from_rotation_y(self.yaw);
                (heading, heading * Mat4::from_rotation_x(self.pitch))
            }
        };
        self.rotation = rotation;

        if input.look_lock() {
            let mut push = Vec3::ZERO;
            push += basis.transform_vector3(FORWARD) * input.state_of(Action::Forward);
            push += basis.transform_vector3(BACKWARD) * input.state_of(Action::Backward);
            push += basis.transform_vector3(STRAFE_LEFT) * input.state_of(Action::StrafeLeft);
            push += basis.transform_vector3(STRAFE_RIGHT) * input.state_of(Action::StrafeRight);
            if self.mode == CameraMode::Free {
                push += UP * input.state_of(Action::Up);
                push += DOWN * input.state_of(Action::Down);
            }
            self.velocity += push;
        }

        match self.mode {
            CameraMode::Free => {
                self.position += self.velocity;
                self.last_resolution = CollisionAxes::Both;
            }
            CameraMode::Player => {
                let resolved = resolve_movement(self.position, self.velocity, map);
                self.position += resolved.displacement;
                self.last_resolution = resolved.axes;
            }
        }
        self.velocity *= self.friction;

        self.model = Mat4::from_translation(self.position) * self.rotation;
        self.view = self.model.inverse();
        self.projection_view = self.projection * self.view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Input, Key};
    use crate::world::tilemap::data_offset;
    use std::f32::consts::FRAC_PI_2;

    fn open_map(width: u32, height: u32) -> TileMap {
        let size = (width * height * 4) as usize;
        let mut tiles = vec![0u8; size];
        for y in 0..height {
            for x in 0..width {
                tiles[data_offset(x, y, width)] = 0x01;
            }
        }
        TileMap::new(width, height, tiles, vec![0u8; size], vec![0u8; size])
    }

    fn locked_input() -> Input {
        let mut input = Input::default();
        input.set_look_lock(true);
        input
    }

    #[test]
    fn test_no_movement_without_look_lock() {
        let map = open_map(8, 8);
        let mut camera = Camera::new(Vec3::new(-4.0 * 64.0, 0.0, -4.0 * 64.0), 0.0);
        let mut input = Input::default();
        input.keyboard.press(Key::KeyW);
        input.sample();
        let start = camera.position;
        camera.update(&input, &map);
        assert_eq!(camera.position, start);
    }

    #[test]
    fn test_player_pitch_clamps_walking_only() {
        let map = open_map(8, 8);
        let mut camera = Camera::new(Vec3::ZERO, 0.0);
        let input = Input::default();

        camera.pitch = 2.0;
        camera.update(&input, &map);
        assert!((camera.pitch - PLAYER_PITCH_LIMIT).abs() < 1e-6);

        camera.mode = CameraMode::Free;
        camera.pitch = 2.0;
        camera.update(&input, &map);
        assert_eq!(camera.pitch, 2.0);
    }

    #[test]
    fn test_toggle_into_player_resets_height() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 0.0), 0.0);
        camera.toggle_mode();
        assert_eq!(camera.mode, CameraMode::Free);
        camera.position.y = -300.0;
        camera.toggle_mode();
        assert_eq!(camera.mode, CameraMode::Player);
        assert_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let map = open_map(16, 16);
        // Yaw -pi/2 turns the -Z forward axis onto +X.
        let mut camera = Camera::new(Vec3::new(-8.0 * 64.0, 0.0, -8.0 * 64.0), -FRAC_PI_2);
        let mut input = locked_input();
        input.keyboard.press(Key::KeyW);
        input.sample();
        let start = camera.position;
        camera.update(&input, &map);
        let moved = camera.position - start;
        assert!(moved.x > 0.9, "moved = {moved:?}");
        assert!(moved.z.abs() < 1e-4);
    }

    #[test]
    fn test_impulse_decays_as_geometric_series() {
        let map = open_map(16, 16);
        let mut camera = Camera::new(Vec3::new(-8.0 * 64.0, 0.0, -8.0 * 64.0), 0.0);
        let mut input = locked_input();

        // One frame of forward input, then coasting.
        input.keyboard.press(Key::KeyW);
        input.sample();
        camera.update(&input, &map);
        input.keyboard.release(Key::KeyW);
        input.sample();
        let frames = 20;
        for _ in 1..frames {
            camera.update(&input, &map);
        }

        let f = FRICTION.z;
        let expected = -(1.0 - f.powi(frames)) / (1.0 - f);
        let start_z = -8.0 * 64.0;
        assert!(
            (camera.position.z - (start_z + expected)).abs() < 1e-2,
            "z = {}, expected {}",
            camera.position.z,
            start_z + expected
        );
        // Velocity has all but died out.
        assert!(camera.velocity.length() < 0.02);
    }

    #[test]
    fn test_diagonal_input_is_not_normalized() {
        let map = open_map(16, 16);
        let start = Vec3::new(-8.0 * 64.0, 0.0, -8.0 * 64.0);

        let mut forward_only = Camera::new(start, 0.0);
        let mut input = locked_input();
        input.keyboard.press(Key::KeyW);
        input.sample();
        forward_only.update(&input, &map);
        let straight = (forward_only.position - start).length();

        let mut diagonal = Camera::new(start, 0.0);
        input.keyboard.press(Key::KeyA);
        input.sample();
        diagonal.update(&input, &map);
        let diag = (diagonal.position - start).length();

        assert!(diag > straight * 1.3, "diag = {diag}, straight = {straight}");
    }

    #[test]
    fn test_view_is_model_inverse() {
        let map = open_map(8, 8);
        let mut camera = Camera::new(Vec3::new(-64.0, 0.0, -64.0), 0.7);
        camera.pitch = 0.3;
        camera.update(&Input::default(), &map);
        let product = camera.model * camera.view;
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }
}
