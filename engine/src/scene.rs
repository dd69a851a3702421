//! Town Scene
//!
//! Owns the whole simulation: map, camera, entities, input and the frame
//! draw list. [`TownScene::step`] is the one entry point the shell calls
//! per frame; the fixed order inside it (input, camera, entities, draw
//! list) is the contract everything else was tuned against.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::Camera;
use crate::config::Settings;
use crate::entity::Entity;
use crate::entity::simulator::update_entities;
use crate::entity::spawn::spawn_characters;
use crate::input::Input;
use crate::render::draw_list::DrawList;
use crate::world::decode::DecodedMap;
use crate::world::tilemap::{TILE_SIZE, TileMap};

/// Camera spawn cell and heading.
pub const CAMERA_START_CELL: (i32, i32) = (82, 56);
pub const CAMERA_START_YAW: f32 = -FRAC_PI_2;

pub struct TownScene {
    pub map: TileMap,
    pub camera: Camera,
    pub entities: Vec<Entity>,
    pub input: Input,
    draw_list: DrawList,
    rng: StdRng,
    viewport: (f32, f32),
}

impl TownScene {
    /// Build the scene from a decoded map: the camera at its start cell,
    /// the decoded props, and a freshly spawned crowd.
    pub fn new(decoded: DecodedMap, settings: &Settings, now_ms: u64) -> Self {
        let mut rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut entities = decoded.props;
        spawn_characters(&mut entities, settings.character_count, now_ms, &mut rng);

        let start = Vec3::new(
            -(CAMERA_START_CELL.0 as f32) * TILE_SIZE,
            0.0,
            -(CAMERA_START_CELL.1 as f32) * TILE_SIZE,
        );
        let mut camera = Camera::new(start, CAMERA_START_YAW);
        camera.friction = Vec3::splat(settings.friction);
        camera.pitch_limit = settings.player_pitch_limit;
        camera.turn_rate = settings.turn_rate;
        camera.look_rate = settings.look_rate;
        camera.projection_params.fov_y = settings.fov_y;
        camera.projection = camera.projection_params.matrix();

        Self {
            map: decoded.map,
            camera,
            entities,
            input: Input::default(),
            draw_list: DrawList::default(),
            rng,
            viewport: (1.0, 1.0),
        }
    }

    /// Track the surface size; feeds the projection aspect ratio and the
    /// pointer-delta scaling.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_aspect_ratio(width / height);
    }

    pub fn toggle_camera_mode(&mut self) {
        self.camera.toggle_mode();
    }

    /// Advance the simulation one frame and return what to draw.
    pub fn step(&mut self, now_ms: u64) -> &DrawList {
        self.input.sample();
        if self.input.look_lock() {
            let (dx, dy) = self.input.take_pointer_delta();
            self.camera
                .apply_look_delta(dx, dy, self.viewport.0, self.viewport.1);
        }
        self.camera.update(&self.input, &self.map);
        update_entities(
            &mut self.entities,
            &self.camera,
            &self.map,
            now_ms,
            &mut self.rng,
        );
        self.draw_list.rebuild(&self.camera, &self.entities);
        &self.draw_list
    }
}
