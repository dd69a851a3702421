//! Walkabout
//!
//! The playable town: loads the map atlas and sprite sheets, builds the
//! scene and walks the event loop. Click to grab the pointer and walk,
//! Tab toggles free flight, Escape quits.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use tiletown_engine::frame::FrameLoop;
use tiletown_engine::input::Key;
use tiletown_engine::render::{RenderState, SheetImage, extract_wall_instances};
use tiletown_engine::world::decode_ground_atlas;
use tiletown_engine::{Settings, TownScene};

const SETTINGS_PATH: &str = "walkabout.json";
const MAP_ATLAS: &str = "assets/town.png";
const WALL_ATLAS: &str = "assets/textures.png";
const CHARS_SHEET: &str = "assets/chars.png";
const PROPS_SHEET: &str = "assets/sprites.png";

/// Side-by-side channel grids in the map atlas.
const MAP_CHANNELS: u32 = 3;

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::KeyW),
        KeyCode::KeyA => Some(Key::KeyA),
        KeyCode::KeyS => Some(Key::KeyS),
        KeyCode::KeyD => Some(Key::KeyD),
        KeyCode::KeyQ => Some(Key::KeyQ),
        KeyCode::KeyE => Some(Key::KeyE),
        KeyCode::ArrowUp => Some(Key::ArrowUp),
        KeyCode::ArrowDown => Some(Key::ArrowDown),
        KeyCode::ArrowLeft => Some(Key::ArrowLeft),
        KeyCode::ArrowRight => Some(Key::ArrowRight),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

struct WalkaboutApp {
    settings: Settings,
    window: Option<Arc<Window>>,
    gpu: Option<RenderState>,
    scene: Option<TownScene>,
    frame_loop: FrameLoop,
    started_at: Instant,
}

impl WalkaboutApp {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            window: None,
            gpu: None,
            scene: None,
            frame_loop: FrameLoop::new(),
            started_at: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    fn load_rgba(path: &str) -> (Vec<u8>, u32, u32) {
        let image = image::open(path)
            .unwrap_or_else(|err| panic!("failed to load {path}: {err}"))
            .to_rgba8();
        let (width, height) = image.dimensions();
        (image.into_raw(), width, height)
    }

    fn initialize(&mut self, window: Arc<Window>) {
        let (atlas_rgba, atlas_w, atlas_h) = Self::load_rgba(MAP_ATLAS);
        let decoded = decode_ground_atlas(
            &atlas_rgba,
            atlas_w,
            atlas_h,
            atlas_w / MAP_CHANNELS,
            atlas_h,
        )
        .expect("failed to decode map atlas");

        let walls = extract_wall_instances(&decoded.map);
        let mut scene = TownScene::new(decoded, &self.settings, self.now_ms());

        let size = window.inner_size();
        scene.set_viewport(size.width as f32, size.height as f32);

        let (wall_rgba, wall_w, wall_h) = Self::load_rgba(WALL_ATLAS);
        let (chars_rgba, chars_w, chars_h) = Self::load_rgba(CHARS_SHEET);
        let (props_rgba, props_w, props_h) = Self::load_rgba(PROPS_SHEET);
        let gpu = RenderState::new(
            Arc::clone(&window),
            &walls,
            SheetImage { rgba: &wall_rgba, width: wall_w, height: wall_h },
            SheetImage { rgba: &chars_rgba, width: chars_w, height: chars_h },
            SheetImage { rgba: &props_rgba, width: props_w, height: props_h },
        );

        self.scene = Some(scene);
        self.gpu = Some(gpu);
        self.frame_loop.start();
        self.window = Some(window);
    }

    fn grab_pointer(&mut self) {
        let Some(window) = &self.window else { return };
        if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
            let _ = window.set_cursor_grab(CursorGrabMode::Confined);
        }
        window.set_cursor_visible(false);
        if let Some(scene) = self.scene.as_mut() {
            scene.input.set_look_lock(true);
        }
    }

    fn release_pointer(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.input.set_look_lock(false);
        }
    }

    fn redraw(&mut self) {
        if !self.frame_loop.is_running() {
            return;
        }
        let now = self.now_ms();
        let (Some(scene), Some(gpu)) = (self.scene.as_mut(), self.gpu.as_mut()) else {
            return;
        };
        self.frame_loop.advance();
        let draw_list = scene.step(now);
        match gpu.render(draw_list) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (gpu.config.width, gpu.config.height);
                gpu.resize(w, h);
            }
            Err(err) => {
                tracing::error!(%err, "surface error, frame dropped");
            }
        }
    }
}

impl ApplicationHandler for WalkaboutApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = WindowAttributes::default()
                .with_title("Walkabout [Click: grab pointer, Tab: free flight]")
                .with_inner_size(PhysicalSize::new(1280, 720));
            let window = Arc::new(event_loop.create_window(attrs).unwrap());
            self.initialize(window);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
                if let Some(scene) = self.scene.as_mut() {
                    scene.set_viewport(size.width as f32, size.height as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if pressed && !event.repeat {
                    match code {
                        KeyCode::Escape => {
                            self.release_pointer();
                            event_loop.exit();
                            return;
                        }
                        KeyCode::Tab => {
                            if let Some(scene) = self.scene.as_mut() {
                                scene.toggle_camera_mode();
                            }
                        }
                        _ => {}
                    }
                }
                if let (Some(scene), Some(key)) = (self.scene.as_mut(), map_key(code)) {
                    if pressed {
                        scene.input.keyboard.press(key);
                    } else {
                        scene.input.keyboard.release(key);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left && state == ElementState::Pressed {
                    self.grab_pointer();
                }
            }
            WindowEvent::Focused(false) => self.release_pointer(),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(scene) = self.scene.as_mut() {
                scene.input.push_pointer_delta(delta.0 as f32, delta.1 as f32);
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load_or_default(SETTINGS_PATH);

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = WalkaboutApp::new(settings);
    event_loop.run_app(&mut app).unwrap();
}
