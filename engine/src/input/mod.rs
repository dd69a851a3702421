//! Input
//!
//! Device-independent input aggregation. Devices implement [`InputDevice`]
//! and report an intensity for each binding; [`Input::sample`] collapses
//! all devices into one per-action state by keeping the strongest reading.
//! Pointer deltas bypass the action system entirely and are drained raw by
//! the camera while look-lock is held.

pub mod actions;
pub mod gamepad;
pub mod keyboard;

use std::collections::HashMap;

pub use actions::Action;
pub use gamepad::Gamepad;
pub use keyboard::{Key, Keyboard};

/// Intensity at or above which an analog action counts as "pressed".
pub const PRESS_THRESHOLD: f32 = 0.25;

/// One physical control mapped onto an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    Key(Key),
    /// One direction of an analog axis; `sign` selects which half.
    GamepadAxis { axis: usize, sign: f32 },
}

/// A device that can report how strongly a binding is engaged, in `[0, 1]`.
pub trait InputDevice {
    fn intensity_of(&self, binding: &Binding) -> f32;
}

/// Action-to-bindings table.
#[derive(Debug, Clone)]
pub struct Bindings {
    map: HashMap<Action, Vec<Binding>>,
}

impl Bindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, action: Action, binding: Binding) {
        self.map.entry(action).or_default().push(binding);
    }

    pub fn of(&self, action: Action) -> &[Binding] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for Bindings {
    /// WASD plus arrows for movement, Q/E and PageUp/PageDown for vertical
    /// flight, left stick for walking, right stick for turning and looking.
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind(Action::Forward, Binding::Key(Key::KeyW));
        b.bind(Action::Forward, Binding::Key(Key::ArrowUp));
        b.bind(Action::Forward, Binding::GamepadAxis { axis: 1, sign: -1.0 });
        b.bind(Action::Backward, Binding::Key(Key::KeyS));
        b.bind(Action::Backward, Binding::Key(Key::ArrowDown));
        b.bind(Action::Backward, Binding::GamepadAxis { axis: 1, sign: 1.0 });
        b.bind(Action::StrafeLeft, Binding::Key(Key::KeyA));
        b.bind(Action::StrafeLeft, Binding::GamepadAxis { axis: 0, sign: -1.0 });
        b.bind(Action::StrafeRight, Binding::Key(Key::KeyD));
        b.bind(Action::StrafeRight, Binding::GamepadAxis { axis: 0, sign: 1.0 });
        b.bind(Action::Up, Binding::Key(Key::KeyQ));
        b.bind(Action::Up, Binding::Key(Key::PageUp));
        b.bind(Action::Down, Binding::Key(Key::KeyE));
        b.bind(Action::Down, Binding::Key(Key::PageDown));
        b.bind(Action::TurnLeft, Binding::Key(Key::ArrowLeft));
        b.bind(Action::TurnLeft, Binding::GamepadAxis { axis: 2, sign: -1.0 });
        b.bind(Action::TurnRight, Binding::Key(Key::ArrowRight));
        b.bind(Action::TurnRight, Binding::GamepadAxis { axis: 2, sign: 1.0 });
        b.bind(Action::LookUp, Binding::GamepadAxis { axis: 3, sign: -1.0 });
        b.bind(Action::LookDown, Binding::GamepadAxis { axis: 3, sign: 1.0 });
        b
    }
}

/// Aggregated input state for one frame.
pub struct Input {
    pub keyboard: Keyboard,
    pub gamepad: Gamepad,
    bindings: Bindings,
    state: [f32; Action::ALL.len()],
    look_lock: bool,
    pointer_delta: (f32, f32),
}

impl Input {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            keyboard: Keyboard::new(),
            gamepad: Gamepad::new(),
            bindings,
            state: [0.0; Action::ALL.len()],
            look_lock: false,
            pointer_delta: (0.0, 0.0),
        }
    }

    /// Re-read every action from every device. For each action the reading
    /// with the largest magnitude wins; sign is preserved.
    pub fn sample(&mut self) {
        for action in Action::ALL {
            let mut best = 0.0f32;
            for binding in self.bindings.of(action) {
                for device in [&self.keyboard as &dyn InputDevice, &self.gamepad] {
                    let value = device.intensity_of(binding);
                    if value.abs() > best.abs() {
                        best = value;
                    }
                }
            }
            self.state[action.index()] = best;
        }
    }

    /// Analog state of an action as of the last [`sample`](Self::sample).
    pub fn state_of(&self, action: Action) -> f32 {
        self.state[action.index()]
    }

    /// Digital view of an action state.
    pub fn is_pressed(&self, action: Action) -> bool {
        self.state_of(action).abs() >= PRESS_THRESHOLD
    }

    /// While unlocked, look input and movement are ignored; the shell sets
    /// this when it grabs the pointer.
    pub fn set_look_lock(&mut self, locked: bool) {
        self.look_lock = locked;
        if !locked {
            self.pointer_delta = (0.0, 0.0);
        }
    }

    pub fn look_lock(&self) -> bool {
        self.look_lock
    }

    /// Accumulate a raw pointer motion delta (pixels).
    pub fn push_pointer_delta(&mut self, dx: f32, dy: f32) {
        if self.look_lock {
            self.pointer_delta.0 += dx;
            self.pointer_delta.1 += dy;
        }
    }

    /// Drain the accumulated pointer delta for this frame.
    pub fn take_pointer_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.pointer_delta)
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(Bindings::default())
    }
}
