//! Keyboard Device
//!
//! A window-system-agnostic keyboard: the shell translates its native key
//! events into [`Key`] presses and the simulation only ever sees these.

use std::collections::HashSet;

use super::{Binding, InputDevice};

/// Keys the town binds by default. Deliberately not a full keyboard map;
/// extend as bindings need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Tab,
    Escape,
}

/// Pressed-key set fed by the window shell.
#[derive(Debug, Default)]
pub struct Keyboard {
    pressed: HashSet<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

impl InputDevice for Keyboard {
    fn intensity_of(&self, binding: &Binding) -> f32 {
        match binding {
            Binding::Key(key) if self.pressed.contains(key) => 1.0,
            _ => 0.0,
        }
    }
}
