//! Gamepad Device
//!
//! Analog stick state fed by the shell. Each binding picks one axis and a
//! direction; the intensity is the deflection into that direction, so one
//! stick axis serves an action pair (e.g. forward/backward).

use super::{Binding, InputDevice};

/// Number of tracked analog axes (two sticks, two triggers).
pub const AXES: usize = 6;

#[derive(Debug, Default)]
pub struct Gamepad {
    connected: bool,
    axes: [f32; AXES],
}

impl Gamepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            self.axes = [0.0; AXES];
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Raw axis value in `[-1, 1]`; out-of-range indices are dropped.
    pub fn set_axis(&mut self, axis: usize, value: f32) {
        if let Some(slot) = self.axes.get_mut(axis) {
            *slot = value.clamp(-1.0, 1.0);
        }
    }
}

impl InputDevice for Gamepad {
    fn intensity_of(&self, binding: &Binding) -> f32 {
        if !self.connected {
            return 0.0;
        }
        match *binding {
            Binding::GamepadAxis { axis, sign } => {
                let value = self.axes.get(axis).copied().unwrap_or(0.0);
                (value * sign).max(0.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_direction_split() {
        let mut pad = Gamepad::new();
        pad.set_connected(true);
        pad.set_axis(1, -0.6);
        let fwd = Binding::GamepadAxis { axis: 1, sign: -1.0 };
        let back = Binding::GamepadAxis { axis: 1, sign: 1.0 };
        assert!((pad.intensity_of(&fwd) - 0.6).abs() < 1e-6);
        assert_eq!(pad.intensity_of(&back), 0.0);
    }

    #[test]
    fn test_disconnected_pad_reads_zero() {
        let mut pad = Gamepad::new();
        pad.set_axis(0, 1.0);
        let b = Binding::GamepadAxis { axis: 0, sign: 1.0 };
        assert_eq!(pad.intensity_of(&b), 0.0);
        pad.set_connected(true);
        pad.set_axis(0, 1.0);
        assert_eq!(pad.intensity_of(&b), 1.0);
        pad.set_connected(false);
        assert_eq!(pad.intensity_of(&b), 0.0);
    }
}
