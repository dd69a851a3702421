//! Input Actions
//!
//! The fixed set of abstract actions the simulation reads. Devices map
//! their own buttons and axes onto these; nothing downstream knows which
//! device produced a value.

/// An abstract input action with an analog intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Up,
    Down,
    LookUp,
    LookDown,
    TurnLeft,
    TurnRight,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Forward,
        Action::Backward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Up,
        Action::Down,
        Action::LookUp,
        Action::LookDown,
        Action::TurnLeft,
        Action::TurnRight,
    ];

    /// Dense index for per-action state arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Action::Forward => 0,
            Action::Backward => 1,
            Action::StrafeLeft => 2,
            Action::StrafeRight => 3,
            Action::Up => 4,
            Action::Down => 5,
            Action::LookUp => 6,
            Action::LookDown => 7,
            Action::TurnLeft => 8,
            Action::TurnRight => 9,
        }
    }
}
