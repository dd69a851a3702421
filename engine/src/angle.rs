//! Angle Utilities
//!
//! Small helpers for keeping angles in a workable range and computing the
//! shortest signed rotation between two headings. Used by the camera and by
//! the character heading-to-sprite mapping.

use std::f32::consts::{PI, TAU};

/// Reduce an angle into `[-2π, 2π]` by repeated ±2π steps.
///
/// This deliberately mirrors the iterative reduction the rest of the
/// simulation was tuned against instead of using `rem_euclid`. All callers
/// feed angles that grow by at most a few radians per frame, so the loop
/// runs at most once or twice.
pub fn wrap_angle(mut angle: f32) -> f32 {
    if angle < 0.0 {
        while angle < -TAU {
            angle += TAU;
        }
    } else {
        while angle > TAU {
            angle -= TAU;
        }
    }
    angle
}

/// Signed shortest rotation that takes heading `a` onto heading `b`.
///
/// The result is in `[-π, π)`; the half-turn boundary resolves to `-π`.
pub fn shortest_arc(a: f32, b: f32) -> f32 {
    if (b - a).abs() < PI {
        return b - a;
    }
    if b > a {
        return b - a - TAU;
    }
    b - a + TAU
}
