//! Per body motion.
//!
//! Revolution is an absolute function of simulation time, so a body's orbital
//! phase at `t` is the same no matter how many steps it took to get there.
//! Spin is accumulated step by step, since only its visual continuity matters.

use std::f32::consts::TAU;

use bevy::math::{EulerRot, Quat, Vec3};

use super::components::{OrbitDescriptor, Spin};

/// Position on the orbit at simulation time `t` (seconds), relative to the
/// origin of the orbit pivot's parent space.
pub fn orbital_position(orbit: &OrbitDescriptor, t: f64) -> Vec3 {
    let angle = orbit.angular_speed.0 as f64 * t;
    let radius = orbit.radius.0 as f64;
    Vec3::new(
        (radius * angle.cos()) as f32,
        0.0,
        (radius * angle.sin()) as f32,
    )
}

/// Accumulated spin angles of a body
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SpinState {
    angles: Vec3,
}

impl SpinState {
    /// Advance by one logic step. Angles are kept in `[0, 2π)`.
    pub fn advance(&mut self, spin: Spin, dt: f32) {
        let angles = self.angles + spin.0 * dt;
        self.angles = Vec3::new(
            angles.x.rem_euclid(TAU),
            angles.y.rem_euclid(TAU),
            angles.z.rem_euclid(TAU),
        );
    }

    pub fn get_angles(&self) -> Vec3 {
        self.angles
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.angles.x, self.angles.y, self.angles.z)
    }
}
