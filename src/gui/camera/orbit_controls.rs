//! Pointer-driven camera motion: orbit, pan and zoom around the target,
//! and mouse-look for free-fly.

use bevy::math::{Vec2, Vec3};

use crate::physics::util::vectors::look_basis;

use super::{config::CameraConfig, presets::CameraPose};

/// Keeps the polar angle away from the poles so the view never flips
const POLAR_MARGIN: f32 = 0.01;

/// Orbit speeds and zoom limits, copied from the config
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Disabled while in free-fly
    pub enabled: bool,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControls {
    /// Enabled, with speeds and limits from `config`
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            enabled: true,
            rotate_speed: config.rotate_speed,
            pan_speed: config.pan_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance.max(f32::EPSILON),
            max_distance: config.max_distance.max(config.min_distance),
        }
    }

    /// Swings the position around the target
    pub fn rotate(&self, pose: &mut CameraPose, delta: Vec2) {
        if !self.enabled || delta == Vec2::ZERO {
            return;
        }
        let angles = delta * self.rotate_speed;
        if let Some(position) = swing(pose.target, pose.position, -angles.x, -angles.y) {
            pose.position = position;
        }
    }

    /// Slides both the position and the target across the view plane
    pub fn pan(&self, pose: &mut CameraPose, delta: Vec2) {
        if !self.enabled || delta == Vec2::ZERO {
            return;
        }
        let Some(basis) = look_basis(pose.position, pose.target) else {
            return;
        };
        let scale = pose.distance() * self.pan_speed;
        let shift = (basis.up * delta.y - basis.right * delta.x) * scale;
        pose.position += shift;
        pose.target += shift;
    }

    /// Moves the position along the view line, positive scroll gets closer
    pub fn zoom(&self, pose: &mut CameraPose, scroll: f32) {
        if !self.enabled || scroll == 0.0 {
            return;
        }
        let offset = pose.position - pose.target;
        let Some(direction) = offset.try_normalize() else {
            return;
        };
        let distance = (offset.length() * (-scroll * self.zoom_speed).exp())
            .clamp(self.min_distance, self.max_distance);
        pose.position = pose.target + direction * distance;
    }

    /// Turns the target around the position. Works whether or not orbiting is enabled.
    pub fn look(&self, pose: &mut CameraPose, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        let angles = delta * self.rotate_speed;
        if let Some(target) = swing(pose.position, pose.target, -angles.x, angles.y) {
            pose.target = target;
        }
    }
}

/// Rotates `point` around `center` by an azimuth and a polar change, in radians.
/// The polar angle is measured from +y and kept inside `(0, π)`.
fn swing(center: Vec3, point: Vec3, d_azimuth: f32, d_polar: f32) -> Option<Vec3> {
    let offset = point - center;
    let radius = offset.length();
    if radius <= f32::EPSILON {
        return None;
    }
    let azimuth = offset.x.atan2(offset.z) + d_azimuth;
    let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() + d_polar)
        .clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
    Some(
        center
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            ),
    )
}
