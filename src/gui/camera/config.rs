//! Tunables for the camera controller

use std::time::Duration;

use bevy::{ecs::system::Resource, input::keyboard::KeyCode, math::Vec3};

use crate::physics::util::easing::{exponential_smoothing_fraction, rate_from_per_tick_fraction};

use super::presets::{CameraPose, CameraPresets};

/// How quickly a followed body is caught up with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowSmoothing {
    /// A fixed fraction of the remaining distance every logic step.
    /// Only frame-rate independent while the step length stays the same.
    PerTick(f32),
    /// `1 - e^(-rate * dt)` of the remaining distance every step
    Exponential {
        /// Per second
        rate: f32,
    },
}

impl FollowSmoothing {
    /// Fraction of the remaining distance to cover in a step of `dt` seconds
    pub fn fraction(&self, dt: f32) -> f32 {
        match *self {
            FollowSmoothing::PerTick(fraction) => fraction.clamp(0.0, 1.0),
            FollowSmoothing::Exponential { rate } => exponential_smoothing_fraction(rate, dt),
        }
    }
}

impl Default for FollowSmoothing {
    /// Same feel as covering 5% per step at 60 steps per second
    fn default() -> Self {
        FollowSmoothing::Exponential {
            rate: rate_from_per_tick_fraction(0.05, 60.0),
        }
    }
}

/// Keys for free-fly movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeFlyBindings {
    /// Along the view direction
    pub forward: KeyCode,
    /// Against the view direction
    pub back: KeyCode,
    /// Strafe left
    pub left: KeyCode,
    /// Strafe right
    pub right: KeyCode,
    /// Along world up
    pub up: KeyCode,
    /// Against world up
    pub down: KeyCode,
    /// Held to multiply the speed by [`CameraConfig::fast_multiplier`]
    pub fast: KeyCode,
}

impl Default for FreeFlyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::W,
            back: KeyCode::S,
            left: KeyCode::A,
            right: KeyCode::D,
            up: KeyCode::E,
            down: KeyCode::Q,
            fast: KeyCode::ShiftLeft,
        }
    }
}

/// Everything tunable about the camera.
/// Insert before the camera plugin to replace the default.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Where the camera starts
    pub initial_pose: CameraPose,
    /// Free-fly speed in world units per second
    pub move_speed: f32,
    /// Speed factor while the fast key is held
    pub fast_multiplier: f32,
    /// Free-fly keys
    pub bindings: FreeFlyBindings,
    /// Let the movement keys slide the orbit target around too
    pub keyboard_move_in_orbit: bool,
    /// Camera position relative to a followed body
    pub follow_offset: Vec3,
    /// How the camera catches up with a followed body
    pub follow_smoothing: FollowSmoothing,
    /// Used when a transition is started without a duration
    pub transition_duration: Duration,
    /// Radians per pixel of pointer motion
    pub rotate_speed: f32,
    /// World units per pixel per unit of distance to the target
    pub pan_speed: f32,
    /// Fraction of distance per wheel line
    pub zoom_speed: f32,
    /// Closest the orbit zoom gets to the target
    pub min_distance: f32,
    /// Furthest the orbit zoom gets from the target
    pub max_distance: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Named poses, which can be added to at runtime through the controller
    pub presets: CameraPresets,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_pose: CameraPose::default(),
            move_speed: 30.0,
            fast_multiplier: 4.0,
            bindings: FreeFlyBindings::default(),
            keyboard_move_in_orbit: true,
            follow_offset: Vec3::new(0.0, 8.0, 24.0),
            follow_smoothing: FollowSmoothing::default(),
            transition_duration: Duration::from_secs(2),
            rotate_speed: 0.005,
            pan_speed: 0.0015,
            zoom_speed: 0.1,
            min_distance: 2.0,
            max_distance: 600.0,
            fov_y: std::f32::consts::FRAC_PI_4,
            presets: CameraPresets::solar_system(),
        }
    }
}

impl CameraConfig {
    /// The default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`CameraConfig::initial_pose`]
    pub fn initial_pose(mut self, pose: CameraPose) -> Self {
        self.initial_pose = pose;
        self
    }

    /// Sets [`CameraConfig::move_speed`]
    pub fn move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Sets [`CameraConfig::follow_smoothing`]
    pub fn follow_smoothing(mut self, smoothing: FollowSmoothing) -> Self {
        self.follow_smoothing = smoothing;
        self
    }

    /// Sets [`CameraConfig::follow_offset`]
    pub fn follow_offset(mut self, offset: Vec3) -> Self {
        self.follow_offset = offset;
        self
    }

    /// Sets [`CameraConfig::transition_duration`]
    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    /// Replaces the preset table
    pub fn presets(mut self, presets: CameraPresets) -> Self {
        self.presets = presets;
        self
    }
}
