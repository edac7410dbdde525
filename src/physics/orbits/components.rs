#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Typed descriptors for bodies and their orbits.

use bevy::math::Vec3;
use derive_more::{Add, AddAssign, Sub, SubAssign, Sum};

/// A length in world units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Add, Sub, AddAssign, SubAssign, Sum)]
pub struct Length(pub f32);

impl Default for Length {
    fn default() -> Self {
        Length(1.0)
    }
}

/// An angular speed in radians per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Add, Sub, AddAssign, SubAssign)]
pub struct AngularSpeed(pub f32);

/// Intrinsic spin of a body in radians per second around each local axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Add, Sub, AddAssign, SubAssign)]
pub struct Spin(pub Vec3);

impl Spin {
    /// Spin around the local y axis only, which is what most bodies do
    pub fn around_y(rate: f32) -> Self {
        Spin(Vec3::new(0.0, rate, 0.0))
    }
}

/// A circular orbit around the origin of the parent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitDescriptor {
    /// Distance from the parent origin
    pub radius: Length,
    /// How fast the orbital phase advances
    pub angular_speed: AngularSpeed,
}

impl OrbitDescriptor {
    /// Creates a new orbit descriptor
    pub fn new(radius: f32, angular_speed: f32) -> Self {
        Self {
            radius: Length(radius),
            angular_speed: AngularSpeed(angular_speed),
        }
    }

    /// Seconds for one full revolution, or `None` for a stationary orbit
    pub fn period(&self) -> Option<f64> {
        if self.angular_speed.0 == 0.0 {
            None
        } else {
            Some(std::f64::consts::TAU / (self.angular_speed.0 as f64).abs())
        }
    }
}

/// A flat ring around a body, in the body's local xz plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingDescriptor {
    /// Inner edge of the ring
    pub inner_radius: Length,
    /// Outer edge of the ring
    pub outer_radius: Length,
}

impl RingDescriptor {
    /// Creates a new ring descriptor
    pub fn new(inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            inner_radius: Length(inner_radius),
            outer_radius: Length(outer_radius),
        }
    }

    /// Radius of the center line of the ring
    pub fn mid_radius(&self) -> Length {
        Length((self.inner_radius.0 + self.outer_radius.0) / 2.0)
    }

    /// Half of the ring's width
    pub fn half_width(&self) -> Length {
        Length((self.outer_radius.0 - self.inner_radius.0).abs() / 2.0)
    }
}
