use bevy::{ecs::system::Resource, math::Vec3, render::color::Color};

use crate::physics::orbits::components::{
    Length, OrbitDescriptor, RingDescriptor, Spin,
};

use super::celestial::CelestialBody;

/// Builds a [`CelestialBody`] one property at a time
pub struct CelestialBuilder {
    name: String,
    radius: f32,
    spin: Spin,
    orbit: Option<OrbitDescriptor>,
    ring: Option<RingDescriptor>,
    primary: Option<String>,
    position: Vec3,
    color: Color,
    emissive: bool,
}

impl CelestialBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            radius: 1.0,
            spin: Spin::default(),
            orbit: None,
            ring: None,
            primary: None,
            position: Vec3::ZERO,
            color: Color::GRAY,
            emissive: false,
        }
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn spin(mut self, spin: Vec3) -> Self {
        self.spin = Spin(spin);
        self
    }

    pub fn spin_y(mut self, rate: f32) -> Self {
        self.spin = Spin::around_y(rate);
        self
    }

    pub fn orbit(mut self, radius: f32, angular_speed: f32) -> Self {
        self.orbit = Some(OrbitDescriptor::new(radius, angular_speed));
        self
    }

    pub fn ring(mut self, inner_radius: f32, outer_radius: f32) -> Self {
        self.ring = Some(RingDescriptor::new(inner_radius, outer_radius));
        self
    }

    /// Make this body orbit `primary` instead of the world origin
    pub fn satellite_of(mut self, primary: &str) -> Self {
        self.primary = Some(primary.to_owned());
        self
    }

    /// Fixed position, only used when the body has no orbit
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn emissive(mut self, emissive: bool) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn build(self) -> CelestialBody {
        CelestialBody {
            name: self.name,
            radius: Length(self.radius),
            spin: self.spin,
            orbit: self.orbit,
            ring: self.ring,
            primary: self.primary,
            position: self.position,
            color: self.color,
            emissive: self.emissive,
        }
    }
}

/// The bodies to compose the scene from.
/// Insert this before the [`super::celestial::CelestialPlugin`] to replace the default.
#[derive(Resource, Debug, Clone)]
pub struct SolarSystemConfig {
    pub bodies: Vec<CelestialBody>,
}

impl Default for SolarSystemConfig {
    fn default() -> Self {
        Self {
            bodies: vec![
                CelestialBuilder::new("sun")
                    .radius(10.0)
                    .spin_y(0.05)
                    .color(Color::rgb(1.0, 0.8, 0.2))
                    .emissive(true)
                    .build(),
                CelestialBuilder::new("mercury")
                    .radius(1.5)
                    .orbit(20.0, 0.4)
                    .spin_y(0.1)
                    .color(Color::rgb(0.6, 0.6, 0.6))
                    .build(),
                CelestialBuilder::new("venus")
                    .radius(2.5)
                    .orbit(30.0, 0.25)
                    .spin_y(-0.05)
                    .color(Color::rgb(0.9, 0.7, 0.4))
                    .build(),
                CelestialBuilder::new("earth")
                    .radius(3.0)
                    .orbit(45.0, 0.15)
                    .spin_y(0.5)
                    .color(Color::rgb(0.2, 0.4, 0.9))
                    .build(),
                CelestialBuilder::new("moon")
                    .radius(0.8)
                    .orbit(6.0, 0.3)
                    .satellite_of("earth")
                    .color(Color::rgb(0.8, 0.8, 0.8))
                    .build(),
                CelestialBuilder::new("mars")
                    .radius(2.0)
                    .orbit(60.0, 0.1)
                    .spin_y(0.45)
                    .color(Color::rgb(0.8, 0.3, 0.1))
                    .build(),
                CelestialBuilder::new("jupiter")
                    .radius(6.0)
                    .orbit(85.0, 0.05)
                    .spin_y(1.0)
                    .color(Color::rgb(0.8, 0.6, 0.4))
                    .build(),
                CelestialBuilder::new("saturn")
                    .radius(5.0)
                    .orbit(115.0, 0.035)
                    .spin(Vec3::new(0.0, 0.9, 0.0))
                    .ring(7.0, 11.0)
                    .color(Color::rgb(0.9, 0.8, 0.5))
                    .build(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let body = CelestialBuilder::new("rock").build();
        assert_eq!(body.name, "rock");
        assert_eq!(body.radius, Length(1.0));
        assert!(body.orbit.is_none());
        assert!(body.ring.is_none());
        assert!(body.primary.is_none());
        assert!(!body.emissive);
    }

    #[test]
    fn test_default_system_has_satellite_and_ring() {
        let config = SolarSystemConfig::default();
        assert!(config.bodies.iter().any(|body| body.primary.is_some()));
        assert!(config.bodies.iter().any(|body| body.ring.is_some()));
        assert!(config.bodies.iter().any(|body| body.orbit.is_none()));
    }
}
