//! Orbit guides.
//! A static circle at the orbit radius, sampled once and drawn every frame
//! in the orbit pivot's parent space.

use std::f32::consts::TAU;

use bevy::math::Vec3;
use itertools::Itertools;

use super::components::{Length, OrbitDescriptor};

/// Angular resolution of the orbit guides
pub const ORBIT_PATH_SEGMENTS: usize = 128;

/// A closed polyline around the parent origin in the xz plane
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    points: Vec<Vec3>,
}

impl OrbitPath {
    pub fn from_orbit(orbit: &OrbitDescriptor) -> Self {
        Self::circle(orbit.radius, ORBIT_PATH_SEGMENTS)
    }

    /// Sample a circle with `nb_segments` segments.
    /// The last point is the first point again so the loop closes exactly.
    pub fn circle(radius: Length, nb_segments: usize) -> Self {
        let nb_segments = nb_segments.max(3);
        let mut points: Vec<Vec3> = Vec::with_capacity(nb_segments + 1);
        for i in 0..nb_segments {
            let angle = TAU * (i as f32) / (nb_segments as f32);
            points.push(Vec3::new(
                radius.0 * angle.cos(),
                0.0,
                radius.0 * angle.sin(),
            ));
        }
        points.push(points[0]);
        Self { points }
    }

    pub fn get_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Consecutive pairs of points
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.iter().copied().tuple_windows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_is_closed() {
        let path = OrbitPath::from_orbit(&OrbitDescriptor::new(45.0, 0.01));
        let points = path.get_points();
        assert_eq!(points.len(), ORBIT_PATH_SEGMENTS + 1);
        assert_eq!(points.first(), points.last());
        assert_eq!(path.segments().count(), ORBIT_PATH_SEGMENTS);
    }

    #[test]
    fn test_points_on_radius() {
        let path = OrbitPath::circle(Length(12.5), 64);
        for point in path.get_points() {
            assert!((point.length() - 12.5).abs() < 1e-4);
            assert_eq!(point.y, 0.0);
        }
    }

    #[test]
    fn test_minimum_resolution() {
        let path = OrbitPath::circle(Length(1.0), 0);
        assert_eq!(path.segments().count(), 3);
    }
}
