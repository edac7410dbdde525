//! Camera poses and the named table of them

use bevy::{
    math::Vec3,
    transform::components::Transform,
};
use hashbrown::HashMap;
use itertools::Itertools;

use crate::physics::util::vectors::safe_up;

/// Where the camera is and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space
    pub position: Vec3,
    /// The point looked at
    pub target: Vec3,
}

impl CameraPose {
    /// A pose at `position` looking at `target`
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Component-wise linear interpolation of both points
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }

    /// Distance from the eye to the target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// A transform at the eye, looking at the target with y up where possible
    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position)
            .looking_at(self.target, safe_up(self.position, self.target))
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 120.0, 220.0), Vec3::ZERO)
    }
}

/// Named camera poses the camera can be animated to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraPresets {
    presets: HashMap<String, CameraPose>,
}

impl CameraPresets {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a preset, returning the one it replaced
    pub fn insert(&mut self, name: &str, pose: CameraPose) -> Option<CameraPose> {
        self.presets.insert(name.to_owned(), pose)
    }

    /// Builder form of [`CameraPresets::insert`]
    pub fn with(mut self, name: &str, pose: CameraPose) -> Self {
        self.insert(name, pose);
        self
    }

    /// Removes a preset, returning it if it existed
    pub fn remove(&mut self, name: &str) -> Option<CameraPose> {
        self.presets.remove(name)
    }

    /// The pose stored under `name`
    pub fn get(&self, name: &str) -> Option<&CameraPose> {
        self.presets.get(name)
    }

    /// Number of presets
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether there are no presets
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset names in a stable order, used for the number-key shortcuts
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).sorted().collect()
    }

    /// The presets the default scene ships with
    pub fn solar_system() -> Self {
        Self::new()
            .with("overview", CameraPose::default())
            .with(
                "sun",
                CameraPose::new(Vec3::new(0.0, 15.0, 40.0), Vec3::ZERO),
            )
            .with("top", CameraPose::new(Vec3::new(0.0, 300.0, 0.0), Vec3::ZERO))
            .with("side", CameraPose::new(Vec3::new(300.0, 0.0, 0.0), Vec3::ZERO))
            .with(
                "inner",
                CameraPose::new(Vec3::new(0.0, 40.0, 90.0), Vec3::ZERO),
            )
    }
}
