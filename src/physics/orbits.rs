//! Kinematic orbits. Bodies are placed on circles as a function of time,
//! nothing here integrates forces.

pub mod components;
pub mod kinematics;
pub mod paths;
