//! Celestials are the bodies of the scene: stars, planets, moons and their rings

pub mod builder;
pub mod celestial;
pub mod scene_graph;
