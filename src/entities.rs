//! This module contains all the top level bundles.
//! These are the things that exist in the scene.

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub mod celestials;

pub struct EntitiesPluginGroup;

impl PluginGroup for EntitiesPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(celestials::celestial::CelestialPlugin)
    }
}
