//! This module contains all the physics related code.
//!
//! When contributing to this module, please keep the following things in mind:
//! * Keep it game engine agnostic where possible. Bevy plugins live at the
//!   bottom of a file, after the plain types they drive.
//! * Physics should be highly unit tested.

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub mod orbits;
pub mod util;

pub struct PhysicsPluginGroup;

impl PluginGroup for PhysicsPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(util::clock::SchedulerPlugin)
    }
}
