//! This module contains all the GUI related code.
//! The camera, picking, and the windows drawn over the scene.

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub mod camera;
pub mod camera_window;
pub mod events;
pub mod picking;

pub struct GuiPluginGroup;

impl PluginGroup for GuiPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(events::NotificationPlugin)
            .add(camera::CameraPlugin)
            .add(picking::PickingPlugin)
            .add(camera_window::CameraWindowPlugin)
    }
}
