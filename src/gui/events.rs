//! Notifications other parts of the app can listen to

use bevy::{
    app::{App, Plugin, Update},
    ecs::{
        event::{Event, EventReader},
        schedule::IntoSystemConfigs,
        system::Res,
    },
    log::info,
};

use crate::{
    entities::celestials::{celestial::BodyId, scene_graph::SceneGraph},
    physics::util::clock::FrameSet,
};

use super::camera::controller::CameraMode;

/// The picked body changed. `None` means the selection was cleared.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged(pub Option<BodyId>);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraModeChanged(pub CameraMode);

/// A camera transition reached its end pose, with the preset name if it had one
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct TransitionCompleted(pub Option<String>);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowTargetChanged(pub Option<BodyId>);

/// Registers the events and logs them
pub struct NotificationPlugin;

impl Plugin for NotificationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SelectionChanged>();
        app.add_event::<CameraModeChanged>();
        app.add_event::<TransitionCompleted>();
        app.add_event::<FollowTargetChanged>();
        app.add_systems(Update, Self::log_notifications_system.after(FrameSet::Present));
    }
}

/// Bevy Systems
impl NotificationPlugin {
    fn log_notifications_system(
        scene: Res<SceneGraph>,
        mut selection_evr: EventReader<SelectionChanged>,
        mut completed_evr: EventReader<TransitionCompleted>,
        mut follow_evr: EventReader<FollowTargetChanged>,
    ) {
        let name_of = |body: Option<BodyId>| {
            body.and_then(|id| scene.get_body(id))
                .map(|body| body.get_name().to_owned())
                .unwrap_or_else(|| "nothing".to_owned())
        };
        for ev in selection_evr.read() {
            info!("Selected {}", name_of(ev.0));
        }
        for ev in completed_evr.read() {
            match &ev.0 {
                Some(preset) => info!("Camera arrived at preset {}", preset),
                None => info!("Camera arrived"),
            }
        }
        for ev in follow_evr.read() {
            info!("Following {}", name_of(ev.0));
        }
    }
}
