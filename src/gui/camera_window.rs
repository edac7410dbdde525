use bevy::{
    app::{App, Plugin, Update},
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    ecs::{
        entity::Entity,
        event::EventReader,
        query::With,
        schedule::IntoSystemConfigs,
        system::{Local, Query, Res, ResMut},
    },
    log::warn,
    window::PrimaryWindow,
};
use bevy_egui::{egui, EguiContexts};
use strum::IntoEnumIterator;

use crate::{
    entities::celestials::scene_graph::SceneGraph,
    physics::util::clock::{FrameScheduler, FrameSet, PlayPauseMode},
};

use super::{
    camera::controller::{CameraController, CameraMode},
    events::{SelectionChanged, TransitionCompleted},
    picking::Selection,
};

/// An egui window with the camera and simulation controls
pub struct CameraWindowPlugin;

impl Plugin for CameraWindowPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, camera_window_system.before(FrameSet::Input));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn camera_window_system(
    mut contexts: EguiContexts,
    q_windows: Query<Entity, With<PrimaryWindow>>,
    diagnostics: Res<DiagnosticsStore>,
    scene: Res<SceneGraph>,
    selection: Res<Selection>,
    mut controller: ResMut<CameraController>,
    mut scheduler: ResMut<FrameScheduler>,
    mut selection_evr: EventReader<SelectionChanged>,
    mut completed_evr: EventReader<TransitionCompleted>,
    mut last_event: Local<String>,
) {
    for ev in selection_evr.read() {
        *last_event = match ev.0.and_then(|id| scene.get_body(id)) {
            Some(body) => format!("selected {}", body.get_name()),
            None => "selection cleared".to_owned(),
        };
    }
    for ev in completed_evr.read() {
        *last_event = match &ev.0 {
            Some(preset) => format!("arrived at {}", preset),
            None => "arrived".to_owned(),
        };
    }

    let fps = diagnostics
        .get(FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let Ok(window) = q_windows.get_single() else {
        return;
    };
    let Some(ctx) = contexts.try_ctx_for_window_mut(window) else {
        return;
    };
    let name_of = |id| {
        scene
            .get_body(id)
            .map(|body| body.get_name().to_owned())
            .unwrap_or_default()
    };

    egui::Window::new("Camera Window").show(ctx, |ui| {
        ui.label(format!("FPS: {:.0}", fps));
        let clock = scheduler.get_clock();
        ui.label(format!(
            "Time: {:.2}s (step {})",
            clock.get_current_time_secs(),
            clock.get_current_frame()
        ));

        ui.separator();
        let current = controller.get_mode();
        ui.horizontal(|ui| {
            for mode in CameraMode::iter() {
                if ui.radio(current == mode, mode.to_string()).clicked() {
                    controller.set_mode(mode);
                }
            }
        });
        let pose = *controller.get_pose();
        ui.label(format!(
            "Position: ({:.1}, {:.1}, {:.1})",
            pose.position.x, pose.position.y, pose.position.z
        ));
        if let Some(transition) = controller.get_transition() {
            ui.label(format!(
                "Moving to {} over {:.1}s",
                transition.get_preset().unwrap_or("a pose"),
                transition.get_duration().as_secs_f32()
            ));
        }

        ui.separator();
        let presets: Vec<String> = controller
            .get_presets()
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        ui.horizontal_wrapped(|ui| {
            for (idx, name) in presets.iter().enumerate() {
                if ui.button(format!("{} {}", idx + 1, name)).clicked() {
                    if let Err(err) = controller.animate_to_preset(name, None) {
                        warn!("{}", err);
                    }
                }
            }
        });

        ui.separator();
        match selection.get() {
            Some(id) => {
                ui.label(format!("Selected: {}", name_of(id)));
                if ui.button("Follow").clicked() {
                    if let Err(err) = controller.follow(id, &scene) {
                        warn!("{}", err);
                    }
                }
            }
            None => {
                ui.label("Selected: nothing");
            }
        }
        if let Some(id) = controller.get_follow_target() {
            ui.horizontal(|ui| {
                ui.label(format!("Following: {}", name_of(id)));
                if ui.button("Stop").clicked() {
                    controller.stop_following();
                }
            });
        }
        if !last_event.is_empty() {
            ui.label(format!("Last: {}", *last_event));
        }

        ui.separator();
        ui.horizontal(|ui| {
            for mode in PlayPauseMode::iter() {
                if ui
                    .selectable_label(scheduler.get_mode() == mode, mode.to_string())
                    .clicked()
                {
                    scheduler.set_mode(mode);
                }
            }
        });
    });
}
