#![warn(missing_docs)]
//! The bevy camera for the scene

pub mod config;
pub mod controller;
pub mod input;
pub mod orbit_controls;
pub mod presets;
pub mod transition;

use bevy::{
    app::{App, Plugin, Startup, Update},
    core_pipeline::core_3d::Camera3dBundle,
    ecs::{
        change_detection::DetectChangesMut,
        component::Component,
        entity::Entity,
        event::{EventReader, EventWriter},
        query::With,
        schedule::IntoSystemConfigs,
        system::{Commands, Query, Res, ResMut},
    },
    input::{
        keyboard::KeyCode,
        mouse::{MouseButton, MouseMotion, MouseScrollUnit, MouseWheel},
        Input,
    },
    log::{info, warn},
    math::Vec2,
    render::camera::{PerspectiveProjection, Projection},
    transform::components::Transform,
    window::{PrimaryWindow, Window},
};
use bevy_egui::EguiContexts;

use crate::{
    entities::celestials::{celestial::BodyId, scene_graph::SceneGraph},
    physics::util::clock::{
        FrameScheduler, FrameSet, LogicSet, LogicStep, LogicTick, PlayPauseMode,
    },
};

use self::{
    config::CameraConfig,
    controller::{CameraController, CameraNotification},
    input::{InputSnapshot, InputState},
};
use super::events::{CameraModeChanged, FollowTargetChanged, TransitionCompleted};

/// Pixel-unit wheel events are divided by this to get lines
const PIXELS_PER_LINE: f32 = 100.0;

/// Used to help identify our main camera
#[derive(Component)]
pub struct MainCamera;

/// The plugin for the camera system.
/// Uses a [`CameraConfig`] resource if one was inserted before the plugin.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    /// Build the camera plugin
    fn build(&self, app: &mut App) {
        let config = app
            .world
            .get_resource::<CameraConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(CameraController::new(config));
        app.init_resource::<InputSnapshot>();
        app.add_systems(Startup, Self::setup_main_camera);
        app.add_systems(Update, Self::capture_input_system.in_set(FrameSet::Input));
        app.add_systems(LogicTick, Self::tick_camera_system.in_set(LogicSet::Camera));
        app.add_systems(
            Update,
            (
                Self::shortcuts_system,
                Self::pointer_controls_system,
                Self::apply_camera_pose_system,
                Self::publish_notifications_system,
            )
                .chain()
                .in_set(FrameSet::Present),
        );
    }
}

/// Startup functions
impl CameraPlugin {
    /// Setup the main camera
    pub fn setup_main_camera(mut commands: Commands, controller: Res<CameraController>) {
        commands.spawn((
            Camera3dBundle {
                transform: controller.get_pose().to_transform(),
                projection: Projection::Perspective(PerspectiveProjection {
                    fov: controller.get_config().fov_y,
                    far: 5_000.0,
                    ..Default::default()
                }),
                ..Default::default()
            },
            MainCamera,
        ));
    }
}

/// Update functions
impl CameraPlugin {
    /// Copies held keys, buttons and pointer motion into the [`InputSnapshot`].
    /// Pointer input is dropped while egui is using the pointer.
    fn capture_input_system(
        keys: Res<Input<KeyCode>>,
        buttons: Res<Input<MouseButton>>,
        mut motion_evr: EventReader<MouseMotion>,
        mut scroll_evr: EventReader<MouseWheel>,
        q_windows: Query<(Entity, &Window), With<PrimaryWindow>>,
        mut contexts: EguiContexts,
        mut snapshot: ResMut<InputSnapshot>,
    ) {
        let delta: Vec2 = motion_evr.read().map(|ev| ev.delta).sum();
        let mut scroll = 0.;
        for ev in scroll_evr.read() {
            match ev.unit {
                MouseScrollUnit::Line => {
                    scroll += ev.y;
                }
                MouseScrollUnit::Pixel => {
                    scroll += ev.y / PIXELS_PER_LINE;
                }
            }
        }
        let window = q_windows.get_single().ok();
        let ctx = window.and_then(|(entity, _)| contexts.try_ctx_for_window_mut(entity));
        let (egui_wants_keys, egui_wants_pointer) = match ctx {
            Some(ctx) => (
                ctx.wants_keyboard_input(),
                ctx.wants_pointer_input() || ctx.is_pointer_over_area(),
            ),
            None => (false, false),
        };

        let held_keys = keys.get_pressed().copied().filter(|_| !egui_wants_keys);
        snapshot.set_held(held_keys, buttons.get_pressed().copied());
        snapshot.set_pointer(window.and_then(|(_, window)| window.cursor_position()));
        snapshot.set_motion(delta, scroll);
        if egui_wants_pointer {
            snapshot.clear_pointer();
        }
    }

    /// Runs the controller for one logic step
    fn tick_camera_system(
        step: Res<LogicStep>,
        snapshot: Res<InputSnapshot>,
        scene: Res<SceneGraph>,
        mut controller: ResMut<CameraController>,
    ) {
        controller.tick(step.step, &*snapshot, &scene);
    }

    /// Orbit, pan, zoom and mouse-look
    fn pointer_controls_system(
        snapshot: Res<InputSnapshot>,
        mut controller: ResMut<CameraController>,
    ) {
        if snapshot.pointer_delta() == Vec2::ZERO && snapshot.scroll_delta() == 0.0 {
            return;
        }
        controller.handle_pointer(&*snapshot);
    }

    /// Keyboard shortcuts
    /// Tab toggles the mode, `[` and `]` cycle the followed body, Escape stops following,
    /// the number keys go to presets in name order, P pauses and N steps the simulation.
    fn shortcuts_system(
        keys: Res<Input<KeyCode>>,
        scene: Res<SceneGraph>,
        mut controller: ResMut<CameraController>,
        mut scheduler: ResMut<FrameScheduler>,
    ) {
        if keys.just_pressed(KeyCode::Tab) {
            controller.toggle_mode();
        }
        let nb_bodies = scene.get_num_bodies();
        if nb_bodies > 0 {
            let next = match (
                keys.just_pressed(KeyCode::BracketRight),
                keys.just_pressed(KeyCode::BracketLeft),
                controller.get_follow_target(),
            ) {
                (true, false, Some(current)) => Some(current.next(nb_bodies)),
                (false, true, Some(current)) => Some(current.prev(nb_bodies)),
                (true, false, None) | (false, true, None) => Some(BodyId(0)),
                _ => None,
            };
            if let Some(next) = next {
                if let Err(err) = controller.follow(next, &scene) {
                    warn!("{}", err);
                }
            }
        }
        if keys.just_pressed(KeyCode::Escape) {
            controller.stop_following();
        }

        let digits = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
            KeyCode::Key7,
            KeyCode::Key8,
            KeyCode::Key9,
        ];
        let pressed = digits.iter().position(|key| keys.just_pressed(*key));
        let preset = pressed.and_then(|idx| {
            controller
                .get_presets()
                .names()
                .get(idx)
                .map(|name| name.to_string())
        });
        if let Some(preset) = preset {
            if let Err(err) = controller.animate_to_preset(&preset, None) {
                warn!("{}", err);
            }
        }

        if keys.just_pressed(KeyCode::P) {
            let mode = match scheduler.get_mode() {
                PlayPauseMode::Play => PlayPauseMode::Pause,
                _ => PlayPauseMode::Play,
            };
            scheduler.set_mode(mode);
        }
        if keys.just_pressed(KeyCode::N) {
            scheduler.set_mode(PlayPauseMode::Step);
        }
    }

    /// Points the main camera along the controller's pose
    fn apply_camera_pose_system(
        controller: Res<CameraController>,
        mut query: Query<&mut Transform, With<MainCamera>>,
    ) {
        let pose = controller.get_pose().to_transform();
        for mut transform in query.iter_mut() {
            *transform = pose;
        }
    }

    /// Turns the controller's notifications into events
    fn publish_notifications_system(
        mut controller: ResMut<CameraController>,
        mut mode_evw: EventWriter<CameraModeChanged>,
        mut completed_evw: EventWriter<TransitionCompleted>,
        mut follow_evw: EventWriter<FollowTargetChanged>,
    ) {
        for notification in controller.bypass_change_detection().drain_notifications() {
            match notification {
                CameraNotification::ModeChanged(mode) => {
                    info!("Camera mode changed to {}", mode);
                    mode_evw.send(CameraModeChanged(mode));
                }
                CameraNotification::TransitionCompleted(preset) => {
                    completed_evw.send(TransitionCompleted(preset));
                }
                CameraNotification::FollowChanged(body) => {
                    follow_evw.send(FollowTargetChanged(body));
                }
            }
        }
    }
}
