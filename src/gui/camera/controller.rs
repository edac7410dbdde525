#![warn(missing_docs)]
//! The camera state machine.
//!
//! Exactly one of these drives the pose on any given step: a running
//! transition, keyboard movement, or following a body. Transitions win
//! outright. Movement keys break a follow. Orbit pointer controls are
//! applied once per frame on top of whatever the step produced.

use std::fmt;
use std::time::Duration;

use bevy::{
    ecs::system::Resource,
    input::mouse::MouseButton,
    log::{debug, warn},
    math::Vec3,
};
use strum_macros::{Display, EnumIter};

use crate::{
    entities::celestials::{celestial::BodyId, scene_graph::SceneGraph},
    physics::util::vectors::look_basis,
};

use super::{
    config::CameraConfig,
    input::InputState,
    orbit_controls::OrbitControls,
    presets::{CameraPose, CameraPresets},
    transition::{Transition, TransitionHandle, TransitionOutcome},
};

/// How pointer input moves the camera
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CameraMode {
    /// Rotate, pan and zoom around a target
    #[default]
    Orbit,
    /// Mouse-look with keyboard flight
    FreeFly,
}

/// Things the rest of the app may want to hear about
#[derive(Debug, Clone, PartialEq)]
pub enum CameraNotification {
    /// The mode actually changed
    ModeChanged(CameraMode),
    /// Carries the preset name when the transition was started from one
    TransitionCompleted(Option<String>),
    /// Started, switched or stopped following. `None` when stopped.
    FollowChanged(Option<BodyId>),
}

/// Camera requests that name something that doesn't exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No preset has this name
    UnknownPreset(String),
    /// No body has this name or id
    UnknownBody(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::UnknownPreset(name) => write!(f, "no camera preset named {:?}", name),
            CameraError::UnknownBody(name) => write!(f, "no body named {:?} to follow", name),
        }
    }
}

impl std::error::Error for CameraError {}

/// Owns the camera pose and everything that moves it
#[derive(Resource, Debug)]
pub struct CameraController {
    pose: CameraPose,
    mode: CameraMode,
    orbit: OrbitControls,
    follow: Option<BodyId>,
    transition: Option<Transition>,
    config: CameraConfig,
    /// Sum of every step this controller has been ticked with
    time: Duration,
    notifications: Vec<CameraNotification>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraController {
    /// Starts at the config's initial pose, in orbit mode
    pub fn new(config: CameraConfig) -> Self {
        Self {
            pose: config.initial_pose,
            mode: CameraMode::Orbit,
            orbit: OrbitControls::new(&config),
            follow: None,
            transition: None,
            config,
            time: Duration::ZERO,
            notifications: Vec::new(),
        }
    }
}

/// Getters
impl CameraController {
    /// The pose the camera should render from
    pub fn get_pose(&self) -> &CameraPose {
        &self.pose
    }
    /// The current mode
    pub fn get_mode(&self) -> CameraMode {
        self.mode
    }
    /// The body being followed, if any
    pub fn get_follow_target(&self) -> Option<BodyId> {
        self.follow
    }
    /// Whether a body is being followed
    pub fn is_following(&self) -> bool {
        self.follow.is_some()
    }
    /// The running transition, if any
    pub fn get_transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }
    /// Whether a transition is running
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }
    /// The preset table, shared with [`CameraController::get_config`]
    pub fn get_presets(&self) -> &CameraPresets {
        &self.config.presets
    }
    /// Lets presets be added or removed at runtime
    pub fn get_presets_mut(&mut self) -> &mut CameraPresets {
        &mut self.config.presets
    }
    /// The config the controller was made with, plus runtime preset changes
    pub fn get_config(&self) -> &CameraConfig {
        &self.config
    }
}

/// Commands
impl CameraController {
    /// Switches between orbit and free-fly. Stops any transition or follow.
    /// Setting the current mode again does nothing.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        self.end_transition(TransitionOutcome::Cancelled);
        self.stop_following();
        self.mode = mode;
        self.orbit.enabled = mode == CameraMode::Orbit;
        debug!("Camera mode is now {}", mode);
        self.notifications.push(CameraNotification::ModeChanged(mode));
    }

    /// Switches to the other mode
    pub fn toggle_mode(&mut self) {
        match self.mode {
            CameraMode::Orbit => self.set_mode(CameraMode::FreeFly),
            CameraMode::FreeFly => self.set_mode(CameraMode::Orbit),
        }
    }

    /// Animates to `end` from wherever the camera is right now.
    /// Supersedes a running transition and stops following.
    pub fn animate_to_pose(
        &mut self,
        end: CameraPose,
        duration: Option<Duration>,
    ) -> TransitionHandle {
        self.start_transition(end, None, duration)
    }

    /// Animates to a named preset. The preset name is reported on completion.
    pub fn animate_to_preset(
        &mut self,
        name: &str,
        duration: Option<Duration>,
    ) -> Result<TransitionHandle, CameraError> {
        let end = *self
            .config
            .presets
            .get(name)
            .ok_or_else(|| CameraError::UnknownPreset(name.to_owned()))?;
        Ok(self.start_transition(end, Some(name.to_owned()), duration))
    }

    /// Starts following `body`. Cancels a running transition.
    pub fn follow(&mut self, body: BodyId, scene: &SceneGraph) -> Result<(), CameraError> {
        if scene.get_body(body).is_none() {
            return Err(CameraError::UnknownBody(format!("#{}", body.0)));
        }
        self.end_transition(TransitionOutcome::Cancelled);
        if self.follow != Some(body) {
            self.follow = Some(body);
            self.notifications
                .push(CameraNotification::FollowChanged(Some(body)));
        }
        Ok(())
    }

    /// [`CameraController::follow`] with a body name
    pub fn follow_by_name(&mut self, name: &str, scene: &SceneGraph) -> Result<(), CameraError> {
        let body = scene
            .find_body(name)
            .ok_or_else(|| CameraError::UnknownBody(name.to_owned()))?;
        self.follow(body, scene)
    }

    /// Stops following, publishing a change only if something was followed
    pub fn stop_following(&mut self) {
        if self.follow.take().is_some() {
            self.notifications.push(CameraNotification::FollowChanged(None));
        }
    }

    /// Hands over everything that happened since the last call
    pub fn drain_notifications(&mut self) -> Vec<CameraNotification> {
        std::mem::take(&mut self.notifications)
    }

    fn start_transition(
        &mut self,
        end: CameraPose,
        preset: Option<String>,
        duration: Option<Duration>,
    ) -> TransitionHandle {
        self.end_transition(TransitionOutcome::Superseded);
        self.stop_following();
        let duration = duration.unwrap_or(self.config.transition_duration);
        // `pose` already holds the interpolated pose of a superseded transition
        let transition = Transition::new(self.pose, end, self.time, duration, preset);
        let handle = transition.get_handle().clone();
        self.transition = Some(transition);
        handle
    }

    fn end_transition(&mut self, outcome: TransitionOutcome) {
        if let Some(transition) = self.transition.take() {
            debug!("Camera transition ended: {}", outcome);
            transition.finish(outcome);
        }
    }
}

/// Per-step and per-frame updates
impl CameraController {
    /// Advances by one logic step of length `step`
    pub fn tick(&mut self, step: Duration, input: &impl InputState, scene: &SceneGraph) {
        self.time += step;
        if let Some(transition) = &self.transition {
            self.pose = transition.pose_at(self.time);
            if transition.is_complete(self.time) {
                if let Some(transition) = self.transition.take() {
                    self.pose = *transition.get_end();
                    let preset = transition.finish(TransitionOutcome::Completed);
                    self.notifications
                        .push(CameraNotification::TransitionCompleted(preset));
                }
            }
            return;
        }

        let dt = step.as_secs_f32();
        self.move_with_keys(dt, input);
        self.follow_target(dt, scene);
    }

    /// Applies pointer drags and the wheel. Call once per rendered frame.
    pub fn handle_pointer(&mut self, input: &impl InputState) {
        if self.transition.is_some() {
            return;
        }
        let delta = input.pointer_delta();
        match self.mode {
            CameraMode::Orbit => {
                if input.button_held(MouseButton::Left) {
                    self.orbit.rotate(&mut self.pose, delta);
                }
                if input.button_held(MouseButton::Right) {
                    self.orbit.pan(&mut self.pose, delta);
                }
                self.orbit.zoom(&mut self.pose, input.scroll_delta());
            }
            CameraMode::FreeFly => {
                if input.button_held(MouseButton::Left) {
                    self.orbit.look(&mut self.pose, delta);
                }
            }
        }
    }

    /// Translates position and target along the view basis
    fn move_with_keys(&mut self, dt: f32, input: &impl InputState) {
        if self.mode == CameraMode::Orbit && !self.config.keyboard_move_in_orbit {
            return;
        }
        let bindings = self.config.bindings;
        let axis = |positive, negative| {
            (input.key_held(positive) as i32 - input.key_held(negative) as i32) as f32
        };
        let forward = axis(bindings.forward, bindings.back);
        let right = axis(bindings.right, bindings.left);
        let up = axis(bindings.up, bindings.down);
        if forward == 0.0 && right == 0.0 && up == 0.0 {
            return;
        }
        let Some(basis) = look_basis(self.pose.position, self.pose.target) else {
            return;
        };
        let Some(direction) = (basis.forward * forward + basis.right * right + Vec3::Y * up)
            .try_normalize()
        else {
            return;
        };
        let speed = if input.key_held(bindings.fast) {
            self.config.move_speed * self.config.fast_multiplier
        } else {
            self.config.move_speed
        };
        let shift = direction * speed * dt;
        self.pose.position += shift;
        self.pose.target += shift;
        self.stop_following();
    }

    fn follow_target(&mut self, dt: f32, scene: &SceneGraph) {
        let Some(body) = self.follow else {
            return;
        };
        let Some(body_position) = scene.body_world_position(body) else {
            warn!("Followed body #{} is gone, stopping", body.0);
            self.stop_following();
            return;
        };
        let fraction = self.config.follow_smoothing.fraction(dt);
        let desired = CameraPose::new(body_position + self.config.follow_offset, body_position);
        self.pose = self.pose.lerp(&desired, fraction);
    }
}

#[cfg(test)]
mod tests {
    use bevy::{input::keyboard::KeyCode, math::Vec2};

    use super::*;
    use crate::{
        entities::celestials::builder::SolarSystemConfig,
        gui::camera::{config::FollowSmoothing, input::InputSnapshot},
        physics::util::clock::{FrameScheduler, DEFAULT_FIXED_STEP},
    };

    fn scene() -> SceneGraph {
        SceneGraph::compose(SolarSystemConfig::default().bodies).unwrap()
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::new()
    }

    fn run_steps(controller: &mut CameraController, n: usize, input: &InputSnapshot) {
        let scene = scene();
        for _ in 0..n {
            controller.tick(DEFAULT_FIXED_STEP, input, &scene);
        }
    }

    #[test]
    fn test_preset_transition_through_scheduler() {
        let mut scheduler = FrameScheduler::default();
        let mut controller = CameraController::default();
        let scene = scene();
        let sun = *controller.get_presets().get("sun").unwrap();
        let handle = controller
            .animate_to_preset("sun", Some(Duration::from_millis(2000)))
            .unwrap();

        let mut completed = Vec::new();
        for _ in 0..140 {
            let ticks = scheduler.tick(Duration::from_millis(16));
            for step in ticks.logic_steps {
                controller.tick(step.step, &idle(), &scene);
            }
            completed.extend(
                controller
                    .drain_notifications()
                    .into_iter()
                    .filter(|n| matches!(n, CameraNotification::TransitionCompleted(_))),
            );
        }

        assert_eq!(*controller.get_pose(), sun);
        assert!(!controller.is_transitioning());
        assert_eq!(handle.poll(), Some(TransitionOutcome::Completed));
        assert_eq!(
            completed,
            vec![CameraNotification::TransitionCompleted(Some("sun".to_owned()))]
        );
    }

    #[test]
    fn test_preemption_starts_from_current_pose() {
        let mut controller = CameraController::default();
        let first = controller.animate_to_preset("top", None).unwrap();
        run_steps(&mut controller, 30, &idle());
        let mid = *controller.get_pose();
        assert_ne!(mid, *controller.get_presets().get("top").unwrap());

        let second = controller.animate_to_preset("side", None).unwrap();
        assert_eq!(first.poll(), Some(TransitionOutcome::Superseded));
        assert_eq!(second.poll(), None);
        assert_eq!(*controller.get_pose(), mid);
        run_steps(&mut controller, 1, &idle());
        // One step into an eased transition barely moves
        assert!(controller.get_pose().position.distance(mid.position) < 1.0);
    }

    #[test]
    fn test_preempted_transition_reports_only_the_last() {
        let config = CameraConfig::default().transition_duration(Duration::from_millis(500));
        let mut controller = CameraController::new(config);
        let top = controller.animate_to_preset("top", None).unwrap();
        run_steps(&mut controller, 10, &idle());
        let side = controller.animate_to_preset("side", None).unwrap();
        assert!(top.is_finished());
        assert!(!side.is_finished());
        run_steps(&mut controller, 30, &idle());

        assert!(side.is_finished());
        assert_eq!(*controller.get_pose(), *controller.get_presets().get("side").unwrap());
        assert_eq!(
            controller.drain_notifications(),
            vec![CameraNotification::TransitionCompleted(Some("side".to_owned()))]
        );
    }

    #[test]
    fn test_preset_registered_at_runtime() {
        let mut controller = CameraController::default();
        let custom = CameraPose::new(Vec3::new(-40.0, 25.0, 10.0), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(controller.get_presets_mut().insert("custom", custom), None);
        assert_eq!(controller.get_config().presets.get("custom"), Some(&custom));
        assert!(controller.get_presets().names().contains(&"custom"));

        let handle = controller
            .animate_to_preset("custom", Some(Duration::from_millis(500)))
            .unwrap();
        assert_eq!(controller.get_transition().unwrap().get_preset(), Some("custom"));
        run_steps(&mut controller, 30, &idle());

        assert_eq!(*controller.get_pose(), custom);
        assert_eq!(handle.poll(), Some(TransitionOutcome::Completed));
        assert_eq!(
            controller.drain_notifications(),
            vec![CameraNotification::TransitionCompleted(Some("custom".to_owned()))]
        );
    }

    #[test]
    fn test_unknown_preset() {
        let mut controller = CameraController::default();
        let err = controller.animate_to_preset("nowhere", None).unwrap_err();
        assert_eq!(err, CameraError::UnknownPreset("nowhere".to_owned()));
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_zero_duration_completes_next_tick() {
        let mut controller = CameraController::default();
        let end = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let handle = controller.animate_to_pose(end, Some(Duration::ZERO));
        assert_eq!(handle.poll(), None);
        run_steps(&mut controller, 1, &idle());
        assert_eq!(*controller.get_pose(), end);
        assert_eq!(handle.poll(), Some(TransitionOutcome::Completed));
        assert_eq!(
            controller.drain_notifications(),
            vec![CameraNotification::TransitionCompleted(None)]
        );
    }

    #[test]
    fn test_follow_and_transition_are_exclusive() {
        let mut controller = CameraController::default();
        let scene = scene();
        let handle = controller.animate_to_preset("sun", None).unwrap();
        controller.follow_by_name("earth", &scene).unwrap();
        assert!(controller.is_following());
        assert!(!controller.is_transitioning());
        assert_eq!(handle.poll(), Some(TransitionOutcome::Cancelled));

        controller.animate_to_preset("sun", None).unwrap();
        assert!(!controller.is_following());
        assert!(controller.is_transitioning());
    }

    #[test]
    fn test_follow_unknown_body() {
        let mut controller = CameraController::default();
        let scene = scene();
        assert_eq!(
            controller.follow_by_name("pluto", &scene),
            Err(CameraError::UnknownBody("pluto".to_owned()))
        );
        assert!(controller.follow(BodyId(999), &scene).is_err());
        assert!(!controller.is_following());
    }

    #[test]
    fn test_follow_converges_on_body() {
        let config = CameraConfig::default().follow_offset(Vec3::new(0.0, 4.0, 10.0));
        let mut controller = CameraController::new(config);
        let scene = scene();
        let earth = scene.find_body("earth").unwrap();
        controller.follow(earth, &scene).unwrap();
        for _ in 0..600 {
            controller.tick(DEFAULT_FIXED_STEP, &idle(), &scene);
        }
        let body = scene.body_world_position(earth).unwrap();
        let pose = controller.get_pose();
        assert!(pose.target.distance(body) < 1e-2);
        assert!(pose.position.distance(body + controller.get_config().follow_offset) < 1e-2);
    }

    #[test]
    fn test_per_tick_follow_smoothing() {
        let config = CameraConfig::default().follow_smoothing(FollowSmoothing::PerTick(0.5));
        let mut controller = CameraController::new(config);
        let scene = scene();
        let earth = scene.find_body("earth").unwrap();
        let start = *controller.get_pose();
        controller.follow(earth, &scene).unwrap();
        controller.tick(DEFAULT_FIXED_STEP, &idle(), &scene);
        let body = scene.body_world_position(earth).unwrap();
        let expected = start.target.lerp(body, 0.5);
        assert!(controller.get_pose().target.distance(expected) < 1e-4);
    }

    #[test]
    fn test_free_fly_moves_forward() {
        let mut controller = CameraController::default();
        controller.set_mode(CameraMode::FreeFly);
        let start = *controller.get_pose();
        let forward = (start.target - start.position).normalize();
        run_steps(&mut controller, 60, &idle().with_key(KeyCode::W));
        let moved = controller.get_pose().position - start.position;
        let expected =
            forward * controller.get_config().move_speed * 60.0 * DEFAULT_FIXED_STEP.as_secs_f32();
        assert!(moved.distance(expected) < 1e-2);
        assert!((controller.get_pose().target - start.target).distance(moved) < 1e-3);
    }

    #[test]
    fn test_fast_key_multiplies_speed() {
        let mut controller = CameraController::new(CameraConfig::default().move_speed(30.0));
        controller.set_mode(CameraMode::FreeFly);
        let start = *controller.get_pose();
        run_steps(
            &mut controller,
            1,
            &idle().with_key(KeyCode::E).with_key(KeyCode::ShiftLeft),
        );
        let h = DEFAULT_FIXED_STEP.as_secs_f32();
        let moved = controller.get_pose().position - start.position;
        assert!(moved.distance(Vec3::new(0.0, 30.0 * 4.0 * h, 0.0)) < 1e-4);
    }

    #[test]
    fn test_up_and_down_follow_world_up() {
        // Looking down at the target from above and behind
        let tilted = CameraPose::new(Vec3::new(0.0, 80.0, 60.0), Vec3::ZERO);
        let config = CameraConfig::default()
            .initial_pose(tilted)
            .move_speed(12.0);
        let mut controller = CameraController::new(config);
        controller.set_mode(CameraMode::FreeFly);
        let h = DEFAULT_FIXED_STEP.as_secs_f32();

        run_steps(&mut controller, 10, &idle().with_key(KeyCode::E));
        let up = controller.get_pose().position - tilted.position;
        assert!(up.distance(Vec3::Y * 12.0 * 10.0 * h) < 1e-3);
        assert!((controller.get_pose().target - tilted.target).distance(up) < 1e-3);

        run_steps(&mut controller, 10, &idle().with_key(KeyCode::Q));
        assert!(controller.get_pose().position.distance(tilted.position) < 1e-3);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut controller = CameraController::default();
        controller.set_mode(CameraMode::FreeFly);
        let start = *controller.get_pose();
        let input = idle()
            .with_key(KeyCode::W)
            .with_key(KeyCode::S)
            .with_key(KeyCode::A)
            .with_key(KeyCode::D);
        run_steps(&mut controller, 10, &input);
        assert_eq!(*controller.get_pose(), start);
    }

    #[test]
    fn test_movement_breaks_follow() {
        let mut controller = CameraController::default();
        let scene = scene();
        controller.follow_by_name("mars", &scene).unwrap();
        controller.tick(DEFAULT_FIXED_STEP, &idle().with_key(KeyCode::D), &scene);
        assert!(!controller.is_following());
    }

    #[test]
    fn test_keys_ignored_while_transitioning() {
        let mut controller = CameraController::default();
        let end = CameraPose::new(Vec3::new(0.0, 50.0, 50.0), Vec3::ZERO);
        controller.animate_to_pose(end, Some(Duration::from_millis(500)));
        // 30 steps of 1/60 s just reach the end
        run_steps(&mut controller, 30, &idle().with_key(KeyCode::W));
        assert!(!controller.is_transitioning());
        assert_eq!(*controller.get_pose(), end);
    }

    #[test]
    fn test_mode_change_cancels_and_notifies() {
        let mut controller = CameraController::default();
        let handle = controller.animate_to_preset("top", None).unwrap();
        controller.set_mode(CameraMode::FreeFly);
        assert_eq!(handle.poll(), Some(TransitionOutcome::Cancelled));
        controller.set_mode(CameraMode::FreeFly);
        assert_eq!(
            controller.drain_notifications(),
            vec![CameraNotification::ModeChanged(CameraMode::FreeFly)]
        );
        controller.toggle_mode();
        assert_eq!(controller.get_mode(), CameraMode::Orbit);
    }

    #[test]
    fn test_pointer_orbits_only_in_orbit_mode() {
        let mut controller = CameraController::default();
        let drag = idle()
            .with_button(MouseButton::Left)
            .with_pointer_delta(Vec2::new(40.0, 0.0));
        let start = *controller.get_pose();
        controller.handle_pointer(&drag);
        assert_ne!(controller.get_pose().position, start.position);
        assert_eq!(controller.get_pose().target, start.target);

        controller.set_mode(CameraMode::FreeFly);
        let start = *controller.get_pose();
        controller.handle_pointer(&drag);
        assert_eq!(controller.get_pose().position, start.position);
        assert_ne!(controller.get_pose().target, start.target);
    }

    #[test]
    fn test_pointer_ignored_while_transitioning() {
        let mut controller = CameraController::default();
        controller.animate_to_preset("sun", None).unwrap();
        let start = *controller.get_pose();
        controller.handle_pointer(&idle().with_scroll(5.0));
        assert_eq!(*controller.get_pose(), start);
    }
}
