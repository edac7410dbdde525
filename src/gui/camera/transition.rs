//! Eased camera moves between two poses

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use strum_macros::Display;

use crate::physics::util::easing::ease_in_out_cubic;

use super::presets::CameraPose;

/// How a transition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransitionOutcome {
    /// Reached the end pose
    Completed,
    /// Another transition started before this one finished
    Superseded,
    /// Stopped by a mode change or by following a body
    Cancelled,
}

/// Lets the caller find out how a transition ended.
/// Resolves exactly once.
#[derive(Debug, Clone, Default)]
pub struct TransitionHandle {
    outcome: Arc<OnceLock<TransitionOutcome>>,
}

impl TransitionHandle {
    /// `None` while the transition is still running
    pub fn poll(&self) -> Option<TransitionOutcome> {
        self.outcome.get().copied()
    }

    /// Whether an outcome has been decided
    pub fn is_finished(&self) -> bool {
        self.poll().is_some()
    }

    pub(super) fn resolve(&self, outcome: TransitionOutcome) {
        // First outcome wins
        let _ = self.outcome.set(outcome);
    }
}

/// An eased interpolation between two poses over a fixed duration
#[derive(Debug, Clone)]
pub struct Transition {
    start: CameraPose,
    end: CameraPose,
    started_at: Duration,
    duration: Duration,
    preset: Option<String>,
    handle: TransitionHandle,
}

impl Transition {
    /// A transition from `start` at time `started_at` that lasts `duration`
    pub fn new(
        start: CameraPose,
        end: CameraPose,
        started_at: Duration,
        duration: Duration,
        preset: Option<String>,
    ) -> Self {
        Self {
            start,
            end,
            started_at,
            duration,
            preset,
            handle: TransitionHandle::default(),
        }
    }

    /// Raw progress in `[0, 1]`. A zero duration is complete immediately.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    /// The eased pose at `now`, exactly the end pose once complete
    pub fn pose_at(&self, now: Duration) -> CameraPose {
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.end
        } else {
            self.start.lerp(&self.end, ease_in_out_cubic(progress))
        }
    }

    /// Whether `now` is at or past the end
    pub fn is_complete(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }

    /// The pose the transition finishes at
    pub fn get_end(&self) -> &CameraPose {
        &self.end
    }

    /// How long the transition runs for
    pub fn get_duration(&self) -> Duration {
        self.duration
    }

    /// The preset being moved to, if the transition was started from one
    pub fn get_preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    /// The handle given out when the transition started
    pub fn get_handle(&self) -> &TransitionHandle {
        &self.handle
    }

    pub(super) fn finish(self, outcome: TransitionOutcome) -> Option<String> {
        self.handle.resolve(outcome);
        self.preset
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use super::*;

    fn transition(duration: Duration) -> Transition {
        Transition::new(
            CameraPose::new(Vec3::ZERO, Vec3::ZERO),
            CameraPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO),
            Duration::from_secs(1),
            duration,
            None,
        )
    }

    #[test]
    fn test_eased_midpoint() {
        let transition = transition(Duration::from_secs(2));
        let mid = transition.pose_at(Duration::from_secs(2));
        assert!((mid.position.x - 5.0).abs() < 1e-5);
        let quarter = transition.pose_at(Duration::from_millis(1500));
        assert!((quarter.position.x - 0.625).abs() < 1e-4);
    }

    #[test]
    fn test_end_pose_is_exact() {
        let transition = transition(Duration::from_millis(700));
        assert!(!transition.is_complete(Duration::from_millis(1699)));
        assert!(transition.is_complete(Duration::from_millis(1700)));
        assert_eq!(
            transition.pose_at(Duration::from_secs(9)).position,
            Vec3::new(10.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_zero_duration_is_complete() {
        let transition = transition(Duration::ZERO);
        assert_eq!(transition.progress(Duration::ZERO), 1.0);
        assert!(transition.is_complete(Duration::from_secs(1)));
    }

    #[test]
    fn test_handle_resolves_once() {
        let transition = transition(Duration::from_secs(1));
        let handle = transition.get_handle().clone();
        assert_eq!(handle.poll(), None);
        transition.finish(TransitionOutcome::Superseded);
        handle.resolve(TransitionOutcome::Completed);
        assert_eq!(handle.poll(), Some(TransitionOutcome::Superseded));
    }
}
