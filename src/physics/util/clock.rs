//! Simulation time and the fixed-step frame scheduler.
//!
//! Raw frames arrive at whatever rate the display runs at. The scheduler turns
//! them into a fixed number of logic steps of length `h` plus exactly one render
//! per frame, so everything downstream of a [`LogicStep`] is deterministic.

use std::{fmt::Debug, time::Duration};

use bevy::{
    app::{App, Plugin, Update},
    ecs::{
        schedule::{IntoSystemConfigs, IntoSystemSetConfigs, ScheduleLabel, SystemSet},
        system::Resource,
        world::World,
    },
    log::{trace, warn},
    time::Time,
};
use strum_macros::{Display, EnumIter};

/// One logic step at 60Hz
pub const DEFAULT_FIXED_STEP: Duration = Duration::from_nanos(16_666_667);

/// Anything above this is treated as a stall (backgrounded window, debugger)
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(50);

/// A clock for the simulation.
/// Only the [`FrameScheduler`] advances it, and it is never reset.
#[derive(Clone, Copy)]
pub struct Clock {
    time: Duration,
    step: Duration,
    frame: u64,
}

impl Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("time", &self.time)
            .field("step", &self.step)
            .field("frame", &self.frame)
            .finish()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP)
    }
}

impl Clock {
    pub fn new(step: Duration) -> Self {
        Self {
            time: Duration::ZERO,
            step,
            frame: 0,
        }
    }
    pub fn get_current_time(&self) -> Duration {
        self.time
    }
    pub fn get_current_time_secs(&self) -> f64 {
        self.time.as_secs_f64()
    }
    pub fn get_step(&self) -> Duration {
        self.step
    }
    /// The number of logic steps taken so far
    pub fn get_current_frame(&self) -> u64 {
        self.frame
    }
    fn advance(&mut self) {
        self.time += self.step;
        self.frame += 1;
    }
}

/// A single fixed-length logic update
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct LogicStep {
    /// Length of the step, always the clock's `h`
    pub step: Duration,
    /// Same as `step`, in seconds
    pub dt: f32,
    /// Simulation time after this step
    pub time: Duration,
    /// Index of this step since the session started, paused steps included
    pub index: u64,
    /// False while paused. The camera keeps moving, the bodies don't.
    pub simulating: bool,
}

impl LogicStep {
    fn from_clock(clock: &Clock, index: u64, simulating: bool) -> Self {
        Self {
            step: clock.get_step(),
            dt: clock.get_step().as_secs_f32(),
            time: clock.get_current_time(),
            index,
            simulating,
        }
    }

    pub fn time_secs(&self) -> f64 {
        self.time.as_secs_f64()
    }
}

/// What a single raw frame turned into
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTicks {
    pub logic_steps: Vec<LogicStep>,
    /// Always true, a frame is rendered even if no logic step happened
    pub should_render: bool,
    /// Fraction of a step left in the accumulator, in `[0, 1)`
    pub alpha: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum PlayPauseMode {
    #[default]
    Play,
    /// Take exactly one logic step, then pause
    Step,
    Pause,
}

/// Configuration for the [`FrameScheduler`]
#[derive(Resource, Debug, Clone, Copy)]
pub struct SchedulerConfig {
    fixed_step: Duration,
    max_frame_delta: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
        }
    }

    pub fn fixed_step(mut self, fixed_step: Duration) -> Self {
        self.fixed_step = fixed_step;
        self
    }

    pub fn max_frame_delta(mut self, max_frame_delta: Duration) -> Self {
        self.max_frame_delta = max_frame_delta;
        self
    }
}

/// Converts variable frame deltas into fixed logic steps with an accumulator
#[derive(Resource, Debug, Clone)]
pub struct FrameScheduler {
    clock: Clock,
    max_frame_delta: Duration,
    accumulator: Duration,
    mode: PlayPauseMode,
    nb_steps: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl FrameScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let step = if config.fixed_step.is_zero() {
            warn!(
                "Fixed step of zero is not allowed, using {:?}",
                DEFAULT_FIXED_STEP
            );
            DEFAULT_FIXED_STEP
        } else {
            config.fixed_step
        };
        Self {
            clock: Clock::new(step),
            max_frame_delta: config.max_frame_delta,
            accumulator: Duration::ZERO,
            mode: PlayPauseMode::Play,
            nb_steps: 0,
        }
    }

    pub fn get_clock(&self) -> &Clock {
        &self.clock
    }

    pub fn get_mode(&self) -> PlayPauseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlayPauseMode) {
        self.mode = mode;
    }

    /// Feed one raw frame delta into the scheduler.
    ///
    /// The delta is clamped to the max frame delta, added to the accumulator,
    /// and drained one fixed step at a time. While paused steps are still
    /// emitted but the simulation clock stands still.
    pub fn tick(&mut self, raw_delta: Duration) -> FrameTicks {
        let delta = raw_delta.min(self.max_frame_delta);
        if delta < raw_delta {
            trace!("Clamped frame delta {:?} to {:?}", raw_delta, delta);
        }
        self.accumulator += delta;

        let step = self.clock.get_step();
        let mut logic_steps = Vec::new();
        while self.accumulator >= step {
            self.accumulator -= step;
            self.nb_steps += 1;
            let simulating = match self.mode {
                PlayPauseMode::Play => true,
                PlayPauseMode::Step => {
                    self.mode = PlayPauseMode::Pause;
                    true
                }
                PlayPauseMode::Pause => false,
            };
            if simulating {
                self.clock.advance();
            }
            logic_steps.push(LogicStep::from_clock(
                &self.clock,
                self.nb_steps,
                simulating,
            ));
        }

        FrameTicks {
            logic_steps,
            should_render: true,
            alpha: self.accumulator.as_secs_f32() / step.as_secs_f32(),
        }
    }

    /// Same as [`FrameScheduler::tick`] but drives callbacks directly.
    /// Either callback may be missing, in which case that phase does nothing.
    pub fn run_frame(
        &mut self,
        raw_delta: Duration,
        on_logic: Option<&mut dyn FnMut(LogicStep)>,
        on_render: Option<&mut dyn FnMut(f32)>,
    ) -> FrameTicks {
        let ticks = self.tick(raw_delta);
        if let Some(on_logic) = on_logic {
            for step in ticks.logic_steps.iter() {
                on_logic(*step);
            }
        }
        if let Some(on_render) = on_render {
            on_render(ticks.alpha);
        }
        ticks
    }
}

/// Runs once per emitted [`LogicStep`]
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicTick;

/// Ordering of the per-frame work in `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Logic,
    Present,
}

/// Ordering of the per-step work in [`LogicTick`]
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicSet {
    Kinematics,
    Camera,
}

/// Inserts the [`FrameScheduler`] and runs [`LogicTick`] for every fixed step.
/// Uses a [`SchedulerConfig`] resource if one was inserted before the plugin.
pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world
            .get_resource::<SchedulerConfig>()
            .copied()
            .unwrap_or_default();
        app.insert_resource(FrameScheduler::new(config));
        app.init_resource::<LogicStep>();
        app.configure_sets(
            Update,
            (FrameSet::Input, FrameSet::Logic, FrameSet::Present).chain(),
        );
        app.configure_sets(LogicTick, (LogicSet::Kinematics, LogicSet::Camera).chain());
        app.add_systems(Update, Self::run_logic_ticks.in_set(FrameSet::Logic));
    }
}

/// Bevy Systems
impl SchedulerPlugin {
    /// Feeds the frame delta to the scheduler and runs the logic schedule once per step
    fn run_logic_ticks(world: &mut World) {
        let raw_delta = world.resource::<Time>().delta();
        let ticks = world.resource_mut::<FrameScheduler>().tick(raw_delta);
        for step in ticks.logic_steps {
            world.insert_resource(step);
            world.run_schedule(LogicTick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_steps(scheduler: &mut FrameScheduler, deltas: &[Duration]) -> usize {
        deltas
            .iter()
            .map(|delta| scheduler.tick(*delta).logic_steps.len())
            .sum()
    }

    #[test]
    fn test_step_count_independent_of_chunking() {
        let total = Duration::from_millis(1000);
        let expected = (total.as_nanos() / DEFAULT_FIXED_STEP.as_nanos()) as i64;

        let even = vec![Duration::from_millis(16); 62]
            .into_iter()
            .chain(std::iter::once(Duration::from_millis(8)))
            .collect::<Vec<_>>();
        let uneven = (0..124)
            .map(|i| Duration::from_millis(if i % 2 == 0 { 7 } else { 9 }))
            .chain(std::iter::once(Duration::from_millis(8)))
            .collect::<Vec<_>>();
        let coarse = vec![Duration::from_millis(50); 20];

        for deltas in [even, uneven, coarse] {
            assert_eq!(deltas.iter().sum::<Duration>(), total);
            let mut scheduler = FrameScheduler::default();
            let steps = count_steps(&mut scheduler, &deltas) as i64;
            assert!(
                (steps - expected).abs() <= 1,
                "got {} steps, expected {}",
                steps,
                expected
            );
        }
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut scheduler = FrameScheduler::default();
        let ticks = scheduler.tick(Duration::from_secs(10));
        assert!(ticks.logic_steps.len() <= 3);
        assert!(ticks.should_render);
        assert!(scheduler.get_clock().get_current_time() <= DEFAULT_MAX_FRAME_DELTA);
    }

    #[test]
    fn test_render_every_frame() {
        let mut scheduler = FrameScheduler::default();
        let ticks = scheduler.tick(Duration::from_millis(1));
        assert!(ticks.logic_steps.is_empty());
        assert!(ticks.should_render);
        assert!(ticks.alpha > 0.0 && ticks.alpha < 1.0);
    }

    #[test]
    fn test_logic_steps_are_fixed() {
        let mut scheduler = FrameScheduler::default();
        let ticks = scheduler.tick(Duration::from_millis(40));
        assert_eq!(ticks.logic_steps.len(), 2);
        for step in ticks.logic_steps.iter() {
            assert_eq!(step.dt, DEFAULT_FIXED_STEP.as_secs_f32());
        }
        assert_eq!(ticks.logic_steps[1].time, DEFAULT_FIXED_STEP * 2);
        assert_eq!(ticks.logic_steps[1].index, 2);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut scheduler = FrameScheduler::default();
        let mut last = Duration::ZERO;
        for i in 0..200 {
            let ticks = scheduler.tick(Duration::from_millis(3 + (i % 20)));
            for step in ticks.logic_steps {
                assert!(step.time > last);
                last = step.time;
            }
        }
    }

    #[test]
    fn test_pause_and_step() {
        let mut scheduler = FrameScheduler::default();
        scheduler.set_mode(PlayPauseMode::Pause);
        let ticks = scheduler.tick(Duration::from_millis(40));
        assert_eq!(ticks.logic_steps.len(), 2);
        assert!(ticks.logic_steps.iter().all(|step| !step.simulating));
        assert!(ticks.should_render);
        assert_eq!(scheduler.get_clock().get_current_time(), Duration::ZERO);

        scheduler.set_mode(PlayPauseMode::Step);
        let ticks = scheduler.tick(Duration::from_millis(40));
        let simulated = ticks
            .logic_steps
            .iter()
            .filter(|step| step.simulating)
            .count();
        assert_eq!(simulated, 1);
        assert_eq!(scheduler.get_mode(), PlayPauseMode::Pause);
        assert_eq!(scheduler.get_clock().get_current_time(), DEFAULT_FIXED_STEP);
    }

    #[test]
    fn test_missing_callbacks_are_noops() {
        let mut scheduler = FrameScheduler::default();
        let ticks = scheduler.run_frame(Duration::from_millis(20), None, None);
        assert_eq!(ticks.logic_steps.len(), 1);

        let mut logic_calls = 0;
        let mut render_calls = 0;
        let mut on_logic = |_: LogicStep| logic_calls += 1;
        let mut on_render = |_: f32| render_calls += 1;
        scheduler.run_frame(
            Duration::from_millis(40),
            Some(&mut on_logic as &mut dyn FnMut(LogicStep)),
            Some(&mut on_render as &mut dyn FnMut(f32)),
        );
        assert_eq!(logic_calls, 2);
        assert_eq!(render_calls, 1);
    }

    #[test]
    fn test_zero_step_falls_back_to_default() {
        let scheduler = FrameScheduler::new(SchedulerConfig::new().fixed_step(Duration::ZERO));
        assert_eq!(scheduler.get_clock().get_step(), DEFAULT_FIXED_STEP);
    }
}
