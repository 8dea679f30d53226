//! Headless replay execution
//!
//! Provides a host loop for running the scheduler without a renderer or
//! physics engine: frame deltas are turned into whole fixed ticks through an
//! accumulator, the recorded entity follows a scripted track, and the ghost is
//! a [`RecordedProxy`]. Used by the CLI and by integration tests.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use super::proxy::RecordedProxy;
use super::scheduler::ReplayScheduler;
use crate::replay::types::{Pose, ReplayEvent, Slot};

/// Headless runner configuration
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Simulated render frame length in seconds
    pub frame_delta: f32,
    /// Hard stop for any single lap or playback
    pub max_frames: u64,
    /// Tear the ghost down when its playback completes
    pub destroy_on_complete: bool,
    /// Keep every Nth ghost pose in the playback trace (0 = no trace)
    pub trace_interval_frames: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frame_delta: 1.0 / 60.0,
            max_frames: 60 * 60 * 10, // 10 minutes at 60fps
            destroy_on_complete: true,
            trace_interval_frames: 0,
        }
    }
}

/// Outcome of a recorded lap
#[derive(Debug, Clone, PartialEq)]
pub struct LapReport {
    /// Render frames stepped
    pub frames: u64,
    /// Fixed ticks stepped
    pub fixed_ticks: u64,
    /// The run hit its time limit and was discarded
    pub timed_out: bool,
    /// The run became the new best
    pub is_new_best: bool,
}

/// Outcome of a lap raced against a ghost
#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    pub lap: LapReport,
    /// A recording was available for the ghost
    pub ghost_started: bool,
    /// The ghost reached the end of its recording before the lap ended
    pub ghost_finished_first: bool,
}

/// Outcome of a ghost playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    pub started: bool,
    pub frames: u64,
    /// Ghost pose after the last frame
    pub final_pose: Pose,
    /// Largest distance between the ghost and the evaluated recording
    pub max_deviation: f32,
    pub torn_down: bool,
    /// `(playback time, ghost pose)` every `trace_interval_frames` frames
    pub trace: Vec<(f32, Pose)>,
}

/// Host loop around a [`ReplayScheduler`]
pub struct HeadlessRunner {
    scheduler: ReplayScheduler,
    config: HeadlessConfig,
    accumulator: f32,
    fixed_ticks: u64,
    sim_time: Rc<Cell<f32>>,
}

impl HeadlessRunner {
    /// Create a new headless runner
    pub fn new(scheduler: ReplayScheduler, config: HeadlessConfig) -> Self {
        Self {
            scheduler,
            config,
            accumulator: 0.0,
            fixed_ticks: 0,
            sim_time: Rc::new(Cell::new(0.0)),
        }
    }

    pub fn scheduler(&self) -> &ReplayScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ReplayScheduler {
        &mut self.scheduler
    }

    pub fn into_scheduler(self) -> ReplayScheduler {
        self.scheduler
    }

    /// Simulated time of the tracked entity
    pub fn sim_time(&self) -> f32 {
        self.sim_time.get()
    }

    /// Start capturing an entity that follows `track(sim_time)`
    pub fn start_run<T>(&mut self, track: T)
    where
        T: Fn(f32) -> Pose + 'static,
    {
        self.sim_time.set(0.0);
        self.accumulator = 0.0;
        let clock = self.sim_time.clone();
        self.scheduler
            .start_run_with_defaults(move || track(clock.get()));
    }

    /// Advance one render frame: run every fixed tick that fits in the
    /// accumulated time, then one variable tick.
    pub fn step_frame(&mut self, delta: f32) -> Vec<ReplayEvent> {
        let mut events = Vec::new();
        let dt = self.scheduler.config().fixed_timestep;

        self.accumulator += delta;
        if dt > 0.0 {
            while self.accumulator >= dt {
                self.accumulator -= dt;
                events.extend(self.scheduler.on_fixed_tick());
                self.fixed_ticks += 1;
                self.sim_time.set(self.sim_time.get() + dt);
            }
        }

        events.extend(self.scheduler.on_variable_tick(delta));
        events
    }

    /// Record one lap of `track` lasting `lap_time` seconds and save it
    pub fn record_lap<T>(&mut self, track: T, lap_time: f32) -> LapReport
    where
        T: Fn(f32) -> Pose + 'static,
    {
        self.race(track, lap_time, None).lap
    }

    /// Record a lap while the recording in `ghost` (if any) plays alongside.
    ///
    /// When the lap ends the run is saved and any remaining ghost is stopped.
    pub fn race<T>(&mut self, track: T, lap_time: f32, ghost: Option<(Slot, Pose)>) -> RaceReport
    where
        T: Fn(f32) -> Pose + 'static,
    {
        let ticks_before = self.fixed_ticks;
        self.start_run(track);

        let ghost_started = match ghost {
            Some((slot, spawn)) => {
                let proxy = RecordedProxy::new(spawn);
                self.scheduler
                    .play(slot, proxy, self.config.destroy_on_complete)
            }
            None => false,
        };

        let mut frames = 0u64;
        let mut timed_out = false;
        let mut ghost_finished_first = false;

        while self.sim_time.get() < lap_time && frames < self.config.max_frames {
            for event in self.step_frame(self.config.frame_delta) {
                match event {
                    ReplayEvent::RunTimedOut { elapsed } => {
                        debug!(elapsed, "lap exceeded the time limit");
                        timed_out = true;
                    }
                    ReplayEvent::PlaybackFinished { .. } => ghost_finished_first = true,
                }
            }
            frames += 1;
            if timed_out {
                break;
            }
        }

        let is_new_best = self.scheduler.finish_run(true);
        self.scheduler.stop();

        let lap = LapReport {
            frames,
            fixed_ticks: self.fixed_ticks - ticks_before,
            timed_out,
            is_new_best,
        };
        info!(
            frames = lap.frames,
            ticks = lap.fixed_ticks,
            timed_out,
            is_new_best,
            "lap complete"
        );

        RaceReport {
            lap,
            ghost_started,
            ghost_finished_first,
        }
    }

    /// Play `slot` to completion on a ghost spawned at `spawn`
    pub fn play_slot(&mut self, slot: Slot, spawn: Pose) -> PlaybackReport {
        let handle = RecordedProxy::new(spawn);
        let recording = self.scheduler.ledger().get(slot);
        let started = self
            .scheduler
            .play(slot, handle.clone(), self.config.destroy_on_complete);

        let mut report = PlaybackReport {
            started,
            frames: 0,
            final_pose: spawn,
            max_deviation: 0.0,
            torn_down: false,
            trace: Vec::new(),
        };

        let Some(recording) = recording.filter(|_| started) else {
            report.torn_down = handle.is_torn_down();
            return report;
        };

        let mut clock = 0.0f32;
        while report.frames < self.config.max_frames {
            let delta = self.config.frame_delta;
            let finished = self
                .scheduler
                .on_variable_tick(delta)
                .is_some_and(|e| matches!(e, ReplayEvent::PlaybackFinished { .. }));
            clock += delta;
            report.frames += 1;

            let ghost = handle.state().pose;
            let target = recording.evaluate(clock);
            report.max_deviation = report
                .max_deviation
                .max(ghost.position.distance(target.position));

            let interval = self.config.trace_interval_frames;
            if interval > 0 && (report.frames.is_multiple_of(interval) || finished) {
                report.trace.push((clock, ghost));
            }

            if finished {
                break;
            }
        }

        report.final_pose = handle.state().pose;
        report.torn_down = handle.is_torn_down();
        report
    }
}
