//! Replay scheduler
//!
//! Drives capture and playback from two host ticks:
//!
//! - [`ReplayScheduler::on_fixed_tick`] at the physics rate, which snapshots
//!   the active run every N ticks
//! - [`ReplayScheduler::on_variable_tick`] once per rendered frame, which
//!   advances the ghost
//!
//! Recording and playback are independent: a run can be captured while a
//! previous one is shown as a ghost. They never touch the same recording, the
//! live run is owned here and the ghost plays a frozen one from the ledger.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::replay::ledger::ReplayLedger;
use crate::replay::recording::{PoseSource, Recorder, Recording};
use crate::replay::runtime::proxy::{SMOOTH_FACTOR, VisualProxy, smooth_toward};
use crate::replay::types::{ReplayEvent, Slot};

/// Default number of fixed ticks between snapshots
pub const DEFAULT_SNAPSHOT_INTERVAL: u32 = 2;
/// Default run time limit in seconds
pub const DEFAULT_MAX_DURATION: f32 = 60.0;
/// Default fixed tick length in seconds (50 Hz physics)
pub const DEFAULT_FIXED_TIMESTEP: f32 = 0.02;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Real duration of one fixed tick in seconds
    pub fixed_timestep: f32,
    /// Snapshot interval used by [`ReplayScheduler::start_run_with_defaults`]
    pub snapshot_interval_ticks: u32,
    /// Time limit used by [`ReplayScheduler::start_run_with_defaults`]
    pub max_duration: f32,
    /// Ghost smoothing factor applied per variable tick
    pub smooth_factor: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            snapshot_interval_ticks: DEFAULT_SNAPSHOT_INTERVAL,
            max_duration: DEFAULT_MAX_DURATION,
            smooth_factor: SMOOTH_FACTOR,
        }
    }
}

/// Run being captured
struct ActiveRun {
    recorder: Recorder,
    snapshot_interval: u32,
    max_duration: f32,
    tick_count: u64,
    elapsed: f32,
}

/// Recording being shown as a ghost
struct ActivePlayback {
    slot: Slot,
    recording: Arc<Recording>,
    clock: f32,
    destroy_on_complete: bool,
}

/// Recording/playback state machine
pub struct ReplayScheduler {
    config: SchedulerConfig,
    ledger: ReplayLedger,
    run: Option<ActiveRun>,
    playback: Option<ActivePlayback>,
    ghost: Option<Box<dyn VisualProxy>>,
}

impl ReplayScheduler {
    /// Create a scheduler with an empty ledger
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_ledger(config, ReplayLedger::new())
    }

    /// Create a scheduler around an existing ledger
    pub fn with_ledger(config: SchedulerConfig, ledger: ReplayLedger) -> Self {
        Self {
            config,
            ledger,
            run: None,
            playback: None,
            ghost: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ReplayLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ReplayLedger {
        &mut self.ledger
    }

    // ------------------------------------------------------------------
    // Recording axis
    // ------------------------------------------------------------------

    /// Begin capturing `source`.
    ///
    /// A run already in progress is abandoned. `snapshot_interval_ticks` is
    /// clamped to at least 1.
    pub fn start_run(
        &mut self,
        source: impl PoseSource + 'static,
        snapshot_interval_ticks: u32,
        max_duration: f32,
    ) {
        if let Some(mut old) = self.run.take() {
            old.recorder.abandon();
            debug!(elapsed = old.elapsed, "abandoned run in progress");
        }

        let snapshot_interval = snapshot_interval_ticks.max(1);
        debug!(snapshot_interval, max_duration, "run started");

        self.run = Some(ActiveRun {
            recorder: Recorder::capturing(source),
            snapshot_interval,
            max_duration,
            tick_count: 0,
            elapsed: 0.0,
        });
    }

    /// Begin capturing with the configured interval and time limit
    pub fn start_run_with_defaults(&mut self, source: impl PoseSource + 'static) {
        let interval = self.config.snapshot_interval_ticks;
        let max_duration = self.config.max_duration;
        self.start_run(source, interval, max_duration);
    }

    /// Check if a run is being captured
    pub fn is_recording(&self) -> bool {
        self.run.is_some()
    }

    /// Capture time accumulated by the active run
    pub fn recording_elapsed(&self) -> Option<f32> {
        self.run.as_ref().map(|r| r.elapsed)
    }

    /// End the active run.
    ///
    /// With `save = false` the run is discarded. With `save = true` it is
    /// frozen and handed to [`ReplayLedger::finish_and_promote`].
    ///
    /// Returns whether the run became the new best. Without an active run
    /// this does nothing and returns `false`.
    pub fn finish_run(&mut self, save: bool) -> bool {
        let Some(mut run) = self.run.take() else {
            return false;
        };

        if !save {
            run.recorder.abandon();
            debug!(elapsed = run.elapsed, "run discarded");
            return false;
        }

        match run.recorder.finish() {
            Ok(recording) => self.ledger.finish_and_promote(recording),
            Err(e) => {
                warn!(error = %e, "run could not be saved");
                false
            }
        }
    }

    /// Fixed-rate entry point. Call once per physics step.
    ///
    /// Snapshots the active run on every `snapshot_interval`-th tick (the
    /// first tick included) at the time accumulated so far, then advances
    /// that time by one fixed timestep. A run whose duration reaches its limit
    /// is discarded.
    pub fn on_fixed_tick(&mut self) -> Option<ReplayEvent> {
        let run = self.run.as_mut()?;

        if run
            .tick_count
            .is_multiple_of(u64::from(run.snapshot_interval))
        {
            if let Err(e) = run.recorder.snapshot(run.elapsed) {
                warn!(error = %e, "snapshot failed");
            } else {
                trace!(elapsed = run.elapsed, "snapshot");
            }
        }
        run.tick_count += 1;
        run.elapsed += self.config.fixed_timestep;

        let duration = run.recorder.duration();
        if duration >= run.max_duration {
            debug!(duration, limit = run.max_duration, "run hit time limit");
            self.finish_run(false);
            return Some(ReplayEvent::RunTimedOut { elapsed: duration });
        }

        None
    }

    // ------------------------------------------------------------------
    // Playback axis
    // ------------------------------------------------------------------

    /// Start showing the recording in `slot` on `proxy`.
    ///
    /// Any ghost left over from a previous call is torn down first. If the
    /// slot is empty, `proxy` is torn down as well and nothing plays.
    ///
    /// Returns whether playback started.
    pub fn play(
        &mut self,
        slot: Slot,
        proxy: impl VisualProxy + 'static,
        destroy_on_complete: bool,
    ) -> bool {
        self.teardown_ghost();
        self.playback = None;

        let Some(recording) = self.ledger.get(slot) else {
            debug!(%slot, "nothing to play");
            Box::new(proxy).teardown();
            return false;
        };

        debug!(%slot, duration = recording.duration(), "playback started");
        self.playback = Some(ActivePlayback {
            slot,
            recording,
            clock: 0.0,
            destroy_on_complete,
        });
        self.ghost = Some(Box::new(proxy));
        true
    }

    /// Stop playback and tear down the ghost wherever the clock is
    pub fn stop(&mut self) {
        if let Some(playback) = self.playback.take() {
            debug!(slot = %playback.slot, clock = playback.clock, "playback stopped");
        }
        self.teardown_ghost();
    }

    /// Check if a recording is being played
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Slot being played
    pub fn playing_slot(&self) -> Option<Slot> {
        self.playback.as_ref().map(|p| p.slot)
    }

    /// Playback clock in seconds
    pub fn playback_time(&self) -> Option<f32> {
        self.playback.as_ref().map(|p| p.clock)
    }

    /// Check if a ghost proxy is held (possibly kept after completion)
    pub fn has_ghost(&self) -> bool {
        self.ghost.is_some()
    }

    /// Variable-rate entry point. Call once per rendered frame with the
    /// frame's real duration.
    ///
    /// Advances the playback clock, evaluates the recording and moves the
    /// ghost one smoothing step toward the result. Once the clock passes the
    /// recording's duration playback ends, tearing down the ghost if
    /// requested.
    pub fn on_variable_tick(&mut self, delta_seconds: f32) -> Option<ReplayEvent> {
        let playback = self.playback.as_mut()?;

        playback.clock += delta_seconds;
        let target = playback.recording.evaluate(playback.clock);

        if let Some(ghost) = self.ghost.as_mut() {
            let next = smooth_toward(ghost.pose(), target, self.config.smooth_factor);
            ghost.set_pose(next);
        }

        if playback.clock <= playback.recording.duration() {
            return None;
        }

        let slot = playback.slot;
        let destroyed = playback.destroy_on_complete;
        debug!(%slot, clock = playback.clock, destroyed, "playback finished");
        self.playback = None;
        if destroyed {
            self.teardown_ghost();
        }

        Some(ReplayEvent::PlaybackFinished { slot, destroyed })
    }

    fn teardown_ghost(&mut self) {
        if let Some(ghost) = self.ghost.take() {
            ghost.teardown();
        }
    }
}

impl Default for ReplayScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Drop for ReplayScheduler {
    fn drop(&mut self) {
        self.teardown_ghost();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ChannelKind;
    use crate::replay::runtime::proxy::RecordedProxy;
    use crate::replay::types::Pose;
    use glam::{Quat, Vec3};
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 0.033;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            fixed_timestep: DT,
            ..SchedulerConfig::default()
        }
    }

    fn shared_x() -> (Rc<Cell<f32>>, impl Fn() -> Pose + 'static) {
        let x = Rc::new(Cell::new(0.0f32));
        let reader = x.clone();
        (x, move || Pose::new(Vec3::new(reader.get(), 0.0, 0.0), Quat::IDENTITY))
    }

    /// Record a run moving along x at 1 unit/s for `ticks` fixed ticks
    fn record_linear(scheduler: &mut ReplayScheduler, ticks: u32) -> bool {
        let (x, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);
        for i in 0..ticks {
            x.set(i as f32 * DT);
            scheduler.on_fixed_tick();
        }
        scheduler.finish_run(true)
    }

    #[test]
    fn test_scenario_capture_reduces_stationary_tail() {
        let mut scheduler = ReplayScheduler::new(config());
        let (x, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);

        for pos in [0.0, 1.0, 1.0] {
            x.set(pos);
            assert!(scheduler.on_fixed_tick().is_none());
        }
        assert!(scheduler.finish_run(true));

        let last = scheduler.ledger().get(Slot::Last).unwrap();
        // Snapshots at 0.000, 0.033 and 0.066; the third extends the second
        assert_eq!(
            last.channel(ChannelKind::PosX).to_text(),
            "0.000,0.00|0.066,1.00"
        );
        assert!((last.duration() - 0.066).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_interval() {
        let mut scheduler = ReplayScheduler::new(config());
        let (x, source) = shared_x();
        scheduler.start_run(source, 3, 60.0);

        for i in 0..7 {
            x.set(i as f32);
            scheduler.on_fixed_tick();
        }
        scheduler.finish_run(true);

        // Ticks 0, 3 and 6 snapshot
        let last = scheduler.ledger().get(Slot::Last).unwrap();
        let values: Vec<f32> = last
            .channel(ChannelKind::PosX)
            .samples()
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![0.0, 3.0, 6.0]);
        assert!((last.duration() - 6.0 * DT).abs() < 1e-5);
    }

    #[test]
    fn test_interval_zero_is_clamped() {
        let mut scheduler = ReplayScheduler::new(config());
        let (_x, source) = shared_x();
        scheduler.start_run(source, 0, 60.0);
        scheduler.on_fixed_tick();
        scheduler.on_fixed_tick();
        assert!(scheduler.finish_run(true));
        let last = scheduler.ledger().get(Slot::Last).unwrap();
        assert_eq!(last.channel(ChannelKind::PosX).len(), 2);
    }

    #[test]
    fn test_time_limit_discards_run() {
        let mut scheduler = ReplayScheduler::new(SchedulerConfig {
            fixed_timestep: 0.25,
            ..SchedulerConfig::default()
        });
        let (_x, source) = shared_x();
        scheduler.start_run(source, 1, 1.0);

        let mut event = None;
        for _ in 0..10 {
            event = scheduler.on_fixed_tick();
            if event.is_some() {
                break;
            }
        }

        assert_eq!(event, Some(ReplayEvent::RunTimedOut { elapsed: 1.0 }));
        assert!(!scheduler.is_recording());
        assert!(scheduler.ledger().get(Slot::Last).is_none());
        assert!(!scheduler.finish_run(true));
    }

    #[test]
    fn test_finish_without_run() {
        let mut scheduler = ReplayScheduler::default();
        assert!(!scheduler.finish_run(true));
        assert!(!scheduler.finish_run(false));
    }

    #[test]
    fn test_finish_unsaved_leaves_ledger_unchanged() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 10);
        let before = scheduler.ledger().get(Slot::Last).unwrap();

        let (_x, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);
        scheduler.on_fixed_tick();
        assert!(!scheduler.finish_run(false));
        assert!(!scheduler.is_recording());

        let after = scheduler.ledger().get(Slot::Last).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_finish_before_first_tick_is_not_saved() {
        let mut scheduler = ReplayScheduler::new(config());
        let (_x, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);
        assert!(!scheduler.finish_run(true));
        assert!(scheduler.ledger().get(Slot::Last).is_none());
    }

    #[test]
    fn test_restart_abandons_run() {
        let mut scheduler = ReplayScheduler::new(config());
        let (_x, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);
        for _ in 0..5 {
            scheduler.on_fixed_tick();
        }

        let (_y, source) = shared_x();
        scheduler.start_run(source, 1, 60.0);
        assert_eq!(scheduler.recording_elapsed(), Some(0.0));
        scheduler.on_fixed_tick();
        scheduler.finish_run(true);
        assert_eq!(scheduler.ledger().get(Slot::Last).unwrap().duration(), 0.0);
    }

    #[test]
    fn test_best_promotion_through_scheduler() {
        let mut scheduler = ReplayScheduler::new(config());
        assert!(record_linear(&mut scheduler, 30));
        assert!(!record_linear(&mut scheduler, 40));
        assert!(record_linear(&mut scheduler, 30));
        assert!(record_linear(&mut scheduler, 20));
    }

    #[test]
    fn test_play_absent_slot_tears_down_proxy() {
        let mut scheduler = ReplayScheduler::default();
        let proxy = RecordedProxy::new(Pose::IDENTITY);

        assert!(!scheduler.play(Slot::Saved, proxy.clone(), true));
        assert!(proxy.is_torn_down());
        assert!(!scheduler.is_playing());
        assert!(!scheduler.has_ghost());
    }

    #[test]
    fn test_play_replaces_previous_ghost() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 10);

        let first = RecordedProxy::new(Pose::IDENTITY);
        assert!(scheduler.play(Slot::Last, first.clone(), true));
        scheduler.on_variable_tick(0.016);

        let second = RecordedProxy::new(Pose::IDENTITY);
        assert!(scheduler.play(Slot::Best, second.clone(), true));
        assert!(first.is_torn_down());
        assert!(!second.is_torn_down());
        assert_eq!(scheduler.playback_time(), Some(0.0));
        assert_eq!(scheduler.playing_slot(), Some(Slot::Best));
    }

    #[test]
    fn test_play_absent_slot_still_clears_previous_ghost() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 10);

        let first = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Last, first.clone(), true);

        let second = RecordedProxy::new(Pose::IDENTITY);
        assert!(!scheduler.play(Slot::Saved, second.clone(), true));
        assert!(first.is_torn_down());
        assert!(second.is_torn_down());
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn test_playback_smooths_toward_recording() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 31);

        let proxy = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Last, proxy.clone(), true);

        scheduler.on_variable_tick(0.5);
        let target = scheduler.ledger().get(Slot::Last).unwrap().evaluate(0.5);
        let pose = proxy.state().pose;
        assert!((pose.position.x - target.position.x * SMOOTH_FACTOR).abs() < 1e-5);
        assert_eq!(proxy.state().updates, 1);
    }

    #[test]
    fn test_playback_completion_destroys_ghost() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 31); // duration 0.99

        let proxy = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Last, proxy.clone(), true);

        let mut finished = None;
        let mut frames = 0;
        while finished.is_none() && frames < 1000 {
            finished = scheduler.on_variable_tick(0.1);
            frames += 1;
        }

        assert_eq!(
            finished,
            Some(ReplayEvent::PlaybackFinished {
                slot: Slot::Last,
                destroyed: true
            })
        );
        assert_eq!(frames, 10);
        assert!(proxy.is_torn_down());
        assert!(!scheduler.is_playing());
        assert!(scheduler.on_variable_tick(0.1).is_none());
    }

    #[test]
    fn test_playback_completion_keeps_ghost() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 5);

        let proxy = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Last, proxy.clone(), false);
        while scheduler.on_variable_tick(0.05).is_none() {}

        assert!(!proxy.is_torn_down());
        assert!(scheduler.has_ghost());

        // Kept ghosts are cleaned up by the next stop
        scheduler.stop();
        assert!(proxy.is_torn_down());
    }

    #[test]
    fn test_stop_mid_playback() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 100);

        let proxy = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Best, proxy.clone(), false);
        scheduler.on_variable_tick(0.2);
        scheduler.stop();

        assert!(proxy.is_torn_down());
        assert!(!scheduler.is_playing());
        assert!(scheduler.playback_time().is_none());
    }

    #[test]
    fn test_record_while_playing() {
        let mut scheduler = ReplayScheduler::new(config());
        record_linear(&mut scheduler, 30);

        let proxy = RecordedProxy::new(Pose::IDENTITY);
        scheduler.play(Slot::Last, proxy.clone(), true);
        let (x, source) = shared_x();
        scheduler.start_run(source, 2, 60.0);

        for i in 0..20 {
            x.set(i as f32);
            scheduler.on_fixed_tick();
            scheduler.on_variable_tick(DT);
        }

        assert!(scheduler.is_recording());
        assert!(scheduler.is_playing());
        // The ghost still plays the first run
        assert!(proxy.state().pose.position.x < 1.0);

        // Live run crosses the line ahead of the ghost
        assert!(scheduler.finish_run(true));
        scheduler.stop();
        assert!(proxy.is_torn_down());
    }

    #[test]
    fn test_drop_tears_down_ghost() {
        let proxy = RecordedProxy::new(Pose::IDENTITY);
        {
            let mut scheduler = ReplayScheduler::new(config());
            record_linear(&mut scheduler, 10);
            scheduler.play(Slot::Last, proxy.clone(), true);
        }
        assert!(proxy.is_torn_down());
    }
}
