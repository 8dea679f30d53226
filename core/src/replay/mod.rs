//! Ghost replay system
//!
//! Records the pose of a moving entity as lossy curves, stores finished runs
//! in a ledger, and plays them back as a smoothed ghost.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Recording axis                        │
//! │ pose source → fixed tick → Recorder → Recording → Ledger  │
//! └───────────────────────────────────────────────────────────┘
//!
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Playback axis                         │
//! │ Ledger slot → variable tick → evaluate → smooth → proxy   │
//! └───────────────────────────────────────────────────────────┘
//!
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Persistence                           │
//! │ Recording ⇄ text format ⇄ RecordingStore (.ghost files)   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ghostline_core::replay::{ReplayScheduler, SchedulerConfig, Slot};
//!
//! let mut scheduler = ReplayScheduler::new(SchedulerConfig::default());
//!
//! // Race start: record the car and show the last run as a ghost
//! scheduler.start_run_with_defaults(move || car.pose());
//! scheduler.play(Slot::Last, ghost, true);
//!
//! // Host loop:
//! scheduler.on_fixed_tick();            // every physics step
//! scheduler.on_variable_tick(frame_dt); // every rendered frame
//!
//! // Finish line:
//! let is_new_best = scheduler.finish_run(true);
//! scheduler.stop();
//! ```

pub mod channel;
pub mod ledger;
pub mod recording;
pub mod runtime;
pub mod text;
pub mod types;

// Re-export core types
pub use channel::{CurveChannel, Sample, VALUE_EPSILON};
pub use ledger::ReplayLedger;
pub use recording::{PoseSource, Recorder, Recording};
pub use types::{CHANNEL_COUNT, ChannelKind, Pose, ReplayEvent, Slot};

// Re-export runtime
pub use runtime::{
    DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_DURATION, DEFAULT_SNAPSHOT_INTERVAL, HeadlessConfig,
    HeadlessRunner, LapReport, PlaybackReport, ProxyState, RaceReport, RecordedProxy,
    ReplayScheduler, SMOOTH_FACTOR, SchedulerConfig, VisualProxy, smooth_toward,
};
