//! Replay runtime
//!
//! This module contains the tick-driven side of the replay system:
//! - **Scheduler**: Captures runs and plays ghosts from two host ticks
//! - **Proxy**: The ghost object the scheduler moves
//! - **Headless**: Host loop for CLI and test use

mod headless;
mod proxy;
mod scheduler;

pub use headless::{HeadlessConfig, HeadlessRunner, LapReport, PlaybackReport, RaceReport};
pub use proxy::{ProxyState, RecordedProxy, SMOOTH_FACTOR, VisualProxy, smooth_toward};
pub use scheduler::{
    DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_DURATION, DEFAULT_SNAPSHOT_INTERVAL, ReplayScheduler,
    SchedulerConfig,
};
