//! Ghostline Core - ghost run recording and playback
//!
//! This crate captures the pose of a moving entity as compact curves, keeps
//! the last, best and saved runs, and replays them as a smoothed ghost driven
//! by the host's tick loop.
//!
//! # Architecture
//!
//! - [`CurveChannel`] - One scalar track with keyframe reduction and linear evaluation
//! - [`Recording`] - Seven channels (position + quaternion) with a text codec
//! - [`ReplayLedger`] - Last / best / saved run slots
//! - [`ReplayScheduler`] - Fixed-tick capture and variable-tick playback
//! - [`RecordingStore`] - `.ghost` files on disk

pub mod config;
pub mod error;
pub mod replay;
pub mod store;

pub use config::GhostConfig;
pub use error::{ReplayError, Result};
pub use store::RecordingStore;

// Re-export replay types
pub use replay::{
    ChannelKind, CurveChannel, HeadlessConfig, HeadlessRunner, Pose, PoseSource, Recorder,
    RecordedProxy, Recording, ReplayEvent, ReplayLedger, ReplayScheduler, SchedulerConfig, Slot,
    VisualProxy,
};

// Re-export math types used in the public API
pub use glam::{Quat, Vec3};
