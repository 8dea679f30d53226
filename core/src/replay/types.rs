//! Core types for the replay system
//!
//! Value types shared by the recorder, the text codec, the ledger and the
//! scheduler.

use glam::{Quat, Vec3};

/// Position and orientation of an entity at one instant.
///
/// Plain value, produced by evaluation and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    /// Pose at the origin with no rotation
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Scalar component carried by `kind`
    pub fn component(&self, kind: ChannelKind) -> f32 {
        match kind {
            ChannelKind::PosX => self.position.x,
            ChannelKind::PosY => self.position.y,
            ChannelKind::PosZ => self.position.z,
            ChannelKind::RotX => self.orientation.x,
            ChannelKind::RotY => self.orientation.y,
            ChannelKind::RotZ => self.orientation.z,
            ChannelKind::RotW => self.orientation.w,
        }
    }

    /// Assemble a pose from the 7 channel values in [`ChannelKind::ALL`] order.
    ///
    /// The quaternion is taken as-is; independent channel interpolation can
    /// produce a non-unit quaternion and it is deliberately not renormalized.
    pub fn from_components(c: [f32; CHANNEL_COUNT]) -> Self {
        Self {
            position: Vec3::new(c[0], c[1], c[2]),
            orientation: Quat::from_xyzw(c[3], c[4], c[5], c[6]),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Number of channels in a recording
pub const CHANNEL_COUNT: usize = 7;

/// One scalar track of a recording, in serialization order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    RotW,
}

impl ChannelKind {
    /// All channels in serialization order
    pub const ALL: [ChannelKind; CHANNEL_COUNT] = [
        ChannelKind::PosX,
        ChannelKind::PosY,
        ChannelKind::PosZ,
        ChannelKind::RotX,
        ChannelKind::RotY,
        ChannelKind::RotZ,
        ChannelKind::RotW,
    ];

    /// Position of this channel in [`ChannelKind::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short label used in reports and error messages
    pub const fn name(self) -> &'static str {
        match self {
            ChannelKind::PosX => "pos.x",
            ChannelKind::PosY => "pos.y",
            ChannelKind::PosZ => "pos.z",
            ChannelKind::RotX => "rot.x",
            ChannelKind::RotY => "rot.y",
            ChannelKind::RotZ => "rot.z",
            ChannelKind::RotW => "rot.w",
        }
    }

    /// Whether this is one of the three position channels
    pub const fn is_position(self) -> bool {
        matches!(self, ChannelKind::PosX | ChannelKind::PosY | ChannelKind::PosZ)
    }
}

/// Ledger position a finished run can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Most recently finished run
    Last,
    /// Fastest run so far
    Best,
    /// Run loaded from external storage
    Saved,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Last, Slot::Best, Slot::Saved];

    pub const fn name(self) -> &'static str {
        match self {
            Slot::Last => "last",
            Slot::Best => "best",
            Slot::Saved => "saved",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Notification produced by a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayEvent {
    /// The active run hit its time limit and was discarded
    RunTimedOut {
        /// Duration of the discarded recording
        elapsed: f32,
    },
    /// Playback ran past the end of its recording
    PlaybackFinished {
        slot: Slot,
        /// Whether the ghost proxy was torn down on completion
        destroyed: bool,
    },
}
