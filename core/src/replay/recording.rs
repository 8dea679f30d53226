//! Motion recordings
//!
//! A [`Recorder`] captures the pose of a live source into 7 curve channels.
//! Finishing it yields a frozen [`Recording`] that can be evaluated at any
//! time and round-tripped through the text format.

use std::str::FromStr;

use tracing::debug;

use crate::error::{ReplayError, Result};
use crate::replay::channel::CurveChannel;
use crate::replay::text;
use crate::replay::types::{CHANNEL_COUNT, ChannelKind, Pose};

/// Supplies the current pose of the entity being recorded
pub trait PoseSource {
    /// Pose at the moment of the call
    fn current_pose(&self) -> Pose;
}

impl<F> PoseSource for F
where
    F: Fn() -> Pose,
{
    fn current_pose(&self) -> Pose {
        self()
    }
}

/// Frozen motion trajectory.
///
/// Every channel holds at least one sample, so evaluation is always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    channels: [CurveChannel; CHANNEL_COUNT],
    duration: f32,
}

impl Recording {
    pub(crate) fn from_parts(channels: [CurveChannel; CHANNEL_COUNT], duration: f32) -> Self {
        debug_assert!(channels.iter().all(|c| !c.is_empty()));
        Self { channels, duration }
    }

    /// Length of the run in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn channel(&self, kind: ChannelKind) -> &CurveChannel {
        &self.channels[kind.index()]
    }

    /// Channels in serialization order
    pub fn channels(&self) -> &[CurveChannel; CHANNEL_COUNT] {
        &self.channels
    }

    /// Total number of samples across all channels
    pub fn sample_count(&self) -> usize {
        self.channels.iter().map(CurveChannel::len).sum()
    }

    /// Evaluate every channel at `elapsed` and assemble the pose.
    ///
    /// The orientation is not renormalized.
    pub fn evaluate(&self, elapsed: f32) -> Pose {
        Pose::from_components(std::array::from_fn(|i| self.channels[i].evaluate(elapsed)))
    }

    /// Text form of the recording (see [`crate::replay::text`])
    pub fn serialize(&self) -> String {
        text::write_recording(self)
    }

    /// Rebuild a frozen recording from its text form.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::MalformedData`] if the channel count is not 7 or
    /// any sample fails to parse.
    pub fn deserialize(data: &str) -> Result<Self> {
        text::parse_recording(data)
    }
}

impl FromStr for Recording {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::deserialize(s)
    }
}

/// Live capture of a pose source
#[derive(Default)]
pub struct Recorder {
    channels: [CurveChannel; CHANNEL_COUNT],
    duration: f32,
    snapshot_count: u64,
    source: Option<Box<dyn PoseSource>>,
}

impl Recorder {
    /// Create an idle recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder already capturing `source`
    pub fn capturing(source: impl PoseSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::default()
        }
    }

    /// Clear all channels and bind to `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] if a capture is already running.
    pub fn begin_capture(&mut self, source: impl PoseSource + 'static) -> Result<()> {
        if self.is_capturing() {
            return Err(ReplayError::invalid_state("capture already in progress"));
        }

        self.channels = Default::default();
        self.duration = 0.0;
        self.snapshot_count = 0;
        self.source = Some(Box::new(source));
        Ok(())
    }

    /// Check if a capture is running
    pub fn is_capturing(&self) -> bool {
        self.source.is_some()
    }

    /// Read the source pose and append it to every channel at `elapsed`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] when no capture is running or
    /// `elapsed` is earlier than the previous snapshot.
    pub fn snapshot(&mut self, elapsed: f32) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            return Err(ReplayError::invalid_state("snapshot without an active capture"));
        };

        if self.snapshot_count > 0 && elapsed < self.duration {
            return Err(ReplayError::invalid_state(format!(
                "snapshot at {elapsed} precedes previous snapshot at {}",
                self.duration
            )));
        }

        let pose = source.current_pose();
        for kind in ChannelKind::ALL {
            self.channels[kind.index()].append(elapsed, pose.component(kind))?;
        }

        self.duration = elapsed;
        self.snapshot_count += 1;
        Ok(())
    }

    /// Time of the latest snapshot
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }

    /// Stop capturing and freeze the channels into a [`Recording`].
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] when no capture is running or no
    /// snapshot was taken. The capture is stopped either way.
    pub fn finish(&mut self) -> Result<Recording> {
        if self.source.take().is_none() {
            return Err(ReplayError::invalid_state("finish without an active capture"));
        }

        let channels = std::mem::take(&mut self.channels);
        if self.snapshot_count == 0 {
            return Err(ReplayError::invalid_state("capture finished before any snapshot"));
        }

        debug!(
            duration = self.duration,
            snapshots = self.snapshot_count,
            samples = channels.iter().map(CurveChannel::len).sum::<usize>(),
            "capture finished"
        );
        Ok(Recording::from_parts(channels, self.duration))
    }

    /// Stop capturing and drop everything captured so far.
    ///
    /// Returns whether a capture was running.
    pub fn abandon(&mut self) -> bool {
        let was_capturing = self.source.take().is_some();
        self.channels = Default::default();
        self.duration = 0.0;
        self.snapshot_count = 0;
        was_capturing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::cell::Cell;
    use std::rc::Rc;

    fn shared_pose(pose: Pose) -> (Rc<Cell<Pose>>, impl Fn() -> Pose + 'static) {
        let cell = Rc::new(Cell::new(pose));
        let reader = cell.clone();
        (cell, move || reader.get())
    }

    fn at_x(x: f32) -> Pose {
        Pose::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    #[test]
    fn test_recorder_basic() {
        let (pose, source) = shared_pose(at_x(0.0));
        let mut recorder = Recorder::new();
        assert!(!recorder.is_capturing());

        recorder.begin_capture(source).unwrap();
        assert!(recorder.is_capturing());

        recorder.snapshot(0.0).unwrap();
        pose.set(at_x(1.0));
        recorder.snapshot(0.5).unwrap();
        pose.set(at_x(3.0));
        recorder.snapshot(1.0).unwrap();

        assert_eq!(recorder.snapshot_count(), 3);
        assert_eq!(recorder.duration(), 1.0);

        let recording = recorder.finish().unwrap();
        assert!(!recorder.is_capturing());
        assert_eq!(recording.duration(), 1.0);
        assert_eq!(recording.channel(ChannelKind::PosX).len(), 3);
        // Constant channels collapse to onset + end
        assert_eq!(recording.channel(ChannelKind::RotW).len(), 2);
        assert_eq!(recording.evaluate(0.75).position.x, 2.0);
    }

    #[test]
    fn test_begin_capture_twice_fails() {
        let mut recorder = Recorder::new();
        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
        let err = recorder.begin_capture(|| Pose::IDENTITY).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidState(_)));
    }

    #[test]
    fn test_snapshot_requires_capture() {
        let mut recorder = Recorder::new();
        assert!(matches!(
            recorder.snapshot(0.0),
            Err(ReplayError::InvalidState(_))
        ));

        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
        recorder.snapshot(0.0).unwrap();
        recorder.finish().unwrap();
        assert!(matches!(
            recorder.snapshot(0.1),
            Err(ReplayError::InvalidState(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_time_going_backwards() {
        let mut recorder = Recorder::new();
        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
        recorder.snapshot(1.0).unwrap();
        assert!(recorder.snapshot(0.5).is_err());
        assert_eq!(recorder.duration(), 1.0);
    }

    #[test]
    fn test_finish_without_snapshots() {
        let mut recorder = Recorder::new();
        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
        assert!(recorder.finish().is_err());
        assert!(!recorder.is_capturing());
        assert!(recorder.finish().is_err());
    }

    #[test]
    fn test_abandon() {
        let mut recorder = Recorder::new();
        assert!(!recorder.abandon());
        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
        recorder.snapshot(0.0).unwrap();
        assert!(recorder.abandon());
        assert_eq!(recorder.snapshot_count(), 0);
        // A new capture can start right away
        recorder.begin_capture(|| Pose::IDENTITY).unwrap();
    }

    #[test]
    fn test_serialize_roundtrip_at_sampled_times() {
        let (pose, source) = shared_pose(Pose::IDENTITY);
        let mut recorder = Recorder::new();
        recorder.begin_capture(source).unwrap();

        let times = [0.0f32, 0.04, 0.08, 0.12, 0.16, 0.2];
        for (i, &t) in times.iter().enumerate() {
            let angle = i as f32 * 0.3;
            pose.set(Pose::new(
                Vec3::new(i as f32 * 1.5, 0.25 * i as f32, -2.0),
                Quat::from_rotation_y(angle),
            ));
            recorder.snapshot(t).unwrap();
        }
        let original = recorder.finish().unwrap();

        let text = original.serialize();
        assert_eq!(text.matches('\n').count(), 6);
        assert!(!text.ends_with('\n'));

        let loaded: Recording = text.parse().unwrap();
        assert!((loaded.duration() - original.duration()).abs() <= 1e-3);
        for &t in &times {
            let a = original.evaluate(t);
            let b = loaded.evaluate(t);
            assert!(a.position.abs_diff_eq(b.position, 0.006), "t={t}");
            for kind in ChannelKind::ALL {
                assert!((a.component(kind) - b.component(kind)).abs() <= 0.006);
            }
        }
    }
}
