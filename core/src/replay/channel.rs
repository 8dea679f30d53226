//! Single-track curve storage
//!
//! A [`CurveChannel`] is a time-ordered list of `(time, value)` samples with
//! piecewise-linear evaluation. Capture appends through a keyframe-reduction
//! policy so that stationary stretches cost two samples instead of one per
//! tick.

use crate::error::{ReplayError, Result};

/// Absolute tolerance under which two consecutive values count as unchanged
pub const VALUE_EPSILON: f32 = 1e-4;

/// A single keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the start of the run
    pub time: f32,
    pub value: f32,
}

impl Sample {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Time-ordered samples of one scalar track.
///
/// Invariant: times are unique and strictly ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveChannel {
    samples: Vec<Sample>,
}

impl CurveChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Build a channel from samples that already satisfy the ordering invariant.
    pub(crate) fn from_sorted(samples: Vec<Sample>) -> Self {
        debug_assert!(samples.windows(2).all(|w| w[0].time < w[1].time));
        Self { samples }
    }

    /// Append a sample captured at `time`.
    ///
    /// Once the channel holds at least two samples, a value within
    /// [`VALUE_EPSILON`] of the last one moves the last sample to `time`
    /// instead of adding a new one. A write at exactly the last sample's time
    /// replaces its value.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidState`] if `time` is earlier than the
    /// last sample.
    pub fn append(&mut self, time: f32, value: f32) -> Result<()> {
        let len = self.samples.len();

        if let Some(last) = self.samples.last_mut() {
            if time < last.time {
                return Err(ReplayError::invalid_state(format!(
                    "sample time {time} precedes last sample at {}",
                    last.time
                )));
            }

            if len >= 2 && (value - last.value).abs() <= VALUE_EPSILON {
                last.time = time;
                return Ok(());
            }

            if time == last.time {
                last.value = value;
                return Ok(());
            }
        }

        self.samples.push(Sample::new(time, value));
        Ok(())
    }

    /// Evaluate the channel at `time`.
    ///
    /// Linear between the two bracketing samples, clamped to the first and
    /// last values outside the sampled range.
    ///
    /// # Panics
    ///
    /// Panics if the channel is empty. Frozen recordings never contain empty
    /// channels.
    pub fn evaluate(&self, time: f32) -> f32 {
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];

        if time.is_nan() || time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // first.time < time < last.time, so 1 <= idx < len
        let idx = self.samples.partition_point(|s| s.time <= time);
        let a = self.samples[idx - 1];
        let b = self.samples[idx];
        let t = (time - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * t
    }

    /// Canonical text form: `time,value` pairs joined by `|`
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        crate::replay::text::write_channel(self, &mut out);
        out
    }

    /// Parse the canonical text form.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::MalformedData`] on an empty channel or any
    /// unparsable sample.
    pub fn from_text(text: &str) -> Result<Self> {
        crate::replay::text::parse_channel(text)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the last sample, if any
    pub fn end_time(&self) -> Option<f32> {
        self.samples.last().map(|s| s.time)
    }
}
