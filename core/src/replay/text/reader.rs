//! Text format reader
//!
//! Parsing is all-or-nothing: any malformed field rejects the whole record.

use super::{CHANNEL_DELIMITER, FIELD_DELIMITER, SAMPLE_DELIMITER};
use crate::error::{ReplayError, Result};
use crate::replay::channel::{CurveChannel, Sample};
use crate::replay::recording::Recording;
use crate::replay::types::{CHANNEL_COUNT, ChannelKind};

/// Parse one channel.
///
/// Samples are ordered by time; when two samples share an exact timestamp
/// the first one wins.
pub fn parse_channel(text: &str) -> Result<CurveChannel> {
    if text.trim().is_empty() {
        return Err(ReplayError::malformed("channel has no samples"));
    }

    let mut samples = text
        .split(SAMPLE_DELIMITER)
        .enumerate()
        .map(|(i, field)| parse_sample(field).map_err(|e| in_sample(i, e)))
        .collect::<Result<Vec<_>>>()?;

    // Stable sort keeps duplicates in input order, dedup_by keeps the first
    samples.sort_by(|a, b| a.time.total_cmp(&b.time));
    samples.dedup_by(|later, earlier| later.time == earlier.time);

    Ok(CurveChannel::from_sorted(samples))
}

/// Parse a full 7-channel recording.
///
/// The duration is the latest final sample time across the position channels.
pub fn parse_recording(text: &str) -> Result<Recording> {
    let parts: Vec<&str> = text.split(CHANNEL_DELIMITER).collect();
    if parts.len() != CHANNEL_COUNT {
        return Err(ReplayError::malformed(format!(
            "expected {CHANNEL_COUNT} channels, found {}",
            parts.len()
        )));
    }

    let mut channels: [CurveChannel; CHANNEL_COUNT] = Default::default();
    for (kind, part) in ChannelKind::ALL.into_iter().zip(parts) {
        channels[kind.index()] = parse_channel(part).map_err(|e| match e {
            ReplayError::MalformedData(msg) => {
                ReplayError::malformed(format!("channel {}: {msg}", kind.name()))
            }
            other => other,
        })?;
    }

    let duration = ChannelKind::ALL
        .into_iter()
        .filter(|k| k.is_position())
        .filter_map(|k| channels[k.index()].end_time())
        .fold(0.0f32, f32::max);

    Ok(Recording::from_parts(channels, duration))
}

fn parse_sample(field: &str) -> Result<Sample> {
    let (time, value) = field
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| ReplayError::malformed(format!("'{field}' is not a time,value pair")))?;

    let time = parse_number(time)?;
    let value = parse_number(value)?;

    if time < 0.0 {
        return Err(ReplayError::malformed(format!("negative time {time}")));
    }

    Ok(Sample::new(time, value))
}

fn parse_number(s: &str) -> Result<f32> {
    let s = s.trim();
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(ReplayError::malformed(format!("non-finite number '{s}'"))),
        Err(_) => Err(ReplayError::malformed(format!("invalid number '{s}'"))),
    }
}

fn in_sample(index: usize, err: ReplayError) -> ReplayError {
    match err {
        ReplayError::MalformedData(msg) => {
            ReplayError::malformed(format!("sample {index}: {msg}"))
        }
        other => other,
    }
}
