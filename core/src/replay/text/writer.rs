//! Text format writer

use std::fmt::Write;

use super::{CHANNEL_DELIMITER, FIELD_DELIMITER, SAMPLE_DELIMITER};
use crate::replay::channel::CurveChannel;
use crate::replay::recording::Recording;

/// Append the text form of `channel` to `out`
pub fn write_channel(channel: &CurveChannel, out: &mut String) {
    for (i, sample) in channel.samples().iter().enumerate() {
        if i > 0 {
            out.push(SAMPLE_DELIMITER);
        }
        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{:.3}{}{:.2}",
            sample.time, FIELD_DELIMITER, sample.value
        );
    }
}

/// Serialize all 7 channels, newline-separated, without a trailing newline
pub fn write_recording(recording: &Recording) -> String {
    let mut out = String::with_capacity(recording.sample_count() * 12);
    for (i, channel) in recording.channels().iter().enumerate() {
        if i > 0 {
            out.push(CHANNEL_DELIMITER);
        }
        write_channel(channel, &mut out);
    }
    out
}
