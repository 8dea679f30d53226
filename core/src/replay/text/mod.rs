//! Text recording format
//!
//! The portable form of a recording, shared with previously persisted runs.
//! Field widths and delimiters are a compatibility contract.
//!
//! # Layout
//!
//! ```text
//! posX channel  \n
//! posY channel  \n
//! posZ channel  \n
//! rotX channel  \n
//! rotY channel  \n
//! rotZ channel  \n
//! rotW channel            (no trailing newline)
//!
//! channel := sample ( "|" sample )*
//! sample  := time "," value      time: 3 decimals, value: 2 decimals
//! ```
//!
//! Example (one stationary second at the origin):
//!
//! ```text
//! 0.000,0.00|1.000,0.00
//! ```

mod reader;
mod writer;

pub use reader::{parse_channel, parse_recording};
pub use writer::{write_channel, write_recording};

/// Separator between samples within a channel
pub const SAMPLE_DELIMITER: char = '|';
/// Separator between time and value within a sample
pub const FIELD_DELIMITER: char = ',';
/// Separator between channels
pub const CHANNEL_DELIMITER: char = '\n';
