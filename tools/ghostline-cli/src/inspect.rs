//! Show what a run contains

use anyhow::Result;
use clap::Args;

use ghostline_core::{ChannelKind, GhostConfig};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Run file or stored run name
    run: String,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// Print duration, size and per-channel sample counts
pub fn execute(args: InspectArgs, config: &GhostConfig) -> Result<()> {
    let recording = crate::load_run(&args.run, config)?;
    let size = recording.serialize().len();

    if args.json {
        let channels: serde_json::Map<String, serde_json::Value> = ChannelKind::ALL
            .iter()
            .map(|&kind| {
                let channel = recording.channel(kind);
                (
                    kind.name().to_string(),
                    serde_json::json!({
                        "samples": channel.len(),
                        "end_time": channel.end_time(),
                    }),
                )
            })
            .collect();

        let report = serde_json::json!({
            "run": args.run,
            "duration": recording.duration(),
            "samples": recording.sample_count(),
            "size_bytes": size,
            "channels": channels,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== {} ===", args.run);
    println!("Duration: {:.3}s", recording.duration());
    println!("Samples: {}", recording.sample_count());
    println!("Size: {} bytes", size);
    println!();
    for kind in ChannelKind::ALL {
        let channel = recording.channel(kind);
        println!(
            "  {:<6} {:>6} samples, ends at {:.3}s",
            kind.name(),
            channel.len(),
            channel.end_time().unwrap_or(0.0)
        );
    }

    Ok(())
}
