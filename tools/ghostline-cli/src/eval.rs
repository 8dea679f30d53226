//! Evaluate a run at a point in time

use anyhow::{Result, bail};
use clap::Args;

use ghostline_core::{ChannelKind, GhostConfig};

/// Arguments for the eval command
#[derive(Args)]
pub struct EvalArgs {
    /// Run file or stored run name
    run: String,

    /// Time in seconds since the start of the run
    #[arg(long)]
    at: f32,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// Print the recorded pose at `--at`, clamped to the run's ends
pub fn execute(args: EvalArgs, config: &GhostConfig) -> Result<()> {
    if !args.at.is_finite() {
        bail!("Time must be a finite number of seconds");
    }

    let recording = crate::load_run(&args.run, config)?;
    let pose = recording.evaluate(args.at);

    if args.json {
        let p = pose.position;
        let q = pose.orientation;
        let report = serde_json::json!({
            "time": args.at,
            "position": [p.x, p.y, p.z],
            "orientation": [q.x, q.y, q.z, q.w],
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("t = {:.3}s", args.at);
    for kind in ChannelKind::ALL {
        println!("  {:<6} {:>10.4}", kind.name(), pose.component(kind));
    }

    Ok(())
}
