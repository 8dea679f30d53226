//! Replay a run headless and trace the ghost

use anyhow::Result;
use clap::Args;

use ghostline_core::{GhostConfig, HeadlessConfig, HeadlessRunner, Pose, ReplayScheduler, Slot};

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Run file or stored run name
    run: String,

    /// Print the ghost pose every N frames (0 = summary only)
    #[arg(long, default_value = "30")]
    every: u64,

    /// Spawn the ghost at the origin instead of the run's first pose
    #[arg(long)]
    from_origin: bool,
}

/// Load the run into the saved slot and play it to completion
pub fn execute(args: PlayArgs, config: &GhostConfig) -> Result<()> {
    let recording = crate::load_run(&args.run, config)?;
    let spawn = if args.from_origin {
        Pose::IDENTITY
    } else {
        recording.evaluate(0.0)
    };
    let duration = recording.duration();

    let mut scheduler = ReplayScheduler::new(config.scheduler_config());
    scheduler.ledger_mut().set_saved(recording);

    let headless = HeadlessConfig {
        trace_interval_frames: args.every,
        ..config.headless_config()
    };
    let frame_delta = headless.frame_delta;
    let mut runner = HeadlessRunner::new(scheduler, headless);

    println!(
        "Playing {} ({:.3}s at {:.0}fps)",
        args.run,
        duration,
        1.0 / frame_delta
    );

    let report = runner.play_slot(Slot::Saved, spawn);
    for (time, pose) in &report.trace {
        let p = pose.position;
        println!("  {:>8.3}s  {:>9.3} {:>9.3} {:>9.3}", time, p.x, p.y, p.z);
    }

    let p = report.final_pose.position;
    println!();
    println!("Frames: {}", report.frames);
    println!("Final position: {:.3} {:.3} {:.3}", p.x, p.y, p.z);
    println!("Max lag behind the run: {:.3}", report.max_deviation);
    println!(
        "Ghost {}",
        if report.torn_down { "removed" } else { "kept" }
    );

    Ok(())
}
