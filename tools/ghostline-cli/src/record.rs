//! Record laps around the built-in circuit

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;

use ghostline_core::{GhostConfig, HeadlessRunner, ReplayScheduler, Slot};

use crate::track;

/// Arguments for the record command
#[derive(Args)]
pub struct RecordArgs {
    /// Lap time in seconds; repeat for several laps
    #[arg(long = "lap-time", default_value = "12.0")]
    lap_times: Vec<f32>,

    /// Circuit radius
    #[arg(long, default_value = "20.0")]
    radius: f32,

    /// Race each lap against the best ghost so far
    #[arg(long)]
    race: bool,

    /// Name of the stored run
    #[arg(short, long, default_value = "best")]
    name: String,

    /// Write the run to this file instead of the store
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Record the laps and keep the best one
pub fn execute(args: RecordArgs, config: &GhostConfig) -> Result<()> {
    if let Some(bad) = args.lap_times.iter().find(|t| !t.is_finite() || **t <= 0.0) {
        bail!("Lap time must be a positive number of seconds, got {bad}");
    }

    let scheduler = ReplayScheduler::new(config.scheduler_config());
    let mut runner = HeadlessRunner::new(scheduler, config.headless_config());

    for (lap, &lap_time) in args.lap_times.iter().enumerate() {
        let circuit = track::circuit(args.radius, lap_time);
        let ghost = if args.race && runner.scheduler().ledger().contains(Slot::Best) {
            Some((Slot::Best, circuit(0.0)))
        } else {
            None
        };

        let race = runner.race(circuit, lap_time, ghost);
        let result = if race.lap.timed_out {
            "timed out"
        } else if race.lap.is_new_best {
            "new best"
        } else {
            "finished"
        };
        print!(
            "Lap {}: {:.3}s, {} ticks, {}",
            lap + 1,
            lap_time,
            race.lap.fixed_ticks,
            result
        );
        if race.ghost_started {
            let ghost = if race.ghost_finished_first {
                "ghost ahead"
            } else {
                "ghost behind"
            };
            print!(" ({ghost})");
        }
        println!();
    }

    let Some(best) = runner.scheduler().ledger().get(Slot::Best) else {
        bail!(
            "No lap finished within the {}s limit",
            config.scheduler_config().max_duration
        );
    };

    let path = match args.output {
        Some(path) => {
            std::fs::write(&path, best.serialize())
                .with_context(|| format!("Failed to write run: {}", path.display()))?;
            path
        }
        None => {
            let store = crate::open_store(config)?;
            store
                .save(&args.name, &best)
                .with_context(|| format!("Failed to store run '{}'", args.name))?
        }
    };

    println!();
    println!(
        "Best run: {:.3}s, {} samples",
        best.duration(),
        best.sample_count()
    );
    println!("Saved to: {}", path.display());

    Ok(())
}
