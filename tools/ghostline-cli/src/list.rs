//! List stored runs

use anyhow::Result;

use ghostline_core::GhostConfig;

/// Print every stored run with its duration
pub fn execute(config: &GhostConfig) -> Result<()> {
    let store = crate::open_store(config)?;
    let names = store.list()?;

    if names.is_empty() {
        println!("No runs in {}", store.dir().display());
        return Ok(());
    }

    println!("Runs in {}:", store.dir().display());
    for name in names {
        match store.load(&name) {
            Ok(Some(run)) => println!("  {:<24} {:>8.3}s", name, run.duration()),
            Ok(None) => {}
            Err(e) => println!("  {:<24} unreadable ({e})", name),
        }
    }

    Ok(())
}
