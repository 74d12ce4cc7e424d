//! Init command
//!
//! Create the data directory with a default configuration.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use commently_core::config::Config;
use commently_storage::FileSystemStore;
use std::fs;

use super::context::Globals;

/// Init arguments
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long, short)]
    pub force: bool,
}

/// Execute the init command
pub fn execute(globals: &Globals, args: InitArgs) -> Result<()> {
    let data_dir = globals.data_dir();
    let config_path = globals.config_path();

    let store = FileSystemStore::new(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    if config_path.exists() && !args.force {
        println!(
            "{} Configuration already exists at {} (use --force to overwrite)",
            "⚠".yellow(),
            config_path.display()
        );
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = Config::default().to_toml_string()?;
        fs::write(&config_path, format!("# commently configuration\n\n{}", content))
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!(
            "{} Wrote configuration to {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!(
        "{} Data directory ready at {}",
        "✓".green(),
        store.base_dir().display()
    );
    Ok(())
}
