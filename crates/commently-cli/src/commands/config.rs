//! Config command
//!
//! Show and validate the configuration.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use commently_core::config::Config;

use super::context::Globals;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Execute the config command
pub fn execute(globals: &Globals, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(globals, json),
        ConfigCommand::Validate => validate_config(globals),
    }
}

fn show_config(globals: &Globals, as_json: bool) -> Result<()> {
    let config = globals.load_config()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let path = globals.config_path();
    println!("{}", "Configuration:".bold().underline());
    if path.exists() {
        println!("{}", path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults)".dimmed());
    }
    println!();
    println!("{}", config.to_toml_string()?);
    Ok(())
}

fn validate_config(globals: &Globals) -> Result<()> {
    let path = globals.config_path();

    if !path.exists() {
        eprintln!(
            "{} Configuration not found at {}",
            "✗".red(),
            path.display()
        );
        anyhow::bail!("no configuration to validate");
    }

    let config = Config::load(&path)?;
    println!("{} Configuration is valid", "✓".green());
    println!(
        "  Reactions: {}",
        config
            .reactions
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Guest mode: {}",
        if config.guest_mode.enabled { "on" } else { "off" }
    );
    println!(
        "  Approval required: {}",
        if config.approval_required { "yes" } else { "no" }
    );
    Ok(())
}
