//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod comment;
pub mod config;
pub mod context;
pub mod init;
pub mod list;
pub mod react;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// commently - comments, replies and reactions for any entity
#[derive(Debug, Parser)]
#[command(name = "commently")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (defaults to config.toml in the data directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding comments.json
    #[arg(long, global = true, env = "COMMENTLY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// User id granted moderation rights (repeatable)
    #[arg(long = "moderator", global = true, value_name = "ID")]
    pub moderators: Vec<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the data directory and a default configuration
    Init(init::InitArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Post a top-level comment
    Post(comment::PostArgs),

    /// Reply to a comment
    Reply(comment::ReplyArgs),

    /// Edit a comment or reply
    Edit(comment::EditArgs),

    /// Delete a comment with its replies and reactions
    Delete(comment::DeleteArgs),

    /// Approve or unapprove a comment
    Approve(comment::ApproveArgs),

    /// Toggle a reaction on a comment
    React(react::ReactArgs),

    /// List comments on a target
    List(list::ListArgs),

    /// List replies to a comment
    Replies(list::RepliesArgs),
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let globals = context::Globals {
        config: cli.config,
        data_dir: cli.data_dir,
        moderators: cli.moderators,
    };

    // Dispatch to command handler
    match cli.command {
        Commands::Init(args) => init::execute(&globals, args),
        Commands::Config(cmd) => config::execute(&globals, cmd),
        Commands::Post(args) => comment::post(&globals, args),
        Commands::Reply(args) => comment::reply(&globals, args),
        Commands::Edit(args) => comment::edit(&globals, args),
        Commands::Delete(args) => comment::delete(&globals, args),
        Commands::Approve(args) => comment::approve(&globals, args),
        Commands::React(args) => react::execute(&globals, args),
        Commands::List(args) => list::list(&globals, args),
        Commands::Replies(args) => list::replies(&globals, args),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
