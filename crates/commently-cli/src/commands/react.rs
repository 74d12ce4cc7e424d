//! React command

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use commently_core::reaction::ReactionState;
use commently_core::CommentId;

use super::context::{ActorArgs, Globals};

/// React arguments
#[derive(Debug, Args)]
pub struct ReactArgs {
    /// Comment to react to
    pub id: CommentId,

    /// Reaction type, e.g. like
    pub reaction: String,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Execute the react command
pub fn execute(globals: &Globals, args: ReactArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let state = app
        .service
        .toggle_reaction(&actor, args.id, &args.reaction)
        .with_context(|| format!("Failed to react to #{}", args.id))?;

    match state {
        ReactionState::Reacted(kind) => println!("{} Reacted {} to #{}", "✓".green(), kind, args.id),
        ReactionState::None => println!("{} Removed reaction from #{}", "✓".green(), args.id),
    }

    let counts = app.service.reactions().counts_by_type(args.id)?;
    let summary = counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{} {}", c.reaction_type, c.count))
        .collect::<Vec<_>>();
    if !summary.is_empty() {
        println!("  {}", summary.join("  ").dimmed());
    }
    Ok(())
}
