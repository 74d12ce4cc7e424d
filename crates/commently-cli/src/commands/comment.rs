//! Comment commands
//!
//! Post, reply, edit, delete and moderate comments.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use commently_core::comment::{ApprovalState, Comment};
use commently_core::{CommentId, MorphRef};

use super::context::{ActorArgs, Globals};

/// Post arguments
#[derive(Debug, Args)]
pub struct PostArgs {
    /// Target entity as kind:id, e.g. posts:1
    pub target: MorphRef,

    /// Comment text
    pub text: String,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Reply arguments
#[derive(Debug, Args)]
pub struct ReplyArgs {
    /// Comment to reply to
    pub parent: CommentId,

    /// Reply text
    pub text: String,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Edit arguments
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Comment to edit
    pub id: CommentId,

    /// New text
    pub text: String,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Delete arguments
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Comment to delete
    pub id: CommentId,

    /// Skip confirmation
    #[arg(long, short)]
    pub yes: bool,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Approve arguments
#[derive(Debug, Args)]
pub struct ApproveArgs {
    /// Comment to moderate
    pub id: CommentId,

    /// Send the comment back to pending instead
    #[arg(long)]
    pub unapprove: bool,

    #[command(flatten)]
    pub actor: ActorArgs,
}

pub fn post(globals: &Globals, args: PostArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    // The CLI stands in for the host application, so any target it names exists
    app.service.register_commentable(&args.target)?;

    let comment = app
        .service
        .create_comment(&actor, &args.target, &args.text, None)
        .with_context(|| format!("Failed to comment on {}", args.target))?;

    print_created("comment", &comment);
    Ok(())
}

pub fn reply(globals: &Globals, args: ReplyArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let reply = app
        .service
        .create_reply(&actor, args.parent, &args.text, None)
        .with_context(|| format!("Failed to reply to #{}", args.parent))?;

    print_created("reply", &reply);
    Ok(())
}

pub fn edit(globals: &Globals, args: EditArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let comment = app
        .service
        .update_comment(&actor, args.id, &args.text)
        .with_context(|| format!("Failed to edit #{}", args.id))?;

    println!("{} Updated #{}", "✓".green(), comment.id);
    if comment.approval() == ApprovalState::Pending {
        println!("  {}", "Awaiting approval again".yellow());
    }
    Ok(())
}

pub fn delete(globals: &Globals, args: DeleteArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let comment = app.service.queries().find(args.id)?;
    app.service.policies().check_delete(&actor, &comment)?;

    if !args.yes {
        use dialoguer::Confirm;

        let replies = app.service.queries().reply_count(&actor, args.id)?;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete #{} and its {} replies?",
                args.id, replies
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    let outcome = app.service.delete_comment(&actor, args.id)?;
    println!(
        "{} Deleted {} comment(s) and {} reaction(s)",
        "✓".green(),
        outcome.comment_ids.len(),
        outcome.reactions_removed
    );
    Ok(())
}

pub fn approve(globals: &Globals, args: ApproveArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let comment = if args.unapprove {
        app.service.unapprove(&actor, args.id)?
    } else {
        app.service.approve(&actor, args.id)?
    };

    println!("{} #{} is now {}", "✓".green(), comment.id, comment.approval());
    Ok(())
}

fn print_created(kind: &str, comment: &Comment) {
    println!("{} Posted {} #{}", "✓".green(), kind, comment.id);
    if comment.approval() == ApprovalState::Pending {
        println!("  {}", "Awaiting approval".yellow());
    }
}
