//! List commands
//!
//! Print comments on a target and replies to a comment.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use commently_core::comment::{ApprovalState, Comment};
use commently_core::query::{ListFilter, Page, PageRequest, SortOrder};
use commently_core::{Actor, CommentId, CommentService, MorphRef};

use super::context::{ActorArgs, Globals};

/// List arguments
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Target entity as kind:id
    pub target: MorphRef,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Oldest first instead of latest first
    #[arg(long)]
    pub oldest: bool,

    /// Only comments written by the acting user or guest
    #[arg(long)]
    pub mine: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Replies arguments
#[derive(Debug, Args)]
pub struct RepliesArgs {
    /// Parent comment
    pub id: CommentId,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub actor: ActorArgs,
}

pub fn list(globals: &Globals, args: ListArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    if (args.oldest || args.mine) && !app.service.config().show_filters {
        anyhow::bail!("--oldest and --mine are unavailable: show_filters is off");
    }

    let filter = ListFilter {
        order: if args.oldest {
            SortOrder::Oldest
        } else {
            SortOrder::Latest
        },
        mine_only: args.mine,
    };
    let request = PageRequest {
        page: args.page,
        per_page: None,
    };
    let page = app
        .service
        .queries()
        .list_comments(&actor, &args.target, request, filter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.is_empty() {
        println!("No comments on {}.", args.target);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} comment(s) on {}", page.total, args.target)
            .bold()
            .underline()
    );
    println!();
    for comment in &page.items {
        print_comment(&app.service, &actor, comment, "  ")?;
    }
    print_footer(&page);
    Ok(())
}

pub fn replies(globals: &Globals, args: RepliesArgs) -> Result<()> {
    let app = globals.open()?;
    let actor = app.actor(&args.actor);

    let request = PageRequest {
        page: args.page,
        per_page: None,
    };
    let page = app.service.queries().list_replies(&actor, args.id, request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.is_empty() {
        println!("No replies to #{}.", args.id);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} reply(ies) to #{}", page.total, args.id)
            .bold()
            .underline()
    );
    println!();
    for reply in &page.items {
        print_comment(&app.service, &actor, reply, "    ")?;
    }
    print_footer(&page);
    Ok(())
}

fn author(comment: &Comment) -> String {
    match &comment.commenter {
        Some(user) => user.to_string(),
        None => format!(
            "{} ({})",
            comment.guest_display_name().unwrap_or("guest"),
            comment.guest_fingerprint().unwrap_or_default()
        ),
    }
}

fn print_comment(
    service: &CommentService,
    actor: &Actor,
    comment: &Comment,
    indent: &str,
) -> Result<()> {
    let when = service
        .config()
        .date_format
        .render(comment.created_at, chrono::Utc::now());

    let mut header = format!(
        "{}{} {} {}",
        indent,
        format!("#{}", comment.id).cyan(),
        author(comment).green(),
        when.dimmed()
    );
    if comment.approval() == ApprovalState::Pending {
        header.push_str(&format!(" {}", "[pending]".yellow()));
    }
    println!("{}", header);
    println!("{}{}", indent, comment.text);

    let counts = service.reactions().counts_by_type(comment.id)?;
    let mut details: Vec<String> = counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{} {}", c.reaction_type, c.count))
        .collect();
    if !comment.is_reply() && service.config().reply.enabled {
        let replies = service.queries().reply_count(actor, comment.id)?;
        if replies > 0 {
            details.push(format!("{} repl{}", replies, if replies == 1 { "y" } else { "ies" }));
        }
    }
    if !details.is_empty() {
        println!("{}{}", indent, details.join("  ").dimmed());
    }
    println!();
    Ok(())
}

fn print_footer<T>(page: &Page<T>) {
    if page.last_page() > 1 {
        println!(
            "{}",
            format!("Page {} of {}", page.page, page.last_page()).dimmed()
        );
    }
}
