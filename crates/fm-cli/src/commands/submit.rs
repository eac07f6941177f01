//! Submit command
//!
//! Store a new comment or trackback and run it through the classifier.

use super::Context;
use anyhow::Result;
use clap::{Args, Subcommand};
use fm_core::feedback::FeedbackBuilder;

/// Kinds of feedback that can be submitted
#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Submit a reader comment
    Comment(CommentArgs),

    /// Submit a trackback
    Trackback(TrackbackArgs),
}

/// Arguments for a comment
#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Article the comment belongs to
    #[arg(long)]
    pub article: String,

    /// Commenter name
    #[arg(long)]
    pub author: String,

    /// Comment text
    #[arg(long)]
    pub body: String,

    /// Commenter email
    #[arg(long)]
    pub email: Option<String>,

    /// Commenter website
    #[arg(long)]
    pub url: Option<String>,

    /// Submitter address
    #[arg(long)]
    pub ip: Option<String>,

    /// Submitted by a signed-in blog user
    #[arg(long)]
    pub user: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for a trackback
#[derive(Debug, Args)]
pub struct TrackbackArgs {
    /// Article the trackback points at
    #[arg(long)]
    pub article: String,

    /// Name of the linking blog
    #[arg(long)]
    pub blog_name: String,

    /// Title of the linking entry
    #[arg(long)]
    pub title: String,

    /// URL of the linking entry
    #[arg(long)]
    pub url: String,

    /// Excerpt of the linking entry
    #[arg(long)]
    pub excerpt: String,

    /// Submitter address
    #[arg(long)]
    pub ip: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the submit command
pub fn execute(ctx: &Context, cmd: SubmitCommand) -> Result<()> {
    use colored::Colorize;

    let (builder, as_json) = match cmd {
        SubmitCommand::Comment(args) => {
            let mut builder = FeedbackBuilder::comment(args.article, args.author, args.body);
            if let Some(email) = args.email {
                builder = builder.email(email);
            }
            if let Some(url) = args.url {
                builder = builder.url(url);
            }
            if let Some(ip) = args.ip {
                builder = builder.ip(ip);
            }
            if args.user {
                builder = builder.by_user();
            }
            (builder, args.json)
        }
        SubmitCommand::Trackback(args) => {
            let mut builder = FeedbackBuilder::trackback(
                args.article,
                args.blog_name,
                args.title,
                args.url,
                args.excerpt,
            );
            if let Some(ip) = args.ip {
                builder = builder.ip(ip);
            }
            (builder, args.json)
        }
    };

    let service = ctx.service()?;
    let (feedback, transition) = service.submit(builder.build()?)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&feedback)?);
        return Ok(());
    }

    let visibility = if feedback.is_published() {
        "published".green()
    } else {
        "hidden".red()
    };
    println!(
        "{} {} {} ({}, {})",
        "✓".green(),
        feedback.kind.label(),
        feedback.id.to_string().bold(),
        transition,
        visibility
    );

    Ok(())
}
