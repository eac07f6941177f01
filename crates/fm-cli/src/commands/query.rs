//! Query commands
//!
//! List, show and count stored feedback.

use super::moderate::colored_state;
use super::{resolve_id, Context};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use fm_core::feedback::{Feedback, FeedbackFilter, FeedbackKind, ModerationState};

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only feedback in this state (ham, presumed_ham, spam, presumed_spam, unclassified)
    #[arg(long)]
    pub state: Option<ModerationState>,

    /// Only feedback visible to readers
    #[arg(long, conflicts_with = "hidden")]
    pub published: bool,

    /// Only feedback hidden from readers
    #[arg(long)]
    pub hidden: bool,

    /// Only comments or only trackbacks
    #[arg(long, value_parser = ["comment", "trackback"])]
    pub kind: Option<String>,

    /// Only feedback on this article
    #[arg(long)]
    pub article: Option<String>,

    /// Show at most this many items
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn filter(&self) -> FeedbackFilter {
        let mut filter = FeedbackFilter::default();
        if let Some(state) = self.state {
            filter = filter.with_state(state);
        }
        if self.published {
            filter = filter.with_published(true);
        } else if self.hidden {
            filter = filter.with_published(false);
        }
        if let Some(article) = &self.article {
            filter = filter.with_article(article.clone());
        }
        filter.kind = self.kind.clone();
        filter
    }
}

/// Arguments for the show command
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Feedback ID (or unique prefix)
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub fn list(ctx: &Context, args: ListArgs) -> Result<()> {
    let service = ctx.service()?;
    let mut items = service.list(&args.filter())?;
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No feedback found.");
        return Ok(());
    }

    println!("{}", "Feedback:".bold().underline());
    println!();
    for feedback in &items {
        println!(
            "  {} {:<13} {:<9} {} {}",
            feedback.id.short().green(),
            colored_state(feedback.state),
            feedback.kind.label(),
            feedback.article_id.cyan(),
            truncate(feedback.author(), 24).dimmed()
        );
    }
    println!();
    println!("Total: {} items", items.len());

    Ok(())
}

/// Execute the show command
pub fn show(ctx: &Context, args: ShowArgs) -> Result<()> {
    let service = ctx.service()?;
    let id = resolve_id(&service, &args.id)?;
    let feedback = service.load(&id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&feedback)?);
        return Ok(());
    }

    print_feedback(&feedback);
    Ok(())
}

fn print_feedback(feedback: &Feedback) {
    println!("{}", "Feedback Details".bold().underline());
    println!();
    println!("  ID: {}", feedback.id.to_string().green());
    println!("  GUID: {}", feedback.guid.to_string().dimmed());
    println!("  Article: {}", feedback.article_id.cyan());
    println!(
        "  State: {} (set by {:?}, revision {})",
        colored_state(feedback.state),
        feedback.state_source,
        feedback.lock_version
    );
    println!(
        "  Visible: {}",
        if feedback.is_published() {
            "yes".green()
        } else {
            "no".red()
        }
    );
    if let Some(classifier) = feedback.extensions.classified_by() {
        println!("  Classifier: {}", classifier);
    }
    if let Some(ip) = &feedback.ip {
        println!("  IP: {}", ip);
    }
    if feedback.author_is_user {
        println!("  Author is a signed-in user");
    }
    println!(
        "  Created: {}",
        feedback.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Updated: {}",
        feedback.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!();
    match &feedback.kind {
        FeedbackKind::Comment {
            author,
            email,
            url,
            body,
        } => {
            println!("{}", "Comment".bold());
            println!("  Author: {}", author);
            if let Some(email) = email {
                println!("  Email: {}", email);
            }
            if let Some(url) = url {
                println!("  URL: {}", url);
            }
            println!();
            println!("{}", body);
        }
        FeedbackKind::Trackback {
            blog_name,
            title,
            url,
            excerpt,
        } => {
            println!("{}", "Trackback".bold());
            println!("  Blog: {}", blog_name);
            println!("  Title: {}", title);
            println!("  URL: {}", url);
            println!();
            println!("{}", excerpt);
        }
    }
}

/// Execute the stats command
pub fn stats(ctx: &Context, args: StatsArgs) -> Result<()> {
    let service = ctx.service()?;
    let stats = service.stats()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Moderation Statistics".bold().underline());
    println!();
    for state in ModerationState::ALL {
        println!("  {:<13} {}", colored_state(state), stats.count(state));
    }
    println!();
    println!("  Published: {}", stats.published.to_string().green());
    println!(
        "  Awaiting review: {}",
        stats.awaiting_review().to_string().yellow()
    );
    println!("  Total: {}", stats.total);

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
