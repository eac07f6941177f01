//! Moderation commands
//!
//! Classify, confirm and override stored feedback.

use super::{resolve_id, Context};
use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use fm_core::feedback::{Feedback, ModerationState, Verdict};
use fm_core::{Outcome, Transition};
use indicatif::{ProgressBar, ProgressStyle};

/// Arguments for the classify command
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Feedback IDs (or unique prefixes)
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the confirm command
#[derive(Debug, Args)]
pub struct ConfirmArgs {
    /// Feedback IDs (or unique prefixes)
    #[arg(required_unless_present = "all_presumed", conflicts_with = "all_presumed")]
    pub ids: Vec<String>,

    /// Confirm every presumed ham/spam item
    #[arg(long)]
    pub all_presumed: bool,

    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

/// Arguments for the ham and spam commands
#[derive(Debug, Args)]
pub struct MarkArgs {
    /// Feedback IDs (or unique prefixes)
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Execute the classify command
pub fn classify(ctx: &Context, args: ClassifyArgs) -> Result<()> {
    let service = ctx.service()?;
    for raw in &args.ids {
        let id = resolve_id(&service, raw)?;
        let (feedback, transition) = service.classify(&id)?;
        print_transition(&feedback, &transition);
    }
    Ok(())
}

/// Execute the confirm command
pub fn confirm(ctx: &Context, args: ConfirmArgs) -> Result<()> {
    let service = ctx.service()?;

    if !args.all_presumed {
        for raw in &args.ids {
            let id = resolve_id(&service, raw)?;
            let (feedback, transition) = service.confirm(&id)?;
            print_transition(&feedback, &transition);
        }
        return Ok(());
    }

    let stats = service.stats()?;
    let presumed =
        stats.count(ModerationState::PRESUMED_HAM) + stats.count(ModerationState::PRESUMED_SPAM);

    if presumed == 0 {
        println!("No presumed feedback to confirm.");
        return Ok(());
    }

    if !args.yes {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!("Re-check and confirm {} presumed items?", presumed))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Confirmation cancelled.");
            return Ok(());
        }
    }

    let progress = ProgressBar::new(presumed as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")?.progress_chars("=> "),
    );

    let mut failed = 0;
    let results = service.confirm_all_presumed(|id, total, result| {
        progress.set_length(total as u64);
        progress.set_message(id.short());
        if let Err(e) = result {
            failed += 1;
            progress.println(format!("{} {}: {:#}", "✗".red(), id, e));
        }
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    let settled = results
        .iter()
        .filter(|(_, t)| t.outcome == Outcome::Changed)
        .count();
    let disputed = results
        .iter()
        .filter(|(_, t)| t.outcome == Outcome::Disputed)
        .count();
    let attempted = results.len() + failed;

    println!(
        "{} Confirmed {}, disputed {}, failed {} of {} presumed items.",
        "✓".green(),
        settled.to_string().green(),
        disputed.to_string().yellow(),
        failed.to_string().red(),
        attempted
    );
    if disputed > 0 {
        println!(
            "  {} Disputed items keep their presumed state until a moderator decides.",
            "ℹ".blue()
        );
    }

    Ok(())
}

/// Execute the ham/spam override commands
pub fn mark(ctx: &Context, args: MarkArgs, verdict: Verdict) -> Result<()> {
    let service = ctx.service()?;
    for raw in &args.ids {
        let id = resolve_id(&service, raw)?;
        let (feedback, transition) = match verdict {
            Verdict::Ham => service.mark_as_ham(&id)?,
            Verdict::Spam => service.mark_as_spam(&id)?,
        };
        print_transition(&feedback, &transition);
    }
    Ok(())
}

fn print_transition(feedback: &Feedback, transition: &Transition) {
    let marker = match transition.outcome {
        Outcome::Changed => "✓".green(),
        Outcome::Unchanged => "·".dimmed(),
        Outcome::Fallback => "⚠".yellow(),
        Outcome::Disputed => "?".yellow(),
    };
    println!(
        "{} {} {}",
        marker,
        feedback.id.short(),
        transition
    );
}

/// Colored name of a moderation state
pub fn colored_state(state: ModerationState) -> ColoredString {
    let name = state.as_str();
    match state.verdict() {
        None => name.dimmed(),
        Some(Verdict::Ham) if state.status_confirmed() => name.green(),
        Some(Verdict::Ham) => name.cyan(),
        Some(Verdict::Spam) if state.status_confirmed() => name.red(),
        Some(Verdict::Spam) => name.magenta(),
    }
}
