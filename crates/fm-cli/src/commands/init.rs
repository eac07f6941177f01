//! Init command
//!
//! Create the feedback store and a default configuration.

use super::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use fm_core::config::Config;
use fm_storage::FileSystemStorage;
use std::fs;

/// Arguments for the init command
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Execute the init command
pub fn execute(ctx: &Context, args: InitArgs) -> Result<()> {
    use colored::Colorize;

    println!("Initializing feedback store in {}...", ctx.store_dir.display());

    let storage = FileSystemStorage::new(&ctx.store_dir)
        .with_context(|| format!("Failed to create store at {}", ctx.store_dir.display()))?;
    println!(
        "{} Feedback directory: {}",
        "✓".green(),
        storage.feedback_dir().display()
    );

    if ctx.config_path.exists() && !args.force {
        eprintln!(
            "{} {} already exists. Use --force to overwrite.",
            "⚠".yellow(),
            ctx.config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = ctx.config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&ctx.config_path, generate_config()?).context("Failed to write config.toml")?;
    println!(
        "{} Wrote default configuration to {}",
        "✓".green(),
        ctx.config_path.display()
    );

    println!("\n{}", "Next steps:".bold());
    println!("  1. Review the [classifier] section of the configuration");
    println!(
        "  2. Submit feedback: {}",
        "feedback-moderator submit comment --article a1 --author Piers --body Hello".cyan()
    );

    Ok(())
}

fn generate_config() -> Result<String> {
    let body = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default configuration")?;
    Ok(format!(
        "# feedback-moderator configuration\n\
         #\n\
         # [moderation] reclassify: \"ignore\" leaves classified feedback alone,\n\
         #   \"reject\" makes classify fail on it.\n\
         # [classifier] backend: \"rules\", \"ham\" or \"spam\".\n\n{}",
        body
    ))
}
