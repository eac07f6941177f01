//! Config command
//!
//! Inspect, validate and reset feedback-moderator configuration.

use super::{load_config, Context};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use colored::Colorize;
use fm_core::config::Config;
use std::fs;

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

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command
pub fn execute(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(ctx, json),
        ConfigCommand::Validate => validate_config(ctx),
        ConfigCommand::Reset { force } => reset_config(ctx, force),
    }
}

fn show_config(ctx: &Context, as_json: bool) -> Result<()> {
    let config = ctx.load_config()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if ctx.config_path.exists() {
        println!("{}", ctx.config_path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults, no configuration file)".dimmed());
    }
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    if !ctx.config_path.exists() {
        anyhow::bail!(
            "Configuration not found at {}. Run '{}' to create it.",
            ctx.config_path.display(),
            "feedback-moderator init"
        );
    }

    let config = load_config(&ctx.config_path)?;
    println!("{} Configuration is valid", "✓".green());
    println!(
        "  Classifier: {:?}, threshold {}, {} blacklist patterns",
        config.classifier.backend,
        config.classifier.confidence_threshold,
        config.classifier.blacklist.len()
    );
    println!(
        "  Reclassify: {:?}, override retries {}",
        config.moderation.reclassify, config.moderation.max_override_retries
    );

    Ok(())
}

fn reset_config(ctx: &Context, force: bool) -> Result<()> {
    let config_path = &ctx.config_path;

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)
            .with_context(|| format!("Failed to back up {}", config_path.display()))?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, toml::to_string_pretty(&Config::default())?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Configuration reset to defaults.", "✓".green());

    Ok(())
}
