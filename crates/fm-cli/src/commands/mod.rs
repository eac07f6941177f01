//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod init;
pub mod moderate;
pub mod query;
pub mod submit;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use fm_core::config::Config;
use fm_core::feedback::FeedbackFilter;
use fm_core::types::FeedbackId;
use fm_core::ModerationService;
use fm_storage::FileSystemStorage;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Default directory holding configuration and stored feedback
pub const DEFAULT_STORE_DIR: &str = ".feedback-moderator";

/// feedback-moderator - ham/spam moderation for blog comments and trackbacks
#[derive(Debug, Parser)]
#[command(name = "feedback-moderator")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (default: <store>/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding stored feedback (default: ./.feedback-moderator)
    #[arg(long, global = true, env = "FEEDBACK_MODERATOR_STORE")]
    pub store: Option<PathBuf>,

    /// Use the per-user data directory as the store
    #[arg(long, global = true, conflicts_with = "store")]
    pub user_store: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the store directory and default configuration
    Init(init::InitArgs),

    /// Submit a comment or trackback and classify it
    #[command(subcommand)]
    Submit(submit::SubmitCommand),

    /// Classify stored feedback that is still unclassified
    Classify(moderate::ClassifyArgs),

    /// Confirm presumed ham/spam
    Confirm(moderate::ConfirmArgs),

    /// Mark feedback as ham (moderator override)
    Ham(moderate::MarkArgs),

    /// Mark feedback as spam (moderator override)
    Spam(moderate::MarkArgs),

    /// List stored feedback
    List(query::ListArgs),

    /// Show one feedback item
    Show(query::ShowArgs),

    /// Count feedback per moderation state
    Stats(query::StatsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Resolved global options shared by commands
#[derive(Debug, Clone)]
pub struct Context {
    pub store_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Context {
    fn from_cli(cli: &Cli) -> Self {
        let store_dir = match &cli.store {
            Some(store) => store.clone(),
            None if cli.user_store => FileSystemStorage::default_dir(),
            None => PathBuf::from(DEFAULT_STORE_DIR),
        };
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| store_dir.join("config.toml"));
        Self {
            store_dir,
            config_path,
        }
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_config(&self) -> Result<Config> {
        load_config(&self.config_path)
    }

    /// Open the moderation service over the file store
    pub fn service(&self) -> Result<ModerationService> {
        if !self.store_dir.exists() {
            anyhow::bail!(
                "No store found at {}. Run 'feedback-moderator init' first.",
                self.store_dir.display()
            );
        }
        let config = self.load_config()?;
        let storage = FileSystemStorage::new(&self.store_dir)
            .with_context(|| format!("Failed to open store at {}", self.store_dir.display()))?;
        let service = ModerationService::from_config(Arc::new(storage), &config)?;
        debug!(
            "Opened store {} with classifier '{}'",
            self.store_dir.display(),
            service.engine().classifier().name()
        );
        Ok(service)
    }
}

/// Resolve a full feedback ID or a unique prefix of one
pub fn resolve_id(service: &ModerationService, raw: &str) -> Result<FeedbackId> {
    if let Ok(id) = FeedbackId::from_string(raw) {
        return Ok(id);
    }

    let prefix = raw.trim().to_lowercase();
    if prefix.is_empty() {
        anyhow::bail!("Feedback ID cannot be empty");
    }
    let mut matches = service
        .list(&FeedbackFilter::default())?
        .into_iter()
        .map(|f| f.id)
        .filter(|id| id.to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => anyhow::bail!("Feedback '{}' not found", raw),
        (Some(_), Some(_)) => anyhow::bail!("Feedback ID prefix '{}' is ambiguous", raw),
    }
}

/// Read and validate a TOML configuration file
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = Context::from_cli(&cli);

    match cli.command {
        Commands::Init(args) => init::execute(&ctx, args),
        Commands::Submit(cmd) => submit::execute(&ctx, cmd),
        Commands::Classify(args) => moderate::classify(&ctx, args),
        Commands::Confirm(args) => moderate::confirm(&ctx, args),
        Commands::Ham(args) => moderate::mark(&ctx, args, fm_core::feedback::Verdict::Ham),
        Commands::Spam(args) => moderate::mark(&ctx, args, fm_core::feedback::Verdict::Spam),
        Commands::List(args) => query::list(&ctx, args),
        Commands::Show(args) => query::show(&ctx, args),
        Commands::Stats(args) => query::stats(&ctx, args),
        Commands::Config(cmd) => config::execute(&ctx, cmd),
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_config_path_defaults_into_store() {
        let cli = Cli::try_parse_from(["feedback-moderator", "--store", "/tmp/fm", "stats"]).unwrap();
        let ctx = Context::from_cli(&cli);
        assert_eq!(ctx.config_path, PathBuf::from("/tmp/fm/config.toml"));
    }

    #[test]
    fn test_user_store_uses_data_dir() {
        let cli = Cli::try_parse_from(["feedback-moderator", "--user-store", "stats"]).unwrap();
        let ctx = Context::from_cli(&cli);
        assert_eq!(ctx.store_dir, FileSystemStorage::default_dir());

        let result =
            Cli::try_parse_from(["feedback-moderator", "--user-store", "--store", "x", "stats"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.moderation.max_override_retries, 5);
    }
}
