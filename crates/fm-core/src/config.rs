//! Configuration management for feedback-moderator

use crate::error::{ModerationError, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Moderation engine settings
    pub moderation: ModerationConfig,
    /// Classifier settings
    pub classifier: ClassifierConfig,
    /// Submission validation settings
    pub validation: ValidationConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let threshold = self.classifier.confidence_threshold;
        if threshold == 0 {
            return Err(ModerationError::Config(
                "classifier.confidence_threshold must be at least 1".to_string(),
            ));
        }
        if self.validation.max_body_length == 0 {
            return Err(ModerationError::Config(
                "validation.max_body_length must be at least 1".to_string(),
            ));
        }
        if self
            .classifier
            .blacklist
            .iter()
            .any(|pattern| pattern.trim().is_empty())
        {
            return Err(ModerationError::Config(
                "classifier.blacklist cannot contain empty patterns".to_string(),
            ));
        }
        Ok(())
    }
}

/// What classify does with feedback that is already classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclassifyPolicy {
    /// Leave it alone and report no change
    #[default]
    Ignore,
    /// Fail with an invalid-transition error
    Reject,
}

/// Moderation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Handling of classify on classified feedback
    pub reclassify: ReclassifyPolicy,
    /// Attempts for a moderator override that keeps hitting save conflicts
    pub max_override_retries: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            reclassify: ReclassifyPolicy::Ignore,
            max_override_retries: 5,
        }
    }
}

/// Which classifier the service uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierBackend {
    /// Built-in heuristics
    #[default]
    Rules,
    /// Trust everything
    Ham,
    /// Hold everything as spam
    Spam,
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Classifier implementation
    pub backend: ClassifierBackend,
    /// Feedback from signed-in users is ham
    pub trust_authenticated_users: bool,
    /// Hold all anonymous feedback as presumed spam
    pub moderate_all: bool,
    /// Links allowed before each extra one counts against the feedback
    pub url_limit: usize,
    /// Spam score at which spam is certain rather than presumed
    pub confidence_threshold: u32,
    /// Case-insensitive substrings that mark spam
    pub blacklist: Vec<String>,
    /// Submitter addresses that mark spam
    pub blocked_ips: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::Rules,
            trust_authenticated_users: true,
            moderate_all: false,
            url_limit: 2,
            confidence_threshold: 3,
            blacklist: vec![
                "viagra".to_string(),
                "casino".to_string(),
                "payday loan".to_string(),
            ],
            blocked_ips: Vec::new(),
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum body/excerpt length in characters
    pub max_body_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_body_length: crate::feedback::validator::MAX_BODY_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.moderation.reclassify, ReclassifyPolicy::Ignore);
        assert_eq!(config.classifier.backend, ClassifierBackend::Rules);
        assert!(config.classifier.trust_authenticated_users);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[moderation]"));
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("reclassify = \"ignore\""));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(
            config.classifier.confidence_threshold,
            config2.classifier.confidence_threshold
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [moderation]
            reclassify = "reject"

            [classifier]
            backend = "spam"
            "#,
        )
        .unwrap();

        assert_eq!(config.moderation.reclassify, ReclassifyPolicy::Reject);
        assert_eq!(config.moderation.max_override_retries, 5);
        assert_eq!(config.classifier.backend, ClassifierBackend::Spam);
        assert_eq!(config.classifier.url_limit, 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.classifier.confidence_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.blacklist.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.max_body_length = 0;
        assert!(matches!(config.validate(), Err(ModerationError::Config(_))));
    }
}
