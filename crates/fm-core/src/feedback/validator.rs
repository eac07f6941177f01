//! Feedback validation

use super::model::{Feedback, FeedbackKind};
use crate::config::ValidationConfig;
use crate::error::{ModerationError, Result};

/// Maximum body length (default)
pub const MAX_BODY_LENGTH: usize = 10000;

/// Validator for submitted feedback
pub struct FeedbackValidator {
    max_length: usize,
}

impl FeedbackValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            max_length: MAX_BODY_LENGTH,
        }
    }

    /// Create a validator from configuration
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::with_max_length(config.max_body_length)
    }

    /// Create a new validator with custom max length
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Validate body or excerpt text
    pub fn validate_body(&self, body: &str) -> Result<()> {
        let trimmed = body.trim();

        if trimmed.is_empty() {
            return Err(ModerationError::Validation(
                "Feedback body cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > self.max_length {
            return Err(ModerationError::Validation(format!(
                "Feedback body exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        Ok(())
    }

    /// Validate a link supplied with the feedback
    pub fn validate_url(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ModerationError::Validation(format!(
                "URL must start with http:// or https://: {}",
                url
            )))
        }
    }

    /// Validate a complete feedback item
    pub fn validate(&self, feedback: &Feedback) -> Result<()> {
        self.validate_body(feedback.body())?;

        match &feedback.kind {
            FeedbackKind::Comment { author, url, .. } => {
                if author.trim().is_empty() {
                    return Err(ModerationError::Validation(
                        "Comment author cannot be empty".to_string(),
                    ));
                }
                if let Some(url) = url {
                    self.validate_url(url)?;
                }
            }
            FeedbackKind::Trackback {
                blog_name, url, ..
            } => {
                if blog_name.trim().is_empty() {
                    return Err(ModerationError::Validation(
                        "Trackback blog name cannot be empty".to_string(),
                    ));
                }
                self.validate_url(url)?;
            }
        }

        Ok(())
    }
}

impl Default for FeedbackValidator {
    fn default() -> Self {
        Self::new()
    }
}
