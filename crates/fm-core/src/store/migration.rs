//! Feedback file format and schema migration

use crate::error::{ModerationError, Result};
use crate::feedback::Feedback;
use crate::types::ProtocolVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// Stored feedback record with schema version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackFile {
    /// Schema version for migration
    pub schema_version: String,
    /// The feedback data
    pub feedback: Feedback,
    /// Extra fields for forward compatibility
    #[serde(flatten, default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl FeedbackFile {
    /// Wrap feedback with the current schema version
    pub fn new(feedback: Feedback) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            feedback,
            extra: HashMap::new(),
        }
    }

    /// Get the feedback, consuming the file
    pub fn into_feedback(self) -> Feedback {
        self.feedback
    }

    /// Parse schema version
    pub fn parse_version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::parse(&self.schema_version)
    }
}

/// Feedback schema migrator
pub struct FeedbackMigrator;

impl FeedbackMigrator {
    /// Migrate a feedback file to the current schema version
    pub fn migrate(mut file: FeedbackFile) -> Result<FeedbackFile> {
        let version = file
            .parse_version()
            .ok_or_else(|| ModerationError::UnsupportedSchemaVersion(file.schema_version.clone()))?;

        let current = ProtocolVersion::V1_0;
        if !version.is_compatible(&current) {
            return Err(ModerationError::UnsupportedSchemaVersion(format!(
                "{} (expected {}.x)",
                file.schema_version, current.major
            )));
        }

        // Newer 1.x minors only add fields, which land in `extra`
        file.schema_version = CURRENT_SCHEMA_VERSION.to_string();
        Ok(file)
    }

    /// Check if a file needs migration
    pub fn needs_migration(file: &FeedbackFile) -> bool {
        file.schema_version != CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackBuilder, ModerationState};

    fn create_test_file() -> FeedbackFile {
        FeedbackFile::new(FeedbackBuilder::comment("a1", "Bob", "Body").build().unwrap())
    }

    #[test]
    fn test_feedback_file_creation() {
        let file = create_test_file();
        assert_eq!(file.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(!FeedbackMigrator::needs_migration(&file));
    }

    #[test]
    fn test_migrate_minor_version() {
        let mut file = create_test_file();
        file.schema_version = "1.3".to_string();
        assert!(FeedbackMigrator::needs_migration(&file));

        let migrated = FeedbackMigrator::migrate(file).unwrap();
        assert_eq!(migrated.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_incompatible_version() {
        let mut file = create_test_file();
        file.schema_version = "2.0".to_string();
        assert!(matches!(
            FeedbackMigrator::migrate(file),
            Err(ModerationError::UnsupportedSchemaVersion(_))
        ));

        let mut file = create_test_file();
        file.schema_version = "garbage".to_string();
        assert!(FeedbackMigrator::migrate(file).is_err());
    }

    #[test]
    fn test_forward_compatibility() {
        let json = r#"{
            "schema_version": "1.0",
            "feedback": {
                "id": "6f1c2b7e-3d4a-4b5c-8d9e-0f1a2b3c4d5e",
                "guid": "dsafsadffsdsf",
                "article_id": "a1",
                "kind": {
                    "type": "trackback",
                    "blog_name": "Trackback Blog",
                    "title": "Trackback Entry",
                    "url": "http://www.example.com",
                    "excerpt": "This is an excerpt"
                },
                "state": "ham",
                "created_at": "2024-12-31T12:00:00Z",
                "updated_at": "2024-12-31T12:00:00Z"
            },
            "future_field": "some value"
        }"#;

        let file: FeedbackFile = serde_json::from_str(json).unwrap();
        assert!(file.extra.contains_key("future_field"));

        let feedback = file.into_feedback();
        assert_eq!(feedback.state, ModerationState::HAM);
        assert_eq!(feedback.lock_version, 0);
        assert!(!feedback.author_is_user);
    }
}
