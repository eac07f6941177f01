//! Feedback data models

use super::state::ModerationState;
use crate::types::{Extensions, FeedbackId, Guid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment or trackback attached to an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Unique feedback identifier
    pub id: FeedbackId,
    /// Content fingerprint
    pub guid: Guid,
    /// Article this feedback belongs to
    pub article_id: String,
    /// Comment or trackback payload
    pub kind: FeedbackKind,
    /// Moderation state
    #[serde(default)]
    pub state: ModerationState,
    /// Who set the current state
    #[serde(default)]
    pub state_source: StateSource,
    /// Optimistic lock counter, bumped by storage on every save
    #[serde(default)]
    pub lock_version: u64,
    /// Submitted by a signed-in blog user
    #[serde(default)]
    pub author_is_user: bool,
    /// Remote address of the submitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// When the feedback was submitted
    pub created_at: DateTime<Utc>,
    /// When the feedback was last changed
    pub updated_at: DateTime<Utc>,
    /// Extensions for future compatibility
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl Feedback {
    /// Visible to readers
    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }

    pub fn is_unclassified(&self) -> bool {
        self.state.is_unclassified()
    }

    /// Change state, recording who changed it
    pub fn set_state(&mut self, state: ModerationState, source: StateSource) {
        self.state = state;
        self.state_source = source;
        self.updated_at = Utc::now();
    }

    /// Text the classifier should judge
    pub fn body(&self) -> &str {
        match &self.kind {
            FeedbackKind::Comment { body, .. } => body,
            FeedbackKind::Trackback { excerpt, .. } => excerpt,
        }
    }

    /// Display name of whoever left the feedback
    pub fn author(&self) -> &str {
        match &self.kind {
            FeedbackKind::Comment { author, .. } => author,
            FeedbackKind::Trackback { blog_name, .. } => blog_name,
        }
    }

    /// Link supplied with the feedback, if any
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            FeedbackKind::Comment { url, .. } => url.as_deref(),
            FeedbackKind::Trackback { url, .. } => Some(url),
        }
    }

    /// Count of links in the body plus the supplied url
    pub fn link_count(&self) -> usize {
        let in_body = self
            .body()
            .split_whitespace()
            .filter(|word| word.contains("http://") || word.contains("https://"))
            .count();
        in_body + usize::from(self.url().is_some())
    }
}

/// Payload of a feedback item; opaque to the moderation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Reader comment
    Comment {
        author: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        body: String,
    },
    /// Ping from another blog
    Trackback {
        blog_name: String,
        title: String,
        url: String,
        excerpt: String,
    },
}

impl FeedbackKind {
    /// Short label for listings
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackKind::Comment { .. } => "comment",
            FeedbackKind::Trackback { .. } => "trackback",
        }
    }
}

/// Origin of the current moderation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSource {
    /// Never changed since submission
    #[default]
    Initial,
    /// Set by automatic classification or confirmation
    Classifier,
    /// Set by a moderator override
    Moderator,
}
