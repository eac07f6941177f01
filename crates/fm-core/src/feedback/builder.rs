//! Feedback builder for fluent API

use super::model::{Feedback, FeedbackKind, StateSource};
use super::state::ModerationState;
use crate::error::{ModerationError, Result};
use crate::types::{Extensions, FeedbackId, Guid};
use chrono::Utc;

/// Builder for creating feedback with fluent API
pub struct FeedbackBuilder {
    article_id: String,
    kind: FeedbackKind,
    state: ModerationState,
    author_is_user: bool,
    ip: Option<String>,
}

impl FeedbackBuilder {
    /// Start a reader comment
    pub fn comment(
        article_id: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::from_kind(
            article_id,
            FeedbackKind::Comment {
                author: author.into(),
                email: None,
                url: None,
                body: body.into(),
            },
        )
    }

    /// Start a trackback
    pub fn trackback(
        article_id: impl Into<String>,
        blog_name: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        excerpt: impl Into<String>,
    ) -> Self {
        Self::from_kind(
            article_id,
            FeedbackKind::Trackback {
                blog_name: blog_name.into(),
                title: title.into(),
                url: url.into(),
                excerpt: excerpt.into(),
            },
        )
    }

    /// Start from an existing payload
    pub fn from_kind(article_id: impl Into<String>, kind: FeedbackKind) -> Self {
        Self {
            article_id: article_id.into(),
            kind,
            state: ModerationState::Unclassified,
            author_is_user: false,
            ip: None,
        }
    }

    /// Set the commenter's email (comments only)
    pub fn email(mut self, value: impl Into<String>) -> Self {
        if let FeedbackKind::Comment { email, .. } = &mut self.kind {
            *email = Some(value.into());
        }
        self
    }

    /// Set the commenter's url (comments only; trackbacks always carry one)
    pub fn url(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            FeedbackKind::Comment { url, .. } => *url = Some(value.into()),
            FeedbackKind::Trackback { url, .. } => *url = value.into(),
        }
        self
    }

    /// Set the submitter's address
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Mark as submitted by a signed-in blog user
    pub fn by_user(mut self) -> Self {
        self.author_is_user = true;
        self
    }

    /// Seed a state, for fixtures and imports
    pub fn state(mut self, state: ModerationState) -> Self {
        self.state = state;
        self
    }

    /// Build the feedback
    pub fn build(self) -> Result<Feedback> {
        if self.article_id.trim().is_empty() {
            return Err(ModerationError::Validation(
                "Feedback must belong to an article".to_string(),
            ));
        }

        let (author, body) = match &self.kind {
            FeedbackKind::Comment { author, body, .. } => (author, body),
            FeedbackKind::Trackback {
                blog_name, excerpt, ..
            } => (blog_name, excerpt),
        };
        if body.trim().is_empty() {
            return Err(ModerationError::Validation(
                "Feedback body cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let guid = Guid::derive(&[
            self.kind.label(),
            &self.article_id,
            author,
            body,
            &now.to_rfc3339(),
        ]);
        Ok(Feedback {
            id: FeedbackId::new(),
            guid,
            article_id: self.article_id,
            kind: self.kind,
            state: self.state,
            state_source: StateSource::Initial,
            lock_version: 0,
            author_is_user: self.author_is_user,
            ip: self.ip,
            created_at: now,
            updated_at: now,
            extensions: Extensions::new(),
        })
    }
}
