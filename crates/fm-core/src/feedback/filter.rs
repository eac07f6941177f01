//! Listing filters and moderation statistics

use super::model::Feedback;
use super::state::ModerationState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Criteria for listing feedback
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    /// Only this state
    pub state: Option<ModerationState>,
    /// Only published (or only hidden) feedback
    pub published: Option<bool>,
    /// Only "comment" or "trackback"
    pub kind: Option<String>,
    /// Only feedback on this article
    pub article_id: Option<String>,
}

impl FeedbackFilter {
    /// Filter by state
    pub fn with_state(mut self, state: ModerationState) -> Self {
        self.state = Some(state);
        self
    }

    /// Filter by visibility
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    /// Filter by article
    pub fn with_article(mut self, article_id: impl Into<String>) -> Self {
        self.article_id = Some(article_id.into());
        self
    }

    /// Check whether a feedback item matches
    pub fn matches(&self, feedback: &Feedback) -> bool {
        if let Some(state) = self.state {
            if feedback.state != state {
                return false;
            }
        }
        if let Some(published) = self.published {
            if feedback.is_published() != published {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if feedback.kind.label() != kind {
                return false;
            }
        }
        if let Some(article_id) = &self.article_id {
            if &feedback.article_id != article_id {
                return false;
            }
        }
        true
    }
}

/// Counts of feedback per moderation state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationStats {
    /// Count per stored state name
    pub by_state: BTreeMap<String, usize>,
    /// Visible to readers
    pub published: usize,
    /// Total feedback
    pub total: usize,
}

impl ModerationStats {
    /// Tally a set of feedback items
    pub fn collect<'a>(items: impl IntoIterator<Item = &'a Feedback>) -> Self {
        let mut stats = Self::default();
        for state in ModerationState::ALL {
            stats.by_state.insert(state.as_str().to_string(), 0);
        }
        for feedback in items {
            *stats
                .by_state
                .entry(feedback.state.as_str().to_string())
                .or_insert(0) += 1;
            if feedback.is_published() {
                stats.published += 1;
            }
            stats.total += 1;
        }
        stats
    }

    /// Count for a single state
    pub fn count(&self, state: ModerationState) -> usize {
        self.by_state.get(state.as_str()).copied().unwrap_or(0)
    }

    /// Feedback waiting for a moderator or confirmation pass
    pub fn awaiting_review(&self) -> usize {
        self.count(ModerationState::Unclassified)
            + self.count(ModerationState::PRESUMED_HAM)
            + self.count(ModerationState::PRESUMED_SPAM)
    }
}
