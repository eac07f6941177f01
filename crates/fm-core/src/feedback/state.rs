//! Moderation state of a feedback item
//!
//! The five stored states are modelled as "not yet judged" plus a verdict
//! with a confidence tier, so visibility is a total function of the state.

use crate::error::ModerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Legitimate feedback
    Ham,
    /// Unwanted feedback
    Spam,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ham => write!(f, "ham"),
            Verdict::Spam => write!(f, "spam"),
        }
    }
}

/// How settled a verdict is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Settled, either by a confident classifier or by a moderator
    Confirmed,
    /// Tentative, pending confirmation
    Presumed,
}

/// Moderation state of a comment or trackback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ModerationState {
    /// Submitted, not yet classified
    #[default]
    Unclassified,
    /// Judged by a classifier or moderator
    Classified {
        verdict: Verdict,
        confidence: Confidence,
    },
}

impl ModerationState {
    pub const HAM: Self = Self::classified(Verdict::Ham, Confidence::Confirmed);
    pub const PRESUMED_HAM: Self = Self::classified(Verdict::Ham, Confidence::Presumed);
    pub const SPAM: Self = Self::classified(Verdict::Spam, Confidence::Confirmed);
    pub const PRESUMED_SPAM: Self = Self::classified(Verdict::Spam, Confidence::Presumed);

    /// Every state, in display order
    pub const ALL: [Self; 5] = [
        Self::Unclassified,
        Self::HAM,
        Self::PRESUMED_HAM,
        Self::SPAM,
        Self::PRESUMED_SPAM,
    ];

    /// Build a classified state
    pub const fn classified(verdict: Verdict, confidence: Confidence) -> Self {
        Self::Classified {
            verdict,
            confidence,
        }
    }

    /// Visible to readers: ham or presumed ham
    pub fn is_published(&self) -> bool {
        self.verdict() == Some(Verdict::Ham)
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified)
    }

    /// Verdict regardless of confidence
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Unclassified => None,
            Self::Classified { verdict, .. } => Some(*verdict),
        }
    }

    pub fn is_ham(&self) -> bool {
        self.verdict() == Some(Verdict::Ham)
    }

    pub fn is_spam(&self) -> bool {
        self.verdict() == Some(Verdict::Spam)
    }

    /// Tentative state awaiting confirmation
    pub fn is_presumed(&self) -> bool {
        matches!(
            self,
            Self::Classified {
                confidence: Confidence::Presumed,
                ..
            }
        )
    }

    /// Settled ham or spam
    pub fn status_confirmed(&self) -> bool {
        matches!(
            self,
            Self::Classified {
                confidence: Confidence::Confirmed,
                ..
            }
        )
    }

    /// Stored name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Classified {
                verdict: Verdict::Ham,
                confidence: Confidence::Confirmed,
            } => "ham",
            Self::Classified {
                verdict: Verdict::Ham,
                confidence: Confidence::Presumed,
            } => "presumed_ham",
            Self::Classified {
                verdict: Verdict::Spam,
                confidence: Confidence::Confirmed,
            } => "spam",
            Self::Classified {
                verdict: Verdict::Spam,
                confidence: Confidence::Presumed,
            } => "presumed_spam",
        }
    }
}

impl fmt::Display for ModerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationState {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ModerationError::Validation(format!("Unknown moderation state: {}", s)))
    }
}

impl From<ModerationState> for &'static str {
    fn from(state: ModerationState) -> Self {
        state.as_str()
    }
}

impl TryFrom<String> for ModerationState {
    type Error = ModerationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
