//! Classifier abstraction
//!
//! The moderation engine never decides ham or spam itself. It asks a
//! `Classifier` for a verdict and a confidence tier, and maps that onto a
//! moderation state. Where the line between a confident and a tentative
//! verdict falls is the classifier's policy, not the engine's.

mod fixed;
mod rules;

pub use fixed::{FixedClassifier, UnavailableClassifier};
pub use rules::RuleClassifier;

use crate::config::{ClassifierBackend, ClassifierConfig};
use crate::feedback::{Confidence, Feedback, ModerationState, Verdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A classifier's judgement of one feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,
    pub confidence: Confidence,
}

impl Classification {
    pub const HAM: Self = Self::new(Verdict::Ham, Confidence::Confirmed);
    pub const SPAM: Self = Self::new(Verdict::Spam, Confidence::Confirmed);

    pub const fn new(verdict: Verdict, confidence: Confidence) -> Self {
        Self {
            verdict,
            confidence,
        }
    }

    /// Confident verdict
    pub const fn certain(verdict: Verdict) -> Self {
        Self::new(verdict, Confidence::Confirmed)
    }

    /// Tentative verdict
    pub const fn presumed(verdict: Verdict) -> Self {
        Self::new(verdict, Confidence::Presumed)
    }

    /// The moderation state this judgement leads to
    pub fn state(&self) -> ModerationState {
        ModerationState::classified(self.verdict, self.confidence)
    }
}

/// Failures a classifier can report
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Backing service could not be reached
    #[error("classifier '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    /// Classifier refused the input
    #[error("classifier '{name}' rejected feedback: {reason}")]
    Rejected { name: String, reason: String },
}

impl From<ClassifierError> for crate::ModerationError {
    fn from(err: ClassifierError) -> Self {
        crate::ModerationError::ClassifierUnavailable(err.to_string())
    }
}

/// Trait for ham/spam classifiers
pub trait Classifier: Send + Sync {
    /// Name recorded on classified feedback
    fn name(&self) -> &str;

    /// Judge a feedback item
    fn classify(&self, feedback: &Feedback) -> Result<Classification, ClassifierError>;

    /// Learn from a moderator's decision. Default ignores it.
    fn report(&self, _feedback: &Feedback, _verdict: Verdict) -> Result<(), ClassifierError> {
        Ok(())
    }
}

/// Build the classifier selected in configuration
pub fn from_config(config: &ClassifierConfig) -> Arc<dyn Classifier> {
    match config.backend {
        ClassifierBackend::Rules => Arc::new(RuleClassifier::new(config.clone())),
        ClassifierBackend::Ham => Arc::new(FixedClassifier::new(Classification::HAM)),
        ClassifierBackend::Spam => Arc::new(FixedClassifier::new(Classification::SPAM)),
    }
}
