//! Moderation state machine
//!
//! `CommentModerationEngine` moves a single feedback item between the five
//! moderation states. It mutates the item in memory only; saving is the
//! caller's job.
//!
//! ```text
//!                 classify_content
//! unclassified ──────────────────────┬──> ham ◄──────────┐
//!                                    ├──> presumed_ham ──┘ confirm_classification
//!                                    ├──> spam ◄─────────┐
//!                                    └──> presumed_spam ─┘
//!
//! mark_as_ham / mark_as_spam: any state ──> ham / spam
//! ```

use crate::classifier::Classifier;
use crate::config::ReclassifyPolicy;
use crate::error::{ModerationError, Result};
use crate::feedback::{Confidence, Feedback, ModerationState, StateSource, Verdict};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State given to feedback the classifier could not judge.
///
/// Hidden until someone looks at it: publishing unjudged content is the
/// worse mistake.
pub const FALLBACK_STATE: ModerationState = ModerationState::PRESUMED_SPAM;

/// What an operation did to a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// State moved
    Changed,
    /// Nothing to do
    Unchanged,
    /// Classifier failed; fallback state applied
    Fallback,
    /// Classifier no longer agrees with the presumption; state kept
    Disputed,
}

/// Record of a single state machine step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ModerationState,
    pub to: ModerationState,
    pub outcome: Outcome,
}

impl Transition {
    fn unchanged(state: ModerationState) -> Self {
        Self {
            from: state,
            to: state,
            outcome: Outcome::Unchanged,
        }
    }

    /// Whether the state moved
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Changed => write!(f, "{} -> {}", self.from, self.to),
            Outcome::Unchanged => write!(f, "{} (unchanged)", self.to),
            Outcome::Fallback => write!(f, "{} -> {} (classifier failed)", self.from, self.to),
            Outcome::Disputed => write!(f, "{} (classifier disagrees)", self.to),
        }
    }
}

/// Ham/spam state machine for comments and trackbacks
#[derive(Clone)]
pub struct CommentModerationEngine {
    classifier: Arc<dyn Classifier>,
    reclassify: ReclassifyPolicy,
}

impl CommentModerationEngine {
    /// Create an engine around a classifier
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            reclassify: ReclassifyPolicy::default(),
        }
    }

    /// Set how classify treats already-classified feedback
    pub fn with_reclassify_policy(mut self, policy: ReclassifyPolicy) -> Self {
        self.reclassify = policy;
        self
    }

    /// The classifier in use
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Classify unclassified feedback.
    ///
    /// Classifier failures never surface here; the feedback lands in
    /// [`FALLBACK_STATE`] and the transition reports [`Outcome::Fallback`].
    pub fn classify_content(&self, feedback: &mut Feedback) -> Result<Transition> {
        let from = feedback.state;
        if !from.is_unclassified() {
            return match self.reclassify {
                ReclassifyPolicy::Ignore => {
                    debug!("Feedback {} already {}, not reclassifying", feedback.id, from);
                    Ok(Transition::unchanged(from))
                }
                ReclassifyPolicy::Reject => Err(ModerationError::InvalidTransition {
                    from,
                    operation: "classify",
                }),
            };
        }

        let (to, outcome) = match self.classifier.classify(feedback) {
            Ok(classification) => (classification.state(), Outcome::Changed),
            Err(e) => {
                warn!(
                    "Classifier failed for feedback {}, holding as {}: {}",
                    feedback.id, FALLBACK_STATE, e
                );
                (FALLBACK_STATE, Outcome::Fallback)
            }
        };

        feedback.set_state(to, StateSource::Classifier);
        feedback
            .extensions
            .set_classified_by(self.classifier.name());
        debug!("Classified feedback {}: {} -> {}", feedback.id, from, to);

        Ok(Transition { from, to, outcome })
    }

    /// Settle a presumed verdict if the classifier still agrees.
    ///
    /// Confirmed and unclassified feedback are left alone, as is presumed
    /// feedback whose fresh verdict disagrees or cannot be obtained.
    pub fn confirm_classification(&self, feedback: &mut Feedback) -> Transition {
        let from = feedback.state;
        let presumed = match from {
            ModerationState::Classified {
                verdict,
                confidence: Confidence::Presumed,
            } => verdict,
            _ => return Transition::unchanged(from),
        };

        match self.classifier.classify(feedback) {
            Ok(classification) if classification.verdict == presumed => {
                let to = ModerationState::classified(presumed, Confidence::Confirmed);
                feedback.set_state(to, StateSource::Classifier);
                debug!("Confirmed feedback {}: {} -> {}", feedback.id, from, to);
                Transition {
                    from,
                    to,
                    outcome: Outcome::Changed,
                }
            }
            Ok(classification) => {
                info!(
                    "Feedback {} presumed {} but classifier now says {}; leaving for a moderator",
                    feedback.id, presumed, classification.verdict
                );
                Transition {
                    from,
                    to: from,
                    outcome: Outcome::Disputed,
                }
            }
            Err(e) => {
                warn!("Could not confirm feedback {}: {}", feedback.id, e);
                Transition::unchanged(from)
            }
        }
    }

    /// Moderator override to ham
    pub fn mark_as_ham(&self, feedback: &mut Feedback) -> Transition {
        self.mark(feedback, Verdict::Ham)
    }

    /// Moderator override to spam
    pub fn mark_as_spam(&self, feedback: &mut Feedback) -> Transition {
        self.mark(feedback, Verdict::Spam)
    }

    /// Moderator override to a confirmed verdict, from any state
    pub fn mark(&self, feedback: &mut Feedback, verdict: Verdict) -> Transition {
        let from = feedback.state;
        let to = ModerationState::classified(verdict, Confidence::Confirmed);
        feedback.set_state(to, StateSource::Moderator);

        if from == to {
            return Transition::unchanged(to);
        }

        info!("Feedback {} marked as {} (was {})", feedback.id, verdict, from);
        if let Err(e) = self.classifier.report(feedback, verdict) {
            warn!("Failed to report {} for feedback {}: {}", verdict, feedback.id, e);
        }

        Transition {
            from,
            to,
            outcome: Outcome::Changed,
        }
    }
}

impl fmt::Debug for CommentModerationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentModerationEngine")
            .field("classifier", &self.classifier.name())
            .field("reclassify", &self.reclassify)
            .finish()
    }
}
