//! Classifiers with a predetermined answer

use super::{Classification, Classifier, ClassifierError};
use crate::feedback::{Feedback, Verdict};
use crate::types::FeedbackId;
use std::sync::Mutex;

/// Always returns the same classification
///
/// Keeps a log of moderator reports so callers can see what was fed back.
pub struct FixedClassifier {
    classification: Classification,
    reports: Mutex<Vec<(FeedbackId, Verdict)>>,
}

impl FixedClassifier {
    pub fn new(classification: Classification) -> Self {
        Self {
            classification,
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Confident ham for everything
    pub fn ham() -> Self {
        Self::new(Classification::HAM)
    }

    /// Confident spam for everything
    pub fn spam() -> Self {
        Self::new(Classification::SPAM)
    }

    /// Moderator decisions reported so far
    pub fn reports(&self) -> Vec<(FeedbackId, Verdict)> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        match self.classification.verdict {
            Verdict::Ham => "fixed-ham",
            Verdict::Spam => "fixed-spam",
        }
    }

    fn classify(&self, _feedback: &Feedback) -> Result<Classification, ClassifierError> {
        Ok(self.classification)
    }

    fn report(&self, feedback: &Feedback, verdict: Verdict) -> Result<(), ClassifierError> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push((feedback.id.clone(), verdict));
        }
        Ok(())
    }
}

/// Fails every request, like an unreachable anti-spam service
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Classifier for UnavailableClassifier {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn classify(&self, _feedback: &Feedback) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::Unavailable {
            name: self.name().to_string(),
            reason: self.reason.clone(),
        })
    }

    fn report(&self, _feedback: &Feedback, _verdict: Verdict) -> Result<(), ClassifierError> {
        Err(ClassifierError::Unavailable {
            name: self.name().to_string(),
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackBuilder;

    #[test]
    fn test_fixed_classifier() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Body").build().unwrap();
        let classifier = FixedClassifier::ham();

        assert_eq!(classifier.classify(&feedback).unwrap(), Classification::HAM);
        assert_eq!(classifier.name(), "fixed-ham");

        classifier.report(&feedback, Verdict::Spam).unwrap();
        assert_eq!(classifier.reports(), vec![(feedback.id.clone(), Verdict::Spam)]);
    }

    #[test]
    fn test_unavailable_classifier() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Body").build().unwrap();
        let classifier = UnavailableClassifier::new("connection refused");

        let err = classifier.classify(&feedback).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert!(classifier.report(&feedback, Verdict::Ham).is_err());
    }
}
