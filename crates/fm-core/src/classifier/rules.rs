//! Built-in heuristic classifier

use super::{Classification, Classifier, ClassifierError};
use crate::config::ClassifierConfig;
use crate::feedback::{Feedback, Verdict};
use tracing::trace;

/// Score added per blacklist pattern found
const BLACKLIST_WEIGHT: u32 = 2;

/// Scores feedback against blacklists, link counts and blocked addresses
///
/// Signed-in users are trusted outright. Anonymous feedback with a zero
/// score is presumed ham; any positive score makes it spam, confirmed once
/// the score reaches `confidence_threshold`. With `moderate_all` set,
/// anonymous feedback below the threshold is held as presumed spam; a score
/// at the threshold is still confirmed spam.
pub struct RuleClassifier {
    config: ClassifierConfig,
    blacklist: Vec<String>,
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let blacklist = config
            .blacklist
            .iter()
            .map(|pattern| pattern.trim().to_lowercase())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self { config, blacklist }
    }

    /// Spam score for a feedback item
    pub fn score(&self, feedback: &Feedback) -> u32 {
        let haystack = format!(
            "{}\n{}\n{}",
            feedback.author(),
            feedback.body(),
            feedback.url().unwrap_or_default()
        )
        .to_lowercase();

        let blacklist_hits = self
            .blacklist
            .iter()
            .filter(|pattern| haystack.contains(pattern.as_str()))
            .count();
        let blacklist_hits = u32::try_from(blacklist_hits).unwrap_or(u32::MAX);

        let extra_links = feedback.link_count().saturating_sub(self.config.url_limit);
        let extra_links = u32::try_from(extra_links).unwrap_or(u32::MAX);

        let blocked_ip = feedback
            .ip
            .as_deref()
            .map(|ip| self.config.blocked_ips.iter().any(|blocked| blocked == ip))
            .unwrap_or(false);

        // Saturating, so a blocked address always reaches the threshold
        let mut score = blacklist_hits
            .saturating_mul(BLACKLIST_WEIGHT)
            .saturating_add(extra_links);
        if blocked_ip {
            score = score.saturating_add(self.config.confidence_threshold);
        }

        trace!(
            "Scored feedback {}: blacklist={} extra_links={} blocked_ip={} score={}",
            feedback.id,
            blacklist_hits,
            extra_links,
            blocked_ip,
            score
        );
        score
    }
}

impl Classifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn classify(&self, feedback: &Feedback) -> Result<Classification, ClassifierError> {
        if feedback.author_is_user && self.config.trust_authenticated_users {
            return Ok(Classification::certain(Verdict::Ham));
        }

        let score = self.score(feedback);
        let classification = if score >= self.config.confidence_threshold {
            Classification::certain(Verdict::Spam)
        } else if score > 0 || self.config.moderate_all {
            Classification::presumed(Verdict::Spam)
        } else {
            Classification::presumed(Verdict::Ham)
        };
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackBuilder, ModerationState};

    fn classify(config: ClassifierConfig, feedback: &Feedback) -> ModerationState {
        RuleClassifier::new(config).classify(feedback).unwrap().state()
    }

    #[test]
    fn test_clean_comment_is_presumed_ham() {
        let feedback = FeedbackBuilder::comment("a1", "Piers", "Nice post")
            .url("http://fakeurl.com")
            .build()
            .unwrap();
        assert_eq!(
            classify(ClassifierConfig::default(), &feedback),
            ModerationState::PRESUMED_HAM
        );
    }

    #[test]
    fn test_signed_in_user_is_ham() {
        let feedback = FeedbackBuilder::comment("a1", "admin", "cheap casino viagra")
            .by_user()
            .build()
            .unwrap();
        assert_eq!(
            classify(ClassifierConfig::default(), &feedback),
            ModerationState::HAM
        );

        let config = ClassifierConfig {
            trust_authenticated_users: false,
            ..Default::default()
        };
        assert_eq!(classify(config, &feedback), ModerationState::SPAM);
    }

    #[test]
    fn test_single_blacklist_hit_is_presumed_spam() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Visit my Casino")
            .build()
            .unwrap();
        assert_eq!(
            classify(ClassifierConfig::default(), &feedback),
            ModerationState::PRESUMED_SPAM
        );
    }

    #[test]
    fn test_many_signals_are_spam() {
        let feedback = FeedbackBuilder::comment(
            "a1",
            "Bob",
            "casino http://a.example http://b.example http://c.example",
        )
        .url("http://d.example")
        .build()
        .unwrap();
        let classifier = RuleClassifier::new(ClassifierConfig::default());
        assert_eq!(classifier.score(&feedback), 2 + 2);
        assert_eq!(
            classifier.classify(&feedback).unwrap(),
            Classification::SPAM
        );
    }

    #[test]
    fn test_blocked_ip_is_spam() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Hello")
            .ip("192.0.2.7")
            .build()
            .unwrap();
        let config = ClassifierConfig {
            blocked_ips: vec!["192.0.2.7".to_string()],
            ..Default::default()
        };
        assert_eq!(classify(config, &feedback), ModerationState::SPAM);
    }

    #[test]
    fn test_moderate_all_holds_clean_feedback() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Hello").build().unwrap();
        let config = ClassifierConfig {
            moderate_all: true,
            ..Default::default()
        };
        assert_eq!(classify(config, &feedback), ModerationState::PRESUMED_SPAM);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "Visit my casino")
            .build()
            .unwrap();
        let config = ClassifierConfig {
            confidence_threshold: 2,
            ..Default::default()
        };
        assert_eq!(classify(config, &feedback), ModerationState::SPAM);
    }

    #[test]
    fn test_huge_threshold_keeps_blocked_ip_hidden() {
        let feedback = FeedbackBuilder::comment(
            "a1",
            "Bob",
            "casino http://a.example http://b.example http://c.example",
        )
        .ip("192.0.2.7")
        .build()
        .unwrap();
        let config = ClassifierConfig {
            confidence_threshold: u32::MAX,
            blocked_ips: vec!["192.0.2.7".to_string()],
            ..Default::default()
        };
        let classifier = RuleClassifier::new(config);
        assert_eq!(classifier.score(&feedback), u32::MAX);

        let state = classifier.classify(&feedback).unwrap().state();
        assert_eq!(state, ModerationState::SPAM);
        assert!(!state.is_published());
    }

    #[test]
    fn test_moderate_all_keeps_confident_spam() {
        let feedback = FeedbackBuilder::comment("a1", "Bob", "casino viagra")
            .build()
            .unwrap();
        let config = ClassifierConfig {
            moderate_all: true,
            ..Default::default()
        };
        assert_eq!(classify(config, &feedback), ModerationState::SPAM);
    }
}
