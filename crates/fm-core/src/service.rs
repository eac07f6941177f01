//! Moderation service: the engine wired to storage
//!
//! Every operation loads the feedback, runs one engine step and saves the
//! result with an optimistic lock check. On a conflict the two kinds of
//! operation behave differently:
//!
//! - automatic steps (classify, confirm) reload and re-run. If a moderator
//!   got there first the reloaded record is no longer unclassified or
//!   presumed, so the re-run is a no-op and the moderator's state stands.
//! - moderator overrides reload and reapply, up to `max_override_retries`
//!   times, so they land on top of whatever the classifier wrote.

use crate::classifier::{self, Classifier};
use crate::config::Config;
use crate::engine::{CommentModerationEngine, Transition};
use crate::error::{ModerationError, Result};
use crate::feedback::{Feedback, FeedbackFilter, FeedbackValidator, ModerationStats, Verdict};
use crate::store::FeedbackStorage;
use crate::types::FeedbackId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Attempts for classify/confirm before giving up on a contended record
const AUTOMATIC_ATTEMPTS: u32 = 3;

/// Default attempts for a moderator override
const DEFAULT_OVERRIDE_RETRIES: u32 = 5;

/// Moderation operations over stored feedback
pub struct ModerationService {
    /// Storage backend
    storage: Arc<dyn FeedbackStorage>,
    /// State machine
    engine: CommentModerationEngine,
    /// Submission checks
    validator: FeedbackValidator,
    /// Attempts for a moderator override
    max_override_retries: u32,
}

impl ModerationService {
    /// Create a service with the given storage and classifier
    pub fn new(storage: impl FeedbackStorage + 'static, classifier: Arc<dyn Classifier>) -> Self {
        Self::with_storage(Arc::new(storage), classifier)
    }

    /// Create a service with shared storage
    pub fn with_storage(storage: Arc<dyn FeedbackStorage>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            storage,
            engine: CommentModerationEngine::new(classifier),
            validator: FeedbackValidator::new(),
            max_override_retries: DEFAULT_OVERRIDE_RETRIES,
        }
    }

    /// Create a service from configuration
    pub fn from_config(storage: Arc<dyn FeedbackStorage>, config: &Config) -> Result<Self> {
        config.validate()?;
        let engine = CommentModerationEngine::new(classifier::from_config(&config.classifier))
            .with_reclassify_policy(config.moderation.reclassify);

        Ok(Self {
            storage,
            engine,
            validator: FeedbackValidator::from_config(&config.validation),
            max_override_retries: config.moderation.max_override_retries.max(1),
        })
    }

    /// The state machine in use
    pub fn engine(&self) -> &CommentModerationEngine {
        &self.engine
    }

    /// Validate, store and classify new feedback
    pub fn submit(&self, feedback: Feedback) -> Result<(Feedback, Transition)> {
        self.validator.validate(&feedback)?;
        let stored = self.storage.insert(&feedback)?;
        debug!("Stored {} {}", stored.kind.label(), stored.id);
        self.classify(&stored.id)
    }

    /// Classify stored feedback
    pub fn classify(&self, id: &FeedbackId) -> Result<(Feedback, Transition)> {
        self.apply_automatic(id, |engine, feedback| engine.classify_content(feedback))
    }

    /// Confirm a presumed classification
    pub fn confirm(&self, id: &FeedbackId) -> Result<(Feedback, Transition)> {
        self.apply_automatic(id, |engine, feedback| {
            Ok(engine.confirm_classification(feedback))
        })
    }

    /// Confirm every presumed feedback item, skipping ones that fail.
    ///
    /// `on_item` is called after each attempt with the feedback id, the
    /// number of items in the pass and the attempt's result.
    pub fn confirm_all_presumed<F>(&self, mut on_item: F) -> Result<Vec<(Feedback, Transition)>>
    where
        F: FnMut(&FeedbackId, usize, &Result<(Feedback, Transition)>),
    {
        let presumed: Vec<FeedbackId> = self
            .storage
            .list()?
            .into_iter()
            .filter(|f| f.state.is_presumed())
            .map(|f| f.id)
            .collect();

        let total = presumed.len();
        let mut results = Vec::with_capacity(total);
        for id in presumed {
            let result = self.confirm(&id);
            on_item(&id, total, &result);
            match result {
                Ok(result) => results.push(result),
                Err(e) => warn!("Skipping feedback {}: {}", id, e),
            }
        }
        Ok(results)
    }

    /// Moderator override to ham
    pub fn mark_as_ham(&self, id: &FeedbackId) -> Result<(Feedback, Transition)> {
        self.apply_override(id, Verdict::Ham)
    }

    /// Moderator override to spam
    pub fn mark_as_spam(&self, id: &FeedbackId) -> Result<(Feedback, Transition)> {
        self.apply_override(id, Verdict::Spam)
    }

    /// Load feedback by ID
    pub fn load(&self, id: &FeedbackId) -> Result<Feedback> {
        self.storage.load(id)
    }

    /// Check if feedback exists
    pub fn exists(&self, id: &FeedbackId) -> bool {
        self.storage.exists(id)
    }

    /// List matching feedback, oldest first
    pub fn list(&self, filter: &FeedbackFilter) -> Result<Vec<Feedback>> {
        let mut items: Vec<Feedback> = self
            .storage
            .list()?
            .into_iter()
            .filter(|f| filter.matches(f))
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    /// Counts per state
    pub fn stats(&self) -> Result<ModerationStats> {
        Ok(ModerationStats::collect(&self.storage.list()?))
    }

    /// Get access to the underlying storage
    pub fn storage(&self) -> &dyn FeedbackStorage {
        self.storage.as_ref()
    }

    fn apply_automatic<F>(&self, id: &FeedbackId, step: F) -> Result<(Feedback, Transition)>
    where
        F: Fn(&CommentModerationEngine, &mut Feedback) -> Result<Transition>,
    {
        let mut last_conflict = None;
        for attempt in 1..=AUTOMATIC_ATTEMPTS {
            let mut feedback = self.storage.load(id)?;
            let transition = step(&self.engine, &mut feedback)?;
            if !transition.changed() {
                return Ok((feedback, transition));
            }

            match self.storage.save(&feedback) {
                Ok(saved) => return Ok((saved, transition)),
                Err(e) if e.is_conflict() => {
                    debug!(
                        "Feedback {} changed underneath classification (attempt {}), reloading",
                        id, attempt
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(conflict_or_not_found(last_conflict, id))
    }

    fn apply_override(&self, id: &FeedbackId, verdict: Verdict) -> Result<(Feedback, Transition)> {
        let mut last_conflict = None;
        for attempt in 1..=self.max_override_retries {
            let mut feedback = self.storage.load(id)?;
            let transition = self.engine.mark(&mut feedback, verdict);

            match self.storage.save(&feedback) {
                Ok(saved) => return Ok((saved, transition)),
                Err(e) if e.is_conflict() => {
                    warn!(
                        "Override of feedback {} to {} conflicted (attempt {}), reapplying",
                        id, verdict, attempt
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(conflict_or_not_found(last_conflict, id))
    }
}

fn conflict_or_not_found(last: Option<ModerationError>, id: &FeedbackId) -> ModerationError {
    last.map(|e| e.with_context(format!("Gave up updating feedback {}", id)))
        .unwrap_or_else(|| ModerationError::FeedbackNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, FixedClassifier, UnavailableClassifier};
    use crate::config::ReclassifyPolicy;
    use crate::engine::Outcome;
    use crate::feedback::{FeedbackBuilder, ModerationState, StateSource};
    use crate::store::MemoryStorage;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn create_service(classifier: impl Classifier + 'static) -> ModerationService {
        ModerationService::new(MemoryStorage::new(), Arc::new(classifier))
    }

    fn comment() -> Feedback {
        FeedbackBuilder::comment("article-1", "Piers", "Body")
            .build()
            .unwrap()
    }

    /// Stores a feedback item without classifying it
    fn insert_unclassified(service: &ModerationService) -> FeedbackId {
        service.storage().insert(&comment()).unwrap().id
    }

    #[test]
    fn test_ham_all_the_way() {
        let service = create_service(FixedClassifier::ham());
        let id = insert_unclassified(&service);
        assert!(service.load(&id).unwrap().is_unclassified());

        let (feedback, _) = service.classify(&id).unwrap();
        assert!(feedback.is_published());

        let reloaded = service.load(&id).unwrap();
        assert_eq!(reloaded.state, ModerationState::HAM);

        let (confirmed, _) = service.confirm(&id).unwrap();
        assert!(confirmed.is_published());
    }

    #[test]
    fn test_spam_all_the_way() {
        let service = create_service(FixedClassifier::spam());
        let id = insert_unclassified(&service);

        let (feedback, _) = service.classify(&id).unwrap();
        assert!(!feedback.is_published());

        let reloaded = service.load(&id).unwrap();
        assert_eq!(reloaded.state, ModerationState::SPAM);

        let (confirmed, _) = service.confirm(&id).unwrap();
        assert!(!confirmed.is_published());
    }

    #[test]
    fn test_submit_classifies() {
        let service = create_service(FixedClassifier::new(Classification::presumed(Verdict::Ham)));
        let (feedback, transition) = service.submit(comment()).unwrap();

        assert_eq!(transition.from, ModerationState::Unclassified);
        assert_eq!(feedback.state, ModerationState::PRESUMED_HAM);
        assert_eq!(feedback.lock_version, 1);
    }

    #[test]
    fn test_submit_validates() {
        let service = create_service(FixedClassifier::ham());
        let bad = FeedbackBuilder::comment("a1", "Bob", "Body")
            .url("not a url")
            .build()
            .unwrap();

        assert!(matches!(
            service.submit(bad),
            Err(ModerationError::Validation(_))
        ));
        assert!(service.list(&FeedbackFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_submit_with_unavailable_classifier_hides_feedback() {
        let service = create_service(UnavailableClassifier::new("timeout"));
        let (feedback, transition) = service.submit(comment()).unwrap();

        assert_eq!(transition.outcome, Outcome::Fallback);
        assert_eq!(feedback.state, ModerationState::PRESUMED_SPAM);
        assert_eq!(
            service.load(&feedback.id).unwrap().state,
            ModerationState::PRESUMED_SPAM
        );
    }

    #[test]
    fn test_unchanged_steps_do_not_save() {
        let service = create_service(FixedClassifier::ham());
        let (feedback, _) = service.submit(comment()).unwrap();

        let (again, transition) = service.classify(&feedback.id).unwrap();
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(again.lock_version, feedback.lock_version);
    }

    #[test]
    fn test_overrides_persist() {
        let service = create_service(FixedClassifier::new(Classification::presumed(Verdict::Spam)));
        let (feedback, _) = service.submit(comment()).unwrap();
        assert!(!feedback.is_published());

        let (marked, _) = service.mark_as_ham(&feedback.id).unwrap();
        assert!(marked.is_published());

        let reloaded = service.load(&feedback.id).unwrap();
        assert_eq!(reloaded.state, ModerationState::HAM);
        assert_eq!(reloaded.state_source, StateSource::Moderator);
    }

    #[test]
    fn test_missing_feedback() {
        let service = create_service(FixedClassifier::ham());
        let id = FeedbackId::new();

        assert!(matches!(
            service.classify(&id),
            Err(ModerationError::FeedbackNotFound(_))
        ));
        assert!(matches!(
            service.mark_as_spam(&id),
            Err(ModerationError::FeedbackNotFound(_))
        ));
    }

    #[test]
    fn test_reject_policy_from_config() {
        let mut config = Config::default();
        config.moderation.reclassify = ReclassifyPolicy::Reject;
        let service = ModerationService::from_config(Arc::new(MemoryStorage::new()), &config).unwrap();

        let (feedback, _) = service.submit(comment()).unwrap();
        assert!(matches!(
            service.classify(&feedback.id),
            Err(ModerationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = Config::default();
        config.classifier.confidence_threshold = 0;
        assert!(ModerationService::from_config(Arc::new(MemoryStorage::new()), &config).is_err());
    }

    #[test]
    fn test_confirm_all_presumed() {
        let service = create_service(FixedClassifier::new(Classification::presumed(Verdict::Spam)));
        service.submit(comment()).unwrap();
        service.submit(comment()).unwrap();
        let (held, _) = service.submit(comment()).unwrap();
        service.mark_as_ham(&held.id).unwrap();

        // Presumed-spam classifier agrees with presumed spam, so both settle
        let mut seen = Vec::new();
        let results = service
            .confirm_all_presumed(|id, total, result| {
                assert_eq!(total, 2);
                assert!(result.is_ok());
                seen.push(id.clone());
            })
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains(&held.id));
        assert!(results.iter().all(|(f, _)| f.state == ModerationState::SPAM));

        let stats = service.stats().unwrap();
        assert_eq!(stats.count(ModerationState::SPAM), 2);
        assert_eq!(stats.count(ModerationState::HAM), 1);
        assert_eq!(stats.published, 1);
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let service = create_service(FixedClassifier::ham());
        let (first, _) = service.submit(comment()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let (second, _) = service.submit(comment()).unwrap();
        service.mark_as_spam(&second.id).unwrap();

        let all = service.list(&FeedbackFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);

        let published = service
            .list(&FeedbackFilter::default().with_published(true))
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, first.id);
    }

    /// Lets a moderator write land between an automatic step's load and save
    struct RacingStorage {
        inner: MemoryStorage,
        raced: AtomicBool,
        moderator_verdict: ModerationState,
    }

    impl FeedbackStorage for RacingStorage {
        fn insert(&self, feedback: &Feedback) -> Result<Feedback> {
            self.inner.insert(feedback)
        }

        fn save(&self, feedback: &Feedback) -> Result<Feedback> {
            if feedback.state_source == StateSource::Classifier
                && !self.raced.swap(true, Ordering::SeqCst)
            {
                let mut theirs = self.inner.load(&feedback.id)?;
                theirs.set_state(self.moderator_verdict, StateSource::Moderator);
                self.inner.save(&theirs)?;
            }
            self.inner.save(feedback)
        }

        fn load(&self, id: &FeedbackId) -> Result<Feedback> {
            self.inner.load(id)
        }

        fn list(&self) -> Result<Vec<Feedback>> {
            self.inner.list()
        }

        fn exists(&self, id: &FeedbackId) -> bool {
            self.inner.exists(id)
        }
    }

    #[test]
    fn test_moderator_wins_race_with_classification() {
        let storage = RacingStorage {
            inner: MemoryStorage::new(),
            raced: AtomicBool::new(false),
            moderator_verdict: ModerationState::SPAM,
        };
        let service = ModerationService::new(storage, Arc::new(FixedClassifier::ham()));
        let id = insert_unclassified(&service);

        let (feedback, transition) = service.classify(&id).unwrap();

        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(feedback.state, ModerationState::SPAM);
        assert_eq!(service.load(&id).unwrap().state_source, StateSource::Moderator);
    }

    #[test]
    fn test_moderator_wins_race_with_confirmation() {
        let storage = RacingStorage {
            inner: MemoryStorage::new(),
            raced: AtomicBool::new(false),
            moderator_verdict: ModerationState::HAM,
        };
        let service = ModerationService::new(
            storage,
            Arc::new(FixedClassifier::new(Classification::presumed(Verdict::Spam))),
        );
        let seeded = FeedbackBuilder::comment("a1", "Bob", "Body")
            .state(ModerationState::PRESUMED_SPAM)
            .build()
            .unwrap();
        let id = service.storage().insert(&seeded).unwrap().id;

        service.confirm(&id).unwrap();

        assert_eq!(service.load(&id).unwrap().state, ModerationState::HAM);
    }

    #[test]
    fn test_concurrent_override_and_classification() {
        for _ in 0..20 {
            let service = Arc::new(create_service(FixedClassifier::ham()));
            let id = insert_unclassified(&service);

            let classifier = {
                let service = Arc::clone(&service);
                let id = id.clone();
                std::thread::spawn(move || service.classify(&id).map(|_| ()))
            };
            let moderator = {
                let service = Arc::clone(&service);
                let id = id.clone();
                std::thread::spawn(move || service.mark_as_spam(&id).map(|_| ()))
            };

            moderator.join().unwrap().unwrap();
            // Classification may exhaust its attempts under contention; that is fine
            let _ = classifier.join().unwrap();

            assert_eq!(service.load(&id).unwrap().state, ModerationState::SPAM);
        }
    }
}
