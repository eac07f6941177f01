//! Feedback storage trait and abstractions
//!
//! Saves are compare-and-swap on `Feedback::lock_version`: a save succeeds
//! only if the stored record still carries the version the caller loaded,
//! and the stored copy comes back with the version bumped.

pub mod memory;
pub mod migration;

pub use memory::MemoryStorage;
pub use migration::{FeedbackFile, FeedbackMigrator, CURRENT_SCHEMA_VERSION};

use crate::error::{ModerationError, Result};
use crate::feedback::Feedback;
use crate::types::FeedbackId;

/// Trait for feedback storage implementations
pub trait FeedbackStorage: Send + Sync {
    /// Store new feedback; fails if the id is taken
    fn insert(&self, feedback: &Feedback) -> Result<Feedback>;

    /// Store changes to existing feedback, checking the lock version
    fn save(&self, feedback: &Feedback) -> Result<Feedback>;

    /// Load feedback by ID
    fn load(&self, id: &FeedbackId) -> Result<Feedback>;

    /// List all feedback
    fn list(&self) -> Result<Vec<Feedback>>;

    /// Check if feedback exists
    fn exists(&self, id: &FeedbackId) -> bool;
}

/// Next stored revision of `incoming`, or a conflict if `current` moved on
pub fn next_revision(current: &Feedback, incoming: &Feedback) -> Result<Feedback> {
    if current.lock_version != incoming.lock_version {
        return Err(ModerationError::Conflict {
            id: incoming.id.to_string(),
            expected: incoming.lock_version,
            found: current.lock_version,
        });
    }
    let mut next = incoming.clone();
    next.lock_version = current.lock_version + 1;
    Ok(next)
}
