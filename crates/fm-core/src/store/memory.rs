//! In-memory feedback storage

use super::{next_revision, FeedbackStorage};
use crate::error::{ModerationError, Result};
use crate::feedback::Feedback;
use crate::types::FeedbackId;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory feedback storage
pub struct MemoryStorage {
    feedback: RwLock<HashMap<FeedbackId, Feedback>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            feedback: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<FeedbackId, Feedback>> {
        self.feedback.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<FeedbackId, Feedback>> {
        self.feedback.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackStorage for MemoryStorage {
    fn insert(&self, feedback: &Feedback) -> Result<Feedback> {
        let mut all = self.write();
        if all.contains_key(&feedback.id) {
            return Err(ModerationError::Validation(format!(
                "Feedback with ID {} already exists",
                feedback.id
            )));
        }
        let mut stored = feedback.clone();
        stored.lock_version = 0;
        all.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn save(&self, feedback: &Feedback) -> Result<Feedback> {
        let mut all = self.write();
        let current = all
            .get(&feedback.id)
            .ok_or_else(|| ModerationError::FeedbackNotFound(feedback.id.to_string()))?;
        let next = next_revision(current, feedback)?;
        all.insert(next.id.clone(), next.clone());
        Ok(next)
    }

    fn load(&self, id: &FeedbackId) -> Result<Feedback> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| ModerationError::FeedbackNotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<Feedback>> {
        Ok(self.read().values().cloned().collect())
    }

    fn exists(&self, id: &FeedbackId) -> bool {
        self.read().contains_key(id)
    }
}
