//! fm-storage - Storage library for feedback-moderator
//!
//! This crate provides the file-system backed feedback store.

mod feedback_store;

pub use feedback_store::FileSystemStorage;
