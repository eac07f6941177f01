//! fm-core - Core library for feedback-moderator
//!
//! This crate provides the moderation logic for blog feedback (comments and
//! trackbacks): the ham/spam state machine, pluggable classifiers, storage
//! abstractions and the service that ties them together.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod service;
pub mod store;
pub mod types;

pub use engine::{CommentModerationEngine, Outcome, Transition, FALLBACK_STATE};
pub use error::{ModerationError, Result};
pub use service::ModerationService;
pub use types::*;
