//! Feedback module
//!
//! Comments and trackbacks, their moderation state, validation and listing.

pub mod builder;
pub mod filter;
pub mod model;
pub mod state;
pub mod validator;

pub use builder::FeedbackBuilder;
pub use filter::{FeedbackFilter, ModerationStats};
pub use model::*;
pub use state::{Confidence, ModerationState, Verdict};
pub use validator::FeedbackValidator;
