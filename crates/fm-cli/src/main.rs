//! feedback-moderator - ham/spam moderation for blog feedback
//!
//! Stores comments and trackbacks, classifies them and lets a moderator
//! settle the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a store in the current directory
//! feedback-moderator init
//!
//! # Submit a comment; it is classified on arrival
//! feedback-moderator submit comment --article a1 --author Piers --body "Nice post"
//!
//! # Review what is waiting
//! feedback-moderator list --state presumed_spam
//!
//! # Settle it
//! feedback-moderator ham 3f2a9c1b
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
