//! The concrete steps of the review-intake workflow.
//!
//! Each step implements [`crate::Step`], declares the context fields it reads
//! and produces, and talks to at most one injected collaborator.

mod detect_sentiment;
mod generate_ref_id;
mod notify_negative;
mod persist_review;

pub use detect_sentiment::DetectSentiment;
pub use generate_ref_id::GenerateRefId;
pub use notify_negative::{NotifyNegativeReview, ALERT_SUBJECT};
pub use persist_review::PersistReview;
