//! Collaborator contracts consumed by the workflow steps.
//!
//! The orchestration engine never talks to a classifier service, a durable
//! table, or a notification channel directly; it is handed implementations of
//! these traits, which lets tests substitute stubs without touching the
//! orchestration logic.

use crate::domain::review::{ReviewRecord, Sentiment};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Collaborator failed or timed out
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Collaborator refused the request
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Per-label confidence reported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceScores {
    /// Confidence the text is positive
    pub positive: f64,
    /// Confidence the text is negative
    pub negative: f64,
    /// Confidence the text is neutral
    pub neutral: f64,
    /// Confidence the text carries mixed signals
    pub mixed: f64,
}

/// Full classifier response. The workflow consumes only the top label; the
/// scores are carried for callers that want them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Top sentiment label
    pub sentiment: Sentiment,

    /// Per-label confidence scores
    pub confidence: ConfidenceScores,
}

impl Classification {
    /// A classification with the given top label and zeroed scores.
    pub fn of(sentiment: Sentiment) -> Self {
        Self {
            sentiment,
            confidence: ConfidenceScores::default(),
        }
    }
}

/// Sentiment classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the sentiment of the given text.
    async fn classify(&self, text: &str) -> Result<Classification, PortError>;
}

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was written; the key did not exist before
    Written,

    /// The key already existed; carries the record found under it
    Exists(ReviewRecord),
}

/// Write-only durable store for review records.
#[async_trait]
pub trait ReviewSink: Send + Sync {
    /// Write the record iff its `(book_id, ref_id)` key does not already
    /// exist. Must be atomic at the key level.
    async fn put_if_absent(&self, record: &ReviewRecord) -> Result<PutOutcome, PortError>;
}

/// A notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAlert {
    /// Message subject line
    pub subject: String,

    /// Message body
    pub body: String,
}

/// Outbound notification channel. Fire-and-forget from the workflow's
/// perspective: delivery is best-effort and duplicates on resubmission are
/// tolerated.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification.
    async fn send(&self, alert: &ReviewAlert) -> Result<(), PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_display() {
        assert_eq!(
            PortError::Unavailable("connection refused".to_string()).to_string(),
            "unavailable: connection refused"
        );
        assert_eq!(
            PortError::Rejected("bad payload".to_string()).to_string(),
            "rejected: bad payload"
        );
    }

    #[test]
    fn test_classification_of_zeroes_scores() {
        let classification = Classification::of(Sentiment::Neutral);
        assert_eq!(classification.sentiment, Sentiment::Neutral);
        assert_eq!(classification.confidence, ConfidenceScores::default());
    }
}
