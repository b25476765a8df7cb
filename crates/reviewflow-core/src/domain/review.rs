use crate::WorkflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sentiment label assigned by the classifier.
///
/// Serialized with the classifier's uppercase wire labels (`"NEGATIVE"` etc.)
/// so context values and persisted records match the collaborator contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    /// Predominantly positive text
    Positive,
    /// Predominantly negative text
    Negative,
    /// Neither positive nor negative
    Neutral,
    /// Both positive and negative signals
    Mixed,
}

impl Sentiment {
    /// The uppercase wire label for this sentiment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            "NEUTRAL" => Ok(Sentiment::Neutral),
            "MIXED" => Ok(Sentiment::Mixed),
            other => Err(WorkflowError::Validation(format!(
                "unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// A validated review submission. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    book_id: String,
    reviewer: String,
    message: String,
}

impl ReviewSubmission {
    /// Validate and accept a submission. All three fields must be non-empty
    /// after trimming, otherwise the submission is rejected before any step
    /// runs.
    pub fn new(
        book_id: impl Into<String>,
        reviewer: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, WorkflowError> {
        let book_id = book_id.into();
        let reviewer = reviewer.into();
        let message = message.into();

        for (name, value) in [
            ("bookId", &book_id),
            ("reviewer", &reviewer),
            ("message", &message),
        ] {
            if value.trim().is_empty() {
                return Err(WorkflowError::Validation(format!(
                    "{} must be a non-empty string",
                    name
                )));
            }
        }

        Ok(Self {
            book_id,
            reviewer,
            message,
        })
    }

    /// The book this review is for.
    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Who wrote the review.
    pub fn reviewer(&self) -> &str {
        &self.reviewer
    }

    /// The review text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Value object: opaque unique reference identifier for a persisted review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefId(pub String);

impl RefId {
    /// Allocate a fresh reference id in the `r#<uuid>` wire format.
    ///
    /// Allocation is at-least-once: re-running the generating step produces a
    /// different id, which callers resubmitting a failed run must tolerate.
    pub fn generate() -> Self {
        RefId(format!("r#{}", Uuid::new_v4()))
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The durable record written by the persistence step, keyed
/// `(PK = book_id, SK = ref_id)`. Created at most once per run and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Partition key
    pub book_id: String,

    /// Sort key
    pub ref_id: RefId,

    /// Who wrote the review
    pub reviewer: String,

    /// The review text
    pub message: String,

    /// Classifier-assigned sentiment
    pub sentiment: Sentiment,
}

impl ReviewRecord {
    /// The composite key of this record.
    pub fn key(&self) -> (&str, &str) {
        (&self.book_id, &self.ref_id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_labels_round_trip() {
        for sentiment in [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Mixed,
        ] {
            let label = sentiment.to_string();
            assert_eq!(label.parse::<Sentiment>().unwrap(), sentiment);
        }
    }

    #[test]
    fn test_sentiment_serde_uses_wire_labels() {
        let serialized = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(serialized, "\"NEGATIVE\"");

        let deserialized: Sentiment = serde_json::from_str("\"MIXED\"").unwrap();
        assert_eq!(deserialized, Sentiment::Mixed);
    }

    #[test]
    fn test_sentiment_match_is_case_sensitive() {
        assert!("negative".parse::<Sentiment>().is_err());
        assert!("Negative".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_submission_accepts_valid_input() {
        let submission = ReviewSubmission::new("B1", "Alice", "Loved it").unwrap();
        assert_eq!(submission.book_id(), "B1");
        assert_eq!(submission.reviewer(), "Alice");
        assert_eq!(submission.message(), "Loved it");
    }

    #[test]
    fn test_submission_rejects_empty_fields() {
        for (book_id, reviewer, message, field) in [
            ("", "Alice", "text", "bookId"),
            ("B1", "   ", "text", "reviewer"),
            ("B1", "Alice", "", "message"),
        ] {
            let result = ReviewSubmission::new(book_id, reviewer, message);
            match result {
                Err(WorkflowError::Validation(msg)) => assert!(msg.contains(field)),
                other => panic!("Expected Validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_ref_id_format_and_uniqueness() {
        let a = RefId::generate();
        let b = RefId::generate();

        assert!(a.0.starts_with("r#"));
        assert!(b.0.starts_with("r#"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_key() {
        let record = ReviewRecord {
            book_id: "B1".to_string(),
            ref_id: RefId("r#1".to_string()),
            reviewer: "Alice".to_string(),
            message: "Terrible binding".to_string(),
            sentiment: Sentiment::Negative,
        };
        assert_eq!(record.key(), ("B1", "r#1"));
    }

    #[test]
    fn test_record_serialization() {
        let record = ReviewRecord {
            book_id: "B1".to_string(),
            ref_id: RefId("r#1".to_string()),
            reviewer: "Bob".to_string(),
            message: "Loved it".to_string(),
            sentiment: Sentiment::Positive,
        };

        let serialized = serde_json::to_string(&record).unwrap();
        let deserialized: ReviewRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, record);
    }
}
