use crate::domain::context::{fields, ExecutionContext, StepDelta};
use crate::domain::ports::{PutOutcome, ReviewSink};
use crate::domain::review::{RefId, ReviewRecord, Sentiment};
use crate::{IdempotencyClass, Step, WorkflowError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Conditionally writes the review record to the durable sink.
///
/// The write is keyed `(book_id, ref_id)` and only succeeds if the key is
/// absent. Finding the identical record under the key is treated as an
/// already-applied write and succeeds without touching the sink again, which
/// makes this step safe to re-execute.
pub struct PersistReview {
    sink: Arc<dyn ReviewSink>,
}

impl PersistReview {
    /// Create the step around a review sink.
    pub fn new(sink: Arc<dyn ReviewSink>) -> Self {
        Self { sink }
    }

    fn record_from(&self, context: &ExecutionContext) -> Result<ReviewRecord, WorkflowError> {
        let sentiment: Sentiment = context
            .require_str(self.name(), fields::SENTIMENT)?
            .parse()?;

        Ok(ReviewRecord {
            book_id: context.require_str(self.name(), fields::BOOK_ID)?.to_string(),
            ref_id: RefId(context.require_str(self.name(), fields::REF_ID)?.to_string()),
            reviewer: context.require_str(self.name(), fields::REVIEWER)?.to_string(),
            message: context.require_str(self.name(), fields::MESSAGE)?.to_string(),
            sentiment,
        })
    }
}

#[async_trait]
impl Step for PersistReview {
    fn name(&self) -> &str {
        "persist_review"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[
            fields::BOOK_ID,
            fields::REF_ID,
            fields::REVIEWER,
            fields::MESSAGE,
            fields::SENTIMENT,
        ]
    }

    fn produced_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn idempotency(&self) -> IdempotencyClass {
        IdempotencyClass::ExternalEffect
    }

    async fn execute(&self, context: &ExecutionContext) -> Result<StepDelta, WorkflowError> {
        let record = self.record_from(context)?;

        let outcome = self.sink.put_if_absent(&record).await.map_err(|err| {
            WorkflowError::DependencyUnavailable {
                step: self.name().to_string(),
                reason: err.to_string(),
            }
        })?;

        match outcome {
            PutOutcome::Written => {
                info!(
                    step = self.name(),
                    book_id = %record.book_id,
                    ref_id = %record.ref_id,
                    "persisted review record"
                );
                Ok(StepDelta::new())
            }
            PutOutcome::Exists(existing) if existing == record => {
                debug!(
                    step = self.name(),
                    book_id = %record.book_id,
                    ref_id = %record.ref_id,
                    "record already persisted, treating as applied"
                );
                Ok(StepDelta::new())
            }
            PutOutcome::Exists(_) => Err(WorkflowError::ConflictWrite {
                book_id: record.book_id,
                ref_id: record.ref_id.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PortError;
    use crate::domain::review::ReviewSubmission;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubSink {
        outcome: Result<PutOutcome, PortError>,
        puts: Mutex<Vec<ReviewRecord>>,
    }

    impl StubSink {
        fn with(outcome: Result<PutOutcome, PortError>) -> Self {
            Self {
                outcome,
                puts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReviewSink for StubSink {
        async fn put_if_absent(&self, record: &ReviewRecord) -> Result<PutOutcome, PortError> {
            self.puts.lock().unwrap().push(record.clone());
            self.outcome.clone()
        }
    }

    fn full_context() -> ExecutionContext {
        let submission = ReviewSubmission::new("B1", "Alice", "Terrible binding").unwrap();
        let mut context = ExecutionContext::seeded_from(&submission);
        context
            .merge(
                "detect_sentiment",
                StepDelta::new().set(fields::SENTIMENT, json!("NEGATIVE")),
            )
            .unwrap();
        context
            .merge(
                "generate_ref_id",
                StepDelta::new().set(fields::REF_ID, json!("r#1")),
            )
            .unwrap();
        context
    }

    fn expected_record() -> ReviewRecord {
        ReviewRecord {
            book_id: "B1".to_string(),
            ref_id: RefId("r#1".to_string()),
            reviewer: "Alice".to_string(),
            message: "Terrible binding".to_string(),
            sentiment: Sentiment::Negative,
        }
    }

    #[tokio::test]
    async fn test_writes_record_from_context() {
        let sink = Arc::new(StubSink::with(Ok(PutOutcome::Written)));
        let step = PersistReview::new(sink.clone());

        let delta = step.execute(&full_context()).await.unwrap();

        assert!(delta.is_empty());
        assert_eq!(*sink.puts.lock().unwrap(), vec![expected_record()]);
    }

    #[tokio::test]
    async fn test_identical_existing_record_is_a_noop_success() {
        let sink = Arc::new(StubSink::with(Ok(PutOutcome::Exists(expected_record()))));
        let step = PersistReview::new(sink);

        let delta = step.execute(&full_context()).await.unwrap();
        assert!(delta.is_empty());
    }

    #[tokio::test]
    async fn test_differing_existing_record_is_a_conflict() {
        let mut other = expected_record();
        other.message = "Something else entirely".to_string();
        let step = PersistReview::new(Arc::new(StubSink::with(Ok(PutOutcome::Exists(other)))));

        let result = step.execute(&full_context()).await;
        match result {
            Err(WorkflowError::ConflictWrite { book_id, ref_id }) => {
                assert_eq!(book_id, "B1");
                assert_eq!(ref_id, "r#1");
            }
            other => panic!("Expected ConflictWrite, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sink_failure_maps_to_dependency_unavailable() {
        let step = PersistReview::new(Arc::new(StubSink::with(Err(PortError::Unavailable(
            "table offline".to_string(),
        )))));

        let result = step.execute(&full_context()).await;
        match result {
            Err(WorkflowError::DependencyUnavailable { step, reason }) => {
                assert_eq!(step, "persist_review");
                assert!(reason.contains("table offline"));
            }
            other => panic!("Expected DependencyUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_ref_id_fails_before_touching_the_sink() {
        let submission = ReviewSubmission::new("B1", "Alice", "Terrible binding").unwrap();
        let mut context = ExecutionContext::seeded_from(&submission);
        context
            .merge(
                "detect_sentiment",
                StepDelta::new().set(fields::SENTIMENT, json!("NEGATIVE")),
            )
            .unwrap();

        let sink = Arc::new(StubSink::with(Ok(PutOutcome::Written)));
        let step = PersistReview::new(sink.clone());

        let result = step.execute(&context).await;
        assert!(matches!(
            result,
            Err(WorkflowError::MissingField { ref field, .. }) if field == fields::REF_ID
        ));
        assert!(sink.puts.lock().unwrap().is_empty());
    }
}
