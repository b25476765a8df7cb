use crate::domain::context::{fields, ExecutionContext, StepDelta};
use crate::domain::ports::Classifier;
use crate::{IdempotencyClass, Step, WorkflowError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Classifies the review text and writes the top sentiment label into the
/// context.
pub struct DetectSentiment {
    classifier: Arc<dyn Classifier>,
}

impl DetectSentiment {
    /// Create the step around a classifier.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Step for DetectSentiment {
    fn name(&self) -> &str {
        "detect_sentiment"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[fields::MESSAGE]
    }

    fn produced_fields(&self) -> &'static [&'static str] {
        &[fields::SENTIMENT]
    }

    fn idempotency(&self) -> IdempotencyClass {
        // Read-only towards the classifier, but still a remote call.
        IdempotencyClass::ExternalEffect
    }

    async fn execute(&self, context: &ExecutionContext) -> Result<StepDelta, WorkflowError> {
        let message = context.require_str(self.name(), fields::MESSAGE)?;

        let classification = self.classifier.classify(message).await.map_err(|err| {
            WorkflowError::DependencyUnavailable {
                step: self.name().to_string(),
                reason: err.to_string(),
            }
        })?;

        debug!(
            step = self.name(),
            sentiment = classification.sentiment.as_str(),
            "classified review text"
        );

        Ok(StepDelta::new().set(
            fields::SENTIMENT,
            Value::String(classification.sentiment.as_str().to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Classification, PortError};
    use crate::domain::review::{ReviewSubmission, Sentiment};
    use serde_json::json;

    struct StubClassifier(Result<Classification, PortError>);

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, PortError> {
            self.0.clone()
        }
    }

    fn context() -> ExecutionContext {
        let submission = ReviewSubmission::new("B1", "Alice", "Terrible binding").unwrap();
        ExecutionContext::seeded_from(&submission)
    }

    #[tokio::test]
    async fn test_writes_uppercase_label() {
        let step = DetectSentiment::new(Arc::new(StubClassifier(Ok(Classification::of(
            Sentiment::Negative,
        )))));

        let delta = step.execute(&context()).await.unwrap();

        let fields: Vec<_> = delta.iter().collect();
        assert_eq!(fields, vec![("sentiment", &json!("NEGATIVE"))]);
    }

    #[tokio::test]
    async fn test_classifier_failure_maps_to_dependency_unavailable() {
        let step = DetectSentiment::new(Arc::new(StubClassifier(Err(PortError::Unavailable(
            "connection refused".to_string(),
        )))));

        let result = step.execute(&context()).await;
        match result {
            Err(WorkflowError::DependencyUnavailable { step, reason }) => {
                assert_eq!(step, "detect_sentiment");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("Expected DependencyUnavailable, got {:?}", other),
        }
    }
}
