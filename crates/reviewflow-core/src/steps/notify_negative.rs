use crate::domain::context::{fields, ExecutionContext, StepDelta};
use crate::domain::ports::{Notifier, ReviewAlert};
use crate::{IdempotencyClass, Step, WorkflowError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Subject line of every review alert.
pub const ALERT_SUBJECT: &str = "Review analysis result";

/// Sends an alert about a review that cleared the branch condition.
///
/// Runs only when the decision node selects it, after the record has been
/// persisted. Delivery is best-effort and a resubmitted run may alert twice.
pub struct NotifyNegativeReview {
    notifier: Arc<dyn Notifier>,
}

impl NotifyNegativeReview {
    /// Create the step around a notification channel.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Step for NotifyNegativeReview {
    fn name(&self) -> &str {
        "notify_negative_review"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[fields::SENTIMENT, fields::REVIEWER, fields::MESSAGE]
    }

    fn produced_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn idempotency(&self) -> IdempotencyClass {
        IdempotencyClass::ExternalEffect
    }

    async fn execute(&self, context: &ExecutionContext) -> Result<StepDelta, WorkflowError> {
        let sentiment = context.require_str(self.name(), fields::SENTIMENT)?;
        let reviewer = context.require_str(self.name(), fields::REVIEWER)?;
        let message = context.require_str(self.name(), fields::MESSAGE)?;

        let alert = ReviewAlert {
            subject: ALERT_SUBJECT.to_string(),
            body: format!(
                "Sentiment analysis: {} review from user({}): \"{}\".",
                sentiment, reviewer, message
            ),
        };

        self.notifier.send(&alert).await.map_err(|err| {
            WorkflowError::DependencyUnavailable {
                step: self.name().to_string(),
                reason: err.to_string(),
            }
        })?;

        info!(step = self.name(), reviewer = reviewer, "sent review alert");
        Ok(StepDelta::new())
    }
}
