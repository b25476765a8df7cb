//!
//! Reviewflow Test Utils - stub collaborators for workflow tests
//!
//! Deterministic classifier, sink, and notifier implementations so tests can
//! script each collaborator's behavior without real services.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use reviewflow_core::{
    Classification, Classifier, Notifier, PortError, ReviewAlert, ReviewSubmission, Sentiment,
    WorkflowError,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Classifies every text with the same preset result.
pub struct FixedClassifier {
    result: Classification,
}

impl FixedClassifier {
    /// Always answer with the given sentiment.
    pub fn new(sentiment: Sentiment) -> Self {
        Self {
            result: Classification::of(sentiment),
        }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, PortError> {
        Ok(self.result.clone())
    }
}

/// Classifies by exact text lookup; unknown texts come back neutral.
#[derive(Default)]
pub struct ScriptedClassifier {
    by_text: HashMap<String, Sentiment>,
}

impl ScriptedClassifier {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer for one text.
    pub fn on(mut self, text: impl Into<String>, sentiment: Sentiment) -> Self {
        self.by_text.insert(text.into(), sentiment);
        self
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, PortError> {
        let sentiment = self
            .by_text
            .get(text)
            .copied()
            .unwrap_or(Sentiment::Neutral);
        Ok(Classification::of(sentiment))
    }
}

/// Fails every classification.
pub struct UnavailableClassifier;

#[async_trait]
impl Classifier for UnavailableClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, PortError> {
        Err(PortError::Unavailable(
            "classifier service offline".to_string(),
        ))
    }
}

/// Never answers. For exercising run time budgets.
pub struct HangingClassifier;

#[async_trait]
impl Classifier for HangingClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, PortError> {
        futures::future::pending().await
    }
}

/// Collects every alert it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<ReviewAlert>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts sent so far, in order.
    pub fn sent(&self) -> Vec<ReviewAlert> {
        self.alerts.lock().unwrap().clone()
    }

    /// Number of alerts sent.
    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &ReviewAlert) -> Result<(), PortError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Rejects every send.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _alert: &ReviewAlert) -> Result<(), PortError> {
        Err(PortError::Unavailable("topic unreachable".to_string()))
    }
}

/// A valid submission, panicking on bad test input.
pub fn submission(book_id: &str, reviewer: &str, message: &str) -> ReviewSubmission {
    match ReviewSubmission::new(book_id, reviewer, message) {
        Ok(submission) => submission,
        Err(WorkflowError::Validation(msg)) => panic!("invalid test submission: {}", msg),
        Err(other) => panic!("unexpected error: {}", other),
    }
}
