//! The workflow interpreter.
//!
//! The orchestrator walks a validated [`WorkflowDefinition`] top to bottom,
//! resolving each node's step type against a [`StepRegistry`], checking the
//! step's declared inputs against the context, and merging its delta before
//! moving on. The whole run executes under a single time budget.

use crate::domain::context::{fields, ExecutionContext};
use crate::domain::definition::{
    DecisionDefinition, NodeDefinition, StepDefinition, WorkflowDefinition,
};
use crate::domain::ports::{Classifier, Notifier, ReviewSink};
use crate::domain::review::{RefId, ReviewSubmission, Sentiment};
use crate::domain::run::{RunId, WorkflowRun};
use crate::steps::{DetectSentiment, GenerateRefId, NotifyNegativeReview, PersistReview};
use crate::{Step, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default run time budget for the review-intake workflow.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Orchestrator tunables.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wall-clock budget for one full run
    pub run_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            run_timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

impl OrchestratorConfig {
    /// Config with a custom run budget.
    pub fn with_timeout(run_timeout: Duration) -> Self {
        Self { run_timeout }
    }
}

/// Maps step types named by the definition to step implementations.
#[derive(Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step under its own name.
    pub fn register(&mut self, step: Arc<dyn Step>) {
        self.steps.insert(step.name().to_string(), step);
    }

    /// Resolve a step type. Unknown types are definition bugs.
    pub fn get(&self, step_type: &str) -> Result<&Arc<dyn Step>, WorkflowError> {
        self.steps.get(step_type).ok_or_else(|| {
            WorkflowError::Definition(format!("unknown step type: {}", step_type))
        })
    }
}

/// What a successful run hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Identifier of the completed run
    pub run_id: RunId,

    /// Sentiment assigned to the review
    pub sentiment: Sentiment,

    /// Reference id the review was persisted under
    pub ref_id: RefId,
}

/// Interprets a workflow definition over a step registry.
///
/// Holds no per-run state; one orchestrator serves any number of concurrent
/// runs, each with its own context.
pub struct Orchestrator {
    definition: Arc<WorkflowDefinition>,
    registry: StepRegistry,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Build an orchestrator over a definition and registry.
    ///
    /// Validates the definition shape and resolves every step type up front
    /// so an incomplete registry fails here instead of mid-run.
    pub fn new(
        definition: WorkflowDefinition,
        registry: StepRegistry,
        config: OrchestratorConfig,
    ) -> Result<Self, WorkflowError> {
        definition.validate()?;
        for step in definition.step_definitions() {
            registry.get(&step.step_type)?;
        }

        Ok(Self {
            definition: Arc::new(definition),
            registry,
            config,
        })
    }

    /// The canonical review-intake orchestrator, wired with the four steps
    /// over the given collaborators.
    pub fn review_intake(
        classifier: Arc<dyn Classifier>,
        sink: Arc<dyn ReviewSink>,
        notifier: Arc<dyn Notifier>,
        config: OrchestratorConfig,
    ) -> Self {
        let mut registry = StepRegistry::new();
        registry.register(Arc::new(DetectSentiment::new(classifier)));
        registry.register(Arc::new(GenerateRefId::new()));
        registry.register(Arc::new(PersistReview::new(sink)));
        registry.register(Arc::new(NotifyNegativeReview::new(notifier)));

        // Every step type the canonical definition names was registered
        // above, so the resolve-and-validate pass of `new` cannot fail here.
        Self {
            definition: Arc::new(WorkflowDefinition::review_intake()),
            registry,
            config,
        }
    }

    /// The definition this orchestrator interprets.
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Execute one run for the given submission, under the configured time
    /// budget. Returns the first step failure verbatim; the budget expiring
    /// maps to [`WorkflowError::Timeout`].
    pub async fn run(&self, submission: ReviewSubmission) -> Result<RunOutcome, WorkflowError> {
        let budget = self.config.run_timeout;
        match tokio::time::timeout(budget, self.execute(submission)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(workflow = %self.definition.name, ?budget, "run exceeded time budget");
                Err(WorkflowError::Timeout { budget })
            }
        }
    }

    async fn execute(&self, submission: ReviewSubmission) -> Result<RunOutcome, WorkflowError> {
        let context = ExecutionContext::seeded_from(&submission);
        let mut run = WorkflowRun::new(&self.definition.name, context);
        run.start()?;

        info!(
            run_id = %run.id.0,
            workflow = %self.definition.name,
            book_id = submission.book_id(),
            "run started"
        );

        for node in &self.definition.nodes {
            let result = match node {
                NodeDefinition::Step(step) => self.execute_step(&mut run, step).await,
                NodeDefinition::Decision(decision) => {
                    self.evaluate_decision(&mut run, decision).await
                }
            };

            if let Err(error) = result {
                warn!(
                    run_id = %run.id.0,
                    workflow = %self.definition.name,
                    step = error.step().unwrap_or("-"),
                    %error,
                    "run failed"
                );
                run.fail(error.to_string())?;
                return Err(error);
            }
        }

        let sentiment: Sentiment = run
            .context
            .require_str("outcome", fields::SENTIMENT)?
            .parse()?;
        let ref_id = RefId(
            run.context
                .require_str("outcome", fields::REF_ID)?
                .to_string(),
        );

        run.complete()?;
        info!(
            run_id = %run.id.0,
            workflow = %self.definition.name,
            sentiment = sentiment.as_str(),
            ref_id = %ref_id,
            "run completed"
        );

        Ok(RunOutcome {
            run_id: run.id,
            sentiment,
            ref_id,
        })
    }

    async fn execute_step(
        &self,
        run: &mut WorkflowRun,
        definition: &StepDefinition,
    ) -> Result<(), WorkflowError> {
        let step = self.registry.get(&definition.step_type)?;

        for field in step.required_fields() {
            run.context.require(step.name(), field)?;
        }

        debug!(run_id = %run.id.0, step = step.name(), "executing step");
        let delta = step.execute(&run.context).await?;
        run.complete_step(&definition.id, delta)
    }

    async fn evaluate_decision(
        &self,
        run: &mut WorkflowRun,
        decision: &DecisionDefinition,
    ) -> Result<(), WorkflowError> {
        let value = run.context.require_str(&decision.id, &decision.field)?;
        let taken = value == decision.equals;

        debug!(
            run_id = %run.id.0,
            decision = %decision.id,
            field = %decision.field,
            value,
            taken,
            "evaluated decision"
        );

        if taken {
            self.execute_step(run, &decision.then).await?;
        }
        Ok(())
    }
}
