use crate::domain::context::fields;
use crate::domain::review::Sentiment;
use crate::WorkflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the canonical review-intake workflow.
pub const REVIEW_INTAKE_WORKFLOW: &str = "ReviewSentimentAnalysis";

/// A parsed and validated workflow definition: an ordered list of nodes the
/// orchestrator interprets top to bottom. Loaded once at process start and
/// shared read-only across concurrent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Human-readable name of the workflow
    pub name: String,

    /// The nodes of this workflow, in execution order
    pub nodes: Vec<NodeDefinition>,
}

/// A node in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeDefinition {
    /// A step executed unconditionally
    Step(StepDefinition),

    /// The single branch point of the workflow
    Decision(DecisionDefinition),
}

/// Declares one step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// ID of this node in the graph
    pub id: String,

    /// Step type to execute (registry key)
    pub step_type: String,
}

/// Declares the branch point: if `field` equals `equals` (exact,
/// case-sensitive) the `then` step runs, otherwise execution falls through
/// to the next node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDefinition {
    /// ID of this node in the graph
    pub id: String,

    /// Context field to inspect
    pub field: String,

    /// Value the field must equal for the branch to be taken
    pub equals: String,

    /// Step executed when the branch is taken
    pub then: StepDefinition,
}

impl WorkflowDefinition {
    /// The canonical review-intake workflow: detect sentiment, allocate a
    /// reference id, persist, then notify when the review was NEGATIVE.
    pub fn review_intake() -> Self {
        Self {
            name: REVIEW_INTAKE_WORKFLOW.to_string(),
            nodes: vec![
                NodeDefinition::Step(StepDefinition {
                    id: "detect_sentiment".to_string(),
                    step_type: "detect_sentiment".to_string(),
                }),
                NodeDefinition::Step(StepDefinition {
                    id: "generate_ref_id".to_string(),
                    step_type: "generate_ref_id".to_string(),
                }),
                NodeDefinition::Step(StepDefinition {
                    id: "persist_review".to_string(),
                    step_type: "persist_review".to_string(),
                }),
                NodeDefinition::Decision(DecisionDefinition {
                    id: "check_sentiment".to_string(),
                    field: fields::SENTIMENT.to_string(),
                    equals: Sentiment::Negative.as_str().to_string(),
                    then: StepDefinition {
                        id: "notify_negative_review".to_string(),
                        step_type: "notify_negative_review".to_string(),
                    },
                }),
            ],
        }
    }

    /// Validate the workflow definition.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.nodes.is_empty() {
            return Err(WorkflowError::Definition(
                "workflow must have at least one node".to_string(),
            ));
        }

        let mut node_ids = HashSet::new();
        let mut decision_count = 0usize;

        for node in &self.nodes {
            let id = match node {
                NodeDefinition::Step(step) => &step.id,
                NodeDefinition::Decision(decision) => {
                    decision_count += 1;
                    if decision.field.is_empty() {
                        return Err(WorkflowError::Definition(format!(
                            "decision {} must name a context field",
                            decision.id
                        )));
                    }
                    if !node_ids.insert(decision.then.id.as_str()) {
                        return Err(WorkflowError::Definition(format!(
                            "duplicate node id: {}",
                            decision.then.id
                        )));
                    }
                    &decision.id
                }
            };

            if !node_ids.insert(id.as_str()) {
                return Err(WorkflowError::Definition(format!(
                    "duplicate node id: {}",
                    id
                )));
            }
        }

        if decision_count > 1 {
            return Err(WorkflowError::Definition(format!(
                "workflow has {} decision nodes, at most one is supported",
                decision_count
            )));
        }

        Ok(())
    }

    /// All step declarations in this workflow, including decision targets.
    pub fn step_definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.nodes.iter().map(|node| match node {
            NodeDefinition::Step(step) => step,
            NodeDefinition::Decision(decision) => &decision.then,
        })
    }
}
