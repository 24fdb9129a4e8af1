//! Flow parsing, validation, and step lookup.
//!
//! Converts a raw `FlowDocument` into an immutable, validated
//! `FlowDefinition`. Validation runs once at load time and collects every
//! structural defect it finds; a flow that fails validation must never reach
//! the engine.

use std::collections::{HashMap, HashSet};

use menuflow_types::error::{FlowError, GraphError, UnknownStepError};
use menuflow_types::flow::{FlowDocument, StepDefinition, StepKind};

// ---------------------------------------------------------------------------
// Flow Definition
// ---------------------------------------------------------------------------

/// An immutable, validated flow graph with indexed step lookup.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    name: String,
    start: String,
    intents: HashSet<String>,
    steps: HashMap<String, StepDefinition>,
}

impl FlowDefinition {
    /// Validate a raw document and index its steps.
    ///
    /// Fails with `FlowError::Invalid` carrying the full list of graph
    /// defects when the document is not structurally sound.
    pub fn from_document(doc: FlowDocument) -> Result<Self, FlowError> {
        validate_document(&doc).map_err(FlowError::Invalid)?;

        let steps = doc
            .steps
            .into_iter()
            .map(|step| (step.id.clone(), step))
            .collect();

        Ok(Self {
            name: doc.name,
            start: doc.start,
            intents: doc.intents.into_iter().collect(),
            steps,
        })
    }

    /// Exact step lookup by ID.
    pub fn resolve_step(&self, step_id: &str) -> Result<&StepDefinition, UnknownStepError> {
        self.steps
            .get(step_id)
            .ok_or_else(|| UnknownStepError(step_id.to_string()))
    }

    /// The designated start step. Guaranteed to exist by validation.
    pub fn start_step(&self) -> &StepDefinition {
        &self.steps[&self.start]
    }

    /// Whether `tag` is one of the flow's reserved top-level intent tags.
    pub fn is_intent_tag(&self, tag: &str) -> bool {
        self.intents.contains(tag)
    }

    /// Flow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ID of the start step.
    pub fn start_id(&self) -> &str {
        &self.start
    }

    /// Reserved intent tags, unordered.
    pub fn intents(&self) -> &HashSet<String> {
        &self.intents
    }

    /// Number of steps in the flow.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Iterate over all steps, unordered.
    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.values()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a YAML string into a validated `FlowDefinition`.
pub fn parse_flow_yaml(yaml: &str) -> Result<FlowDefinition, FlowError> {
    let doc: FlowDocument =
        serde_yaml_ng::from_str(yaml).map_err(|e| FlowError::Parse(e.to_string()))?;
    FlowDefinition::from_document(doc)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structural constraints on a flow document, collecting every
/// defect rather than stopping at the first.
///
/// Checks:
/// - Name is non-empty, alphanumeric + hyphens
/// - At least one step exists, and at least one `end` step
/// - Step IDs are unique; the declared start step exists
/// - Every transition target (`next` and each branch value) references an
///   existing step
/// - Button option IDs are unique within their step
/// - Button branch keys are a subset of the step's declared options (an
///   unmapped option is legal; a mapped non-option is not)
pub fn validate_document(doc: &FlowDocument) -> Result<(), Vec<GraphError>> {
    let mut errors = Vec::new();

    if doc.name.is_empty() || !doc.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        errors.push(GraphError::InvalidName(doc.name.clone()));
    }

    if doc.steps.is_empty() {
        errors.push(GraphError::Empty);
        return Err(errors);
    }

    let mut ids = HashSet::new();
    for step in &doc.steps {
        if !ids.insert(step.id.as_str()) {
            errors.push(GraphError::DuplicateStepId(step.id.clone()));
        }
    }

    if !ids.contains(doc.start.as_str()) {
        errors.push(GraphError::UnknownStartStep(doc.start.clone()));
    }

    let mut has_end = false;
    for step in &doc.steps {
        match &step.kind {
            StepKind::Message { next } | StepKind::Input { next, .. } => {
                if !ids.contains(next.as_str()) {
                    errors.push(GraphError::UnknownTransitionTarget {
                        step: step.id.clone(),
                        target: next.clone(),
                    });
                }
            }
            StepKind::Button {
                options, branches, ..
            } => {
                let mut option_ids = HashSet::new();
                for option in options {
                    if !option_ids.insert(option.id.as_str()) {
                        errors.push(GraphError::DuplicateOptionId {
                            step: step.id.clone(),
                            option: option.id.clone(),
                        });
                    }
                }
                for (option, target) in branches {
                    if !option_ids.contains(option.as_str()) {
                        errors.push(GraphError::BranchWithoutOption {
                            step: step.id.clone(),
                            option: option.clone(),
                        });
                    }
                    if !ids.contains(target.as_str()) {
                        errors.push(GraphError::UnknownTransitionTarget {
                            step: step.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
            StepKind::End => has_end = true,
        }
    }

    if !has_end {
        errors.push(GraphError::MissingEndStep);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
