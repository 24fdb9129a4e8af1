//! Flow document types for Menuflow.
//!
//! Defines the on-disk representation of a scripted dialogue: a named graph
//! of steps, each tagged by kind (`message`, `input`, `button`, `end`).
//! YAML flow files deserialize into `FlowDocument`, which `menuflow-core`
//! validates and indexes into an immutable `FlowDefinition`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Flow Document
// ---------------------------------------------------------------------------

/// The raw, unvalidated flow definition as authored in a YAML file.
///
/// `menuflow-core::flow::definition` validates this into a `FlowDefinition`
/// before the engine will accept it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Flow name (alphanumeric + hyphens).
    pub name: String,
    /// ID of the step every new session starts at.
    pub start: String,
    /// Reserved top-level intent tags. A button choice whose option ID is in
    /// this list overwrites the session's intent when selected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<String>,
    /// The steps forming the dialogue graph.
    pub steps: Vec<StepDefinition>,
}

// ---------------------------------------------------------------------------
// Step Definition
// ---------------------------------------------------------------------------

/// A single step (node) in the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique step ID, stable within a flow.
    pub id: String,
    /// Prompt template shown to the user. May contain `{{key}}` placeholders
    /// that render from the session's recorded answers.
    pub text: String,
    /// Intent tag recorded the first time input is captured at this step,
    /// if the session has no intent yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_intent: Option<String>,
    /// Kind-specific payload (transition target, options, store key).
    #[serde(flatten)]
    pub kind: StepKind,
}

/// The kind of a step, with its kind-specific fields.
///
/// Internally tagged by `kind` to match the YAML structure:
/// ```yaml
/// - id: ask-brand
///   kind: input
///   text: "Which brand?"
///   store_key: brand
///   next: ask-budget
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Display-only step: renders its text, then moves on.
    Message {
        /// ID of the next step.
        next: String,
    },
    /// Expects free text from the user.
    Input {
        /// Answer key the user's reply is recorded under.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        store_key: Option<String>,
        /// ID of the next step.
        next: String,
    },
    /// Expects a choice among fixed options.
    Button {
        /// Answer key the raw option ID is recorded under.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        store_key: Option<String>,
        /// The choices offered, in display order.
        options: Vec<StepOption>,
        /// Option ID -> next step ID. An option absent from this map is a
        /// deliberate "invalid choice" that re-prompts instead of moving on.
        #[serde(default)]
        branches: HashMap<String, String>,
    },
    /// Terminal step. Any further non-control message re-renders it.
    End,
}

/// One choice offered by a `button` step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepOption {
    /// Option ID, matched verbatim against the inbound message text.
    pub id: String,
    /// Human-readable label for display.
    pub label: String,
}

impl StepDefinition {
    /// The answer key input at this step is recorded under, if any.
    /// Always `None` for `message` and `end` steps.
    pub fn store_key(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Input { store_key, .. } | StepKind::Button { store_key, .. } => {
                store_key.as_deref()
            }
            StepKind::Message { .. } | StepKind::End => None,
        }
    }

    /// The options offered by this step (empty for non-button steps).
    pub fn options(&self) -> &[StepOption] {
        match &self.kind {
            StepKind::Button { options, .. } => options,
            _ => &[],
        }
    }

    /// Whether this is a terminal step.
    pub fn is_end(&self) -> bool {
        matches!(self.kind, StepKind::End)
    }

    /// Kind name as it appears in flow files.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StepKind::Message { .. } => "message",
            StepKind::Input { .. } => "input",
            StepKind::Button { .. } => "button",
            StepKind::End => "end",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
