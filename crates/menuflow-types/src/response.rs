//! Response descriptor: the engine's sole output per inbound message.
//!
//! Describes what to show the user next, decoupled from delivery. The
//! outbound adapter translates this into whatever wire format the target
//! channel speaks.

use serde::{Deserialize, Serialize};

use crate::flow::StepOption;

/// Render-ready description of the next prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// How the text should be presented.
    pub kind: ResponseKind,
    /// Fully interpolated prompt text.
    pub text: String,
    /// Choices to offer, in display order. Empty unless `kind` is
    /// `interactive`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ResponseOption>,
}

/// Presentation category of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Plain text prompt.
    Text,
    /// Prompt carrying one or more selectable options.
    Interactive,
    /// Terminal message; the conversation has ended.
    End,
}

/// One selectable option in an interactive response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseOption {
    /// Option ID; a click must come back as this exact string.
    pub id: String,
    /// Display label.
    pub label: String,
}

impl ResponseDescriptor {
    /// Plain text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Text,
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// Interactive response with options.
    pub fn interactive(text: impl Into<String>, options: Vec<ResponseOption>) -> Self {
        Self {
            kind: ResponseKind::Interactive,
            text: text.into(),
            options,
        }
    }

    /// Terminal response.
    pub fn end(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::End,
            text: text.into(),
            options: Vec::new(),
        }
    }
}

impl From<&StepOption> for ResponseOption {
    fn from(option: &StepOption) -> Self {
        Self {
            id: option.id.clone(),
            label: option.label.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
