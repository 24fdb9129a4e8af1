//! Flow definition: validated step graph and template rendering.

pub mod definition;
pub mod template;

pub use definition::{parse_flow_yaml, validate_document, FlowDefinition};
pub use template::interpolate;
