//! Flow file loading.
//!
//! Reads a YAML flow file from disk and runs it through core validation.
//! The flow is immutable for the process lifetime; hot reloading is
//! deliberately unsupported.

use std::path::Path;

use menuflow_core::flow::definition::FlowDefinition;
use menuflow_core::flow::parse_flow_yaml;
use menuflow_types::error::FlowError;

/// Load and validate a flow definition from a YAML file.
///
/// Fails with the full list of graph defects when the flow is structurally
/// invalid; the caller must treat this as fatal and refuse to start.
pub fn load_flow_file(path: &Path) -> Result<FlowDefinition, FlowError> {
    let content = std::fs::read_to_string(path)?;
    let flow = parse_flow_yaml(&content)?;
    tracing::info!(
        flow = %flow.name(),
        steps = flow.step_count(),
        path = %path.display(),
        "flow loaded"
    );
    Ok(flow)
}
