//! Observability setup for Menuflow.

pub mod tracing_setup;
