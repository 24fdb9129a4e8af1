//! Infrastructure implementations for Menuflow.
//!
//! Everything the core engine delegates to the outside world lives here:
//! flow file loading, global configuration, the SQLite session log, and the
//! default outbound delivery adapter.

pub mod config;
pub mod flow_source;
pub mod outbound;
pub mod sqlite;
