//! Application state wiring the engine and adapters together.
//!
//! `AppState` holds the flow engine plus the concrete adapter instances used
//! by the REST API. The engine is wired against trait seams; AppState pins
//! them to the infra implementations.

use std::path::Path;
use std::sync::Arc;

use menuflow_core::engine::FlowEngine;
use menuflow_infra::flow_source::load_flow_file;
use menuflow_infra::outbound::TracingOutbound;
use menuflow_infra::sqlite::pool::DatabasePool;
use menuflow_infra::sqlite::session_log::{SqliteSessionLog, spawn_session_log_writer};

/// Shared application state for the REST API.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FlowEngine>,
    pub outbound: Arc<TracingOutbound>,
    /// Session transition log; `None` when persistence is disabled.
    pub session_log: Option<SqliteSessionLog>,
}

impl AppState {
    /// Load the flow, build the engine, and wire the adapters.
    ///
    /// A flow that fails validation aborts startup here. When
    /// `database_url` is set, a writer task is spawned that drains the
    /// engine's event bus into the SQLite session log.
    pub async fn init(flow_path: &Path, database_url: Option<&str>) -> anyhow::Result<Self> {
        let flow = load_flow_file(flow_path)?;
        let engine = Arc::new(FlowEngine::new(flow));

        let session_log = match database_url {
            Some(url) => {
                let pool = DatabasePool::new(url).await?;
                let repo = SqliteSessionLog::new(pool);
                spawn_session_log_writer(engine.subscribe(), repo.clone());
                tracing::info!(url, "session log persistence enabled");
                Some(repo)
            }
            None => {
                tracing::info!("session log persistence disabled");
                None
            }
        };

        Ok(Self {
            engine,
            outbound: Arc::new(TracingOutbound::new()),
            session_log,
        })
    }
}
