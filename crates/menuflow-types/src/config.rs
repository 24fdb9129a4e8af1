//! Global configuration for the Menuflow process.
//!
//! Deserialized from `{data_dir}/config.toml` by `menuflow-infra`. Every
//! field has a default so a missing or partial file still yields a usable
//! configuration; CLI flags override these values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Process-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// Path to the flow YAML file to serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_path: Option<PathBuf>,

    /// Host the REST API binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the REST API binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database URL for the session log. Defaults to
    /// `sqlite://{data_dir}/menuflow.db` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            flow_path: None,
            host: default_host(),
            port: default_port(),
            database_url: None,
        }
    }
}
