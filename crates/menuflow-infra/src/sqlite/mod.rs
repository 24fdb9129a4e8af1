//! SQLite persistence for the session transition log.

pub mod pool;
pub mod session_log;
