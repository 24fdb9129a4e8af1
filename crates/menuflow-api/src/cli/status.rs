//! `mflow status` - session log statistics from the local database.

use menuflow_core::repository::SessionLogRepository;
use menuflow_infra::config::{load_global_config, resolve_data_dir};
use menuflow_infra::sqlite::pool::{DatabasePool, default_database_url};
use menuflow_infra::sqlite::session_log::SqliteSessionLog;

pub async fn run(json: bool) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;
    let config = load_global_config(&data_dir).await;

    let url = config
        .database_url
        .clone()
        .unwrap_or_else(|| default_database_url(&data_dir));
    let pool = DatabasePool::new(&url).await?;
    let repo = SqliteSessionLog::new(pool);

    let (events, users) = repo
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("failed to read session log: {e}"))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "data_dir": data_dir,
                "database_url": url,
                "logged_events": events,
                "distinct_users": users,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("  {} Menuflow status", console::style("📊").bold());
    println!();
    println!("  Data dir:       {}", data_dir.display());
    println!("  Database:       {url}");
    println!("  Logged events:  {events}");
    println!("  Distinct users: {users}");
    println!();

    Ok(())
}
