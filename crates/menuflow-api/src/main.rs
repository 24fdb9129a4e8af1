//! Menuflow CLI and REST API entry point.
//!
//! Binary name: `mflow`
//!
//! Parses CLI arguments, initializes tracing, then dispatches to the
//! appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use anyhow::bail;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use menuflow_infra::config::{load_global_config, resolve_data_dir};
use menuflow_infra::sqlite::pool::default_database_url;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,menuflow=debug",
        _ => "trace",
    };
    menuflow_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = dispatch(cli).await;
    menuflow_observe::tracing_setup::shutdown_tracing();
    result
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "mflow", &mut std::io::stdout());
            Ok(())
        }

        Commands::Validate { flow } => cli::validate::run(&flow, cli.json),

        Commands::Chat { flow, user } => cli::chat::run(&flow, &user).await,

        Commands::Status => cli::status::run(cli.json).await,

        Commands::Serve {
            flow,
            port,
            host,
            database_url,
            no_persist,
        } => {
            let data_dir = resolve_data_dir();
            tokio::fs::create_dir_all(&data_dir).await?;
            let config = load_global_config(&data_dir).await;

            // CLI flags take precedence over config.toml
            let Some(flow_path) = flow.or(config.flow_path) else {
                bail!("no flow file given (pass --flow or set flow_path in config.toml)");
            };
            let host = host.unwrap_or(config.host);
            let port = port.unwrap_or(config.port);
            let database_url = if no_persist {
                None
            } else {
                Some(
                    database_url
                        .or(config.database_url)
                        .unwrap_or_else(|| default_database_url(&data_dir)),
                )
            };

            let state = AppState::init(&flow_path, database_url.as_deref()).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Menuflow serving '{}' on {}",
                console::style("⚡").bold(),
                console::style(state.engine.flow().name()).cyan(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
            Ok(())
        }
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
