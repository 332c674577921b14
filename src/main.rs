//! Node status dashboard.
//!
//! Endpoints served by `serve`:
//!
//! - `GET /`: the dashboard page, grouped by network.
//! - `GET /api/status`: a JSON list of node statuses.
//! - `GET /styles.css`, `GET /script.js`: page assets.
//!
//! Run with
//!
//! ```not_rust
//! DEVNET_NODES="n1|http://10.0.0.1:8080" cargo run -- serve
//! cargo run -- watch --server http://127.0.0.1:3000
//! ```

use clap::{Parser, Subcommand};
use node_status::client::{refresh::DEFAULT_REFRESH_INTERVAL, RefreshLoop, StatusClient};
use node_status::config::load_app_config;
use node_status::core::{api::AppState, listen, Doctor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::BoxError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to application.yml
    #[arg(long, default_value = "application.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard
    Serve,
    /// Follow a running dashboard from the terminal
    Watch {
        /// Base url of the dashboard
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,
        /// Refresh interval, in milliseconds
        #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_millis() as u64)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "node_status=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(args.config).await,
        Command::Watch { server, interval } => watch(&server, interval).await,
    }
}

async fn serve(config: PathBuf) -> Result<(), BoxError> {
    let config = load_app_config(&config)?;
    if config.nodes.is_empty() {
        tracing::warn!("no nodes configured");
    }
    tracing::info!(
        "{} nodes configured, refresh every {}ms",
        config.nodes.len(),
        config.display.refresh_interval_millis
    );
    let state = Arc::new(AppState {
        dc: Doctor::new()?,
        nodes: config.nodes,
        display: config.display,
    });
    listen(config.addr, state, shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn watch(server: &str, interval: u64) -> Result<(), BoxError> {
    let client = StatusClient::new(server)?;
    let mut refresh = RefreshLoop::start(client, Duration::from_millis(interval)).await?;
    for card in refresh.view().cards() {
        tracing::info!(url = %card.url, network = %card.network, "{} is {}", card.name, card.state.label());
    }
    tokio::select! {
        _ = refresh.run() => {}
        _ = shutdown_signal() => {}
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let args = Args::try_parse_from(["node-status"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from("application.yml"));
    }

    #[test]
    fn watch_interval_defaults_to_the_refresh_interval() {
        let args = Args::try_parse_from(["node-status", "watch"]).unwrap();
        match args.command {
            Some(Command::Watch { server, interval }) => {
                assert_eq!(server, "http://127.0.0.1:3000");
                assert_eq!(interval, 30_000);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
