use clap::Parser;
use std::path::PathBuf;

use hopper_proxy::{Proxy, ProxyConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "hopper_proxy=info,hopper_proxy_cli=info";

#[derive(Debug, Parser)]
#[command(name = "hopper-proxy-cli")]
struct Cli {
    /// Port to listen on; overrides `listen.port` from the config file.
    port: Option<u16>,
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Log level for the proxy crates, e.g. `debug`. `RUST_LOG` wins when set.
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = match &cli.config {
        Some(path) => ProxyConfig::load(path).map_err(|err| err.to_string())?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listen.port = port;
    }

    tracing::info!(
        args = ?std::env::args().collect::<Vec<_>>(),
        connect_timeout_ms = config.upstream.connect_timeout_ms,
        read_timeout_ms = config.upstream.read_timeout_ms,
        "starting HTTP proxy on port {}",
        config.listen.port
    );

    let proxy = Proxy::new(config).map_err(|err| err.to_string())?;
    let listener = proxy.bind().map_err(|err| err.to_string())?;
    proxy
        .run_until(listener, shutdown_signal())
        .await
        .map_err(|err| err.to_string())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the proxy keeps
/// running until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl-C"),
        Err(err) => {
            tracing::warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::new(format!("hopper_proxy={level},hopper_proxy_cli={level}")),
        None => EnvFilter::new(DEFAULT_FILTER),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
