//! Carbon footprint backend server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use carbon_footprint::config::load_config;
use carbon_footprint::lifecycle::{build_state, wait_for_signal};
use carbon_footprint::observability::{logging, metrics};
use carbon_footprint::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "carbon-footprint", version, about = "Carbon footprint estimation backend")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "CARBON_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability, config.environment)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        bind_address = %config.listener.bind_address,
        provider = ?config.provider.kind,
        "carbon-footprint starting"
    );

    if config.observability.metrics_enabled {
        // Address was checked by config validation.
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let state = build_state(&config).await?;
    let server = HttpServer::new(&config.limits, state);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await?;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
