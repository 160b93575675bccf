//! content-gateway
//!
//! ```text
//!   Client ──▶ http server ──▶ body peek ──▶ routing table
//!                                                  │
//!                                                  ▼
//!   Client ◀── relay ◀── upstream client ◀── rebuilt request ──▶ Upstream
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use content_gateway::config::{load_config, GatewayConfig};
use content_gateway::lifecycle::{signals, Shutdown};
use content_gateway::observability::{logging, metrics};
use content_gateway::routing::Router;
use content_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "content-gateway")]
#[command(about = "Reverse proxy that routes requests by inspecting their body", long_about = None)]
struct Cli {
    /// Path to the TOML or JSON configuration file.
    #[arg(short, long, env = "CONTENT_GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration, print the routing table and exit.
    #[arg(long)]
    check: bool,
}

fn print_routing_table(config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::from_config(&config.routing)?;
    for (index, route) in router.routes().iter().enumerate() {
        println!("{index:>3}  {:?} -> {}", route.trigger(), route.target());
    }
    if let Some(default) = router.default_target() {
        println!("  *  default -> {default}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    if cli.check {
        return print_routing_table(&config);
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("content-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        rules = config.routing.rules.len(),
        stage = %config.routing.stage,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
