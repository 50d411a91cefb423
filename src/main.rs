//! Storefront edge gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │              STOREFRONT GATEWAY              │
//!                         │                                              │
//!     Shopper Request     │  ┌─────────┐   ┌──────────┐   ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │──▶│ routing  │──▶│ session  │  │
//!                         │  │ server  │   │  table   │   │   gate   │  │
//!                         │  └─────────┘   └────┬─────┘   └────┬─────┘  │
//!                         │                     │ /static      ▼        │
//!                         │                     ▼        ┌──────────┐   │
//!                         │               ┌──────────┐   │ handlers │   │
//!                         │               │ ServeDir │   │+currency │   │
//!                         │               └──────────┘   └────┬─────┘   │
//!                         │                                   ▼         │
//!     Shopper Response    │                            ┌────────────┐   │
//!     ◀───────────────────┼────────────────────────────│  backends  │◀──┼──── 6 services
//!                         │                            │  registry  │   │
//!                         │                            └────────────┘   │
//!                         │  config · lifecycle · observability         │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use storefront_gateway::lifecycle::{signals, startup};
use storefront_gateway::observability::{logging, metrics};
use storefront_gateway::{Gateway, Shutdown, StartupError};

#[derive(Parser)]
#[command(name = "storefront-gateway", version, about = "Storefront edge gateway")]
struct Cli {
    /// Optional TOML file applied before environment overrides.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Gateway failed");
        eprintln!("storefront-gateway: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = startup::load(cli.config.as_deref(), |key| std::env::var(key).ok())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront-gateway starting");

    if let Some(addr) = config
        .observability
        .metrics_address
        .as_deref()
        .and_then(|addr| addr.parse().ok())
    {
        metrics::init_metrics(addr);
    }

    let gateway = Gateway::start(config).await?;
    tracing::info!(address = %gateway.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = gateway.run(shutdown.subscribe());
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = signals::wait_for_signal() => shutdown.trigger(),
    }
    server.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
