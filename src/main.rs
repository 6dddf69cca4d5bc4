//! TMDB API proxy.
//!
//! ```text
//!     Client ──▶ HttpServer ──▶ ForwardingPipeline ──┬──▶ ResponseCache (GET hit)
//!                (request ID,     (preflight, health, │
//!                 trace layers)    cache key, timeout) └──▶ UpstreamClient ──▶ upstream API
//!
//!     CacheSweeper (periodic expiry)   Admin API (optional)   Prometheus (optional)
//! ```

use clap::Parser;
use std::path::PathBuf;

use tmdb_proxy::config::{load_config, ProxyConfig};
use tmdb_proxy::lifecycle::startup;
use tmdb_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "tmdb-proxy", version)]
#[command(about = "Caching reverse proxy for the TMDB API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(
        config = ?args.config,
        "tmdb-proxy v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    startup::run(config).await?;
    Ok(())
}
