//! Framecore server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start with a self-signed certificate (development)
//! framecore-server --bind 0.0.0.0:4433
//!
//! # Start with a real TLS certificate (production)
//! framecore-server --bind 0.0.0.0:4433 --cert cert.pem --key key.pem
//! ```

use clap::Parser;
use framecore::FramerConfig;
use framecore_server::{Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Secure message framing server
#[derive(Parser, Debug)]
#[command(name = "framecore-server")]
#[command(about = "Secure message framing reference server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:4433")]
    bind: String,

    /// Path to TLS certificate (PEM format)
    #[arg(short, long)]
    cert: Option<String>,

    /// Path to TLS private key (PEM format)
    #[arg(short, long)]
    key: Option<String>,

    /// Per-session bounded queue capacity
    #[arg(long, default_value_t = framecore_session::DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("framecore server starting");
    tracing::info!(bind = %args.bind, "binding");

    if args.cert.is_none() || args.key.is_none() {
        tracing::warn!("no TLS certificate provided - using self-signed certificate");
        tracing::warn!("this is NOT suitable for production use!");
    }

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        cert_path: args.cert,
        key_path: args.key,
        framer: FramerConfig::default(),
        queue_capacity: args.queue_capacity,
    };

    let server = Server::bind(config)?;

    tracing::info!(addr = %server.local_addr()?, "server listening");

    server.run().await?;

    Ok(())
}
