//! Main entry point for the order management service.
//!
//! Loads configuration, builds the configured order store and serves the
//! order API until interrupted.

use clap::Parser;
use order_config::Config;
use order_core::OrderService;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod rate_limit;
mod server;

/// Command-line arguments for the order service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/example.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the order service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the order store named by the configuration
/// 5. Serves the API until Ctrl-C
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let orders = build_order_service(&config)?;
	server::start_server(config.api.clone(), orders).await?;

	tracing::info!("Stopped order service");
	Ok(())
}

/// Builds the order service on top of the primary storage backend.
fn build_order_service(config: &Config) -> Result<OrderService, Box<dyn std::error::Error>> {
	let primary = &config.storage.primary;
	let storage_config = config
		.storage
		.implementations
		.get(primary)
		.ok_or_else(|| format!("Storage implementation '{}' is not configured", primary))?;

	let store = order_storage::create_storage(primary, storage_config)?;
	tracing::info!("Using '{}' order storage", primary);

	Ok(OrderService::new(Arc::from(store)))
}
