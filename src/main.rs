//! Stride reference app server.
//!
//! ```text
//! PORT=<http port> CLIENT_ID=<app client ID> CLIENT_SECRET=<app client secret> stride-refapp
//! ```

// crates.io
use color_eyre::{Result, eyre::WrapErr};
use tracing_subscriber::EnvFilter;
// self
use stride_refapp::{
	config::{AppConfig, SystemEnv},
	server,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = AppConfig::from_env(&SystemEnv).wrap_err(
		"Usage: PORT=<http port> CLIENT_ID=<app client ID> CLIENT_SECRET=<app client secret> stride-refapp",
	)?;

	tracing::info!(?config, "starting");

	server::serve(config).await?;

	Ok(())
}
