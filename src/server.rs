//! Webhook server: the platform's callbacks, the app modules, and the static pages they load.
//!
//! Lifecycle callbacks and the descriptor are public. Every other route runs behind
//! [`gate::require_context`]. The glance and action routes also answer CORS preflights; the
//! CORS layer sits outside the gate, so preflights never need a token.

pub mod action;
pub mod lifecycle;
pub mod module;
pub mod webhook;

// std
use std::{net::SocketAddr, path::PathBuf};
// crates.io
use axum::{
	Router,
	http::StatusCode,
	middleware,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
// self
use crate::{
	_prelude::*,
	api::StrideClient,
	config::AppConfig,
	gate::{self, TokenGate},
	store::{InstallationStore, MemoryStore},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	/// REST client, owner of the access-token cache.
	pub client: Arc<StrideClient>,
	/// Inbound token verifier.
	pub gate: TokenGate,
	/// Installations keyed by conversation.
	pub store: Arc<dyn InstallationStore>,
	/// App descriptor template.
	pub descriptor_path: Arc<PathBuf>,
	/// Directory served for unmatched paths.
	pub static_dir: Arc<PathBuf>,
}
impl AppState {
	/// Wires `client` with an in-memory store and the gate keyed by the configured secret.
	pub fn new(client: StrideClient, config: &AppConfig) -> Self {
		Self {
			client: Arc::new(client),
			gate: TokenGate::new(&config.client_secret),
			store: Arc::new(MemoryStore::default()),
			descriptor_path: Arc::new(config.descriptor_path.clone()),
			static_dir: Arc::new(config.static_dir.clone()),
		}
	}

	/// Replaces the installation store.
	pub fn with_store(mut self, store: Arc<dyn InstallationStore>) -> Self {
		self.store = store;

		self
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("client", &self.client)
			.field("descriptor_path", &self.descriptor_path)
			.field("static_dir", &self.static_dir)
			.finish()
	}
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
	let require_context = middleware::from_fn_with_state(state.gate.clone(), gate::require_context);
	let gated = Router::new()
		.route("/bot-mention", post(webhook::bot_mention))
		.route("/conversation-updated", post(webhook::conversation_updated))
		.route("/roster-updated", post(webhook::roster_updated))
		.route("/module/dialog", get(module::dialog))
		.route("/module/sidebar", get(module::sidebar))
		.route_layer(require_context.clone());
	let cross_origin = Router::new()
		.route("/module/glance/state", get(module::glance_state))
		.route("/module/action/refapp-service", post(action::call_service))
		.route("/module/action/refapp-service-updateMessage", post(action::update_message))
		.route_layer(require_context)
		.layer(CorsLayer::permissive());

	Router::new()
		.route("/installed", post(lifecycle::installed))
		.route("/uninstalled", post(lifecycle::uninstalled))
		.route("/descriptor", get(lifecycle::descriptor))
		.merge(gated)
		.merge(cross_origin)
		.fallback_service(ServeDir::new(state.static_dir.as_path()))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds `0.0.0.0:<port>` and serves until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<()> {
	let client = StrideClient::new(&config)?;
	let app = router(AppState::new(client, &config));
	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = TcpListener::bind(addr).await.map_err(Error::Server)?;

	tracing::info!(%addr, environment = ?config.environment, "app running");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(Error::Server)
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for the shutdown signal");
	}

	tracing::info!("shutting down");
}

/// Handler failure, answered with a 500.
#[derive(Debug)]
pub struct AppError(Error);
impl<E> From<E> for AppError
where
	E: Into<Error>,
{
	fn from(e: E) -> Self {
		Self(e.into())
	}
}
impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = StatusCode::INTERNAL_SERVER_ERROR;

		tracing::error!(error = %self.0, source = ?StdError::source(&self.0), "request failed");

		(
			status,
			format!(
				"Something broke! Our devs are already on it! [{}: {}]",
				status.as_u16(),
				status.canonical_reason().unwrap_or_default()
			),
		)
			.into_response()
	}
}
