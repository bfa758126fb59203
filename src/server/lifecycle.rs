//! Installation lifecycle callbacks and the app descriptor.

// crates.io
use axum::{
	Json,
	extract::State,
	http::{HeaderMap, StatusCode, header},
	response::IntoResponse,
};
// self
use crate::{
	error::ConfigError,
	event::InstallationEvent,
	server::{AppError, AppState},
	store::{Installation, RecordOutcome},
};

/// Message posted to a conversation right after the app is added to it.
pub const WELCOME_TEXT: &str = "Hi there! Thanks for adding me to this conversation. To see me in action, just mention me in a message.";

/// `POST /installed`: remembers the installation and greets the conversation.
pub async fn installed(
	State(state): State<AppState>,
	Json(event): Json<InstallationEvent>,
) -> Result<StatusCode, AppError> {
	let installation = Installation {
		cloud_id: event.cloud_id.clone(),
		conversation_id: event.resource_id.clone(),
		installed_by: event.user_id.clone(),
	};

	match state.store.record(installation).await? {
		RecordOutcome::Inserted => tracing::info!(
			cloud_id = %event.cloud_id,
			conversation_id = %event.resource_id,
			installed_by = %event.user_id,
			"app installed in a conversation"
		),
		RecordOutcome::AlreadyInstalled => tracing::info!(
			conversation_id = %event.resource_id,
			"app already installed in conversation"
		),
	}

	state.client.send_text_message(&event.cloud_id, &event.resource_id, WELCOME_TEXT).await?;

	Ok(StatusCode::OK)
}

/// `POST /uninstalled`: forgets the installation. The conversation can no longer be posted to.
pub async fn uninstalled(
	State(state): State<AppState>,
	Json(event): Json<InstallationEvent>,
) -> Result<StatusCode, AppError> {
	let removed = state.store.remove(&event.resource_id).await?;

	tracing::info!(
		conversation_id = %event.resource_id,
		known = removed.is_some(),
		"app uninstalled from a conversation"
	);

	Ok(StatusCode::NO_CONTENT)
}

/// `GET /descriptor`: the descriptor template with `${host}` pointing back at this app.
pub async fn descriptor(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
	let path = state.descriptor_path.as_path();
	let template = tokio::fs::read_to_string(path).await.map_err(|source| {
		ConfigError::DescriptorTemplate { path: path.display().to_string(), source }
	})?;
	let host = headers.get(header::HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");

	Ok(([(header::CONTENT_TYPE, "application/json")], render_descriptor(&template, host)))
}

/// Substitutes every `${host}` in `template` with `https://<host>`.
pub fn render_descriptor(template: &str, host: &str) -> String {
	template.replace("${host}", &format!("https://{host}"))
}
