//! Card action services.

// crates.io
use axum::{
	Json,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::{Value, json};
// self
use crate::{
	demo::cards,
	event::{ActionEvent, ActionResponse},
	gate::RequestContext,
	server::{AppError, AppState},
};

/// `POST /module/action/refapp-service`: confirms the click (or fails it on request), then
/// reports the parameters in the conversation.
pub async fn call_service(
	State(state): State<AppState>,
	context: RequestContext,
	Json(event): Json<ActionEvent>,
) -> Response {
	tracing::info!(
		caller_id = %context.caller_id,
		then = ?event.parameters.then,
		"received a call from an action in a message"
	);

	let status =
		if event.parameters.return_error { StatusCode::FORBIDDEN } else { StatusCode::OK };
	let response = ActionResponse::for_parameters(&event.parameters);
	let text = format!(
		"A button was clicked! The following parameters were passed: {}",
		serde_json::to_string(&event.parameters).unwrap_or_default()
	);
	let client = state.client.clone();

	tokio::spawn(async move {
		if let Err(e) =
			client.send_text_message(&context.tenant_id, &context.conversation_id, &text).await
		{
			tracing::warn!(error = %e, "failed to report the clicked action");
		}
	});

	(status, Json(response)).into_response()
}

/// `POST /module/action/refapp-service-updateMessage`: replaces the incident card with the
/// state the clicked action moved it to.
pub async fn update_message(
	State(state): State<AppState>,
	context: RequestContext,
	Json(event): Json<ActionEvent>,
) -> Result<Json<Value>, AppError> {
	let message_id = event.context.map(|c| c.message.mid).unwrap_or_default();
	let incident = event.parameters.incident();

	tracing::info!(%message_id, ?incident, "updating the incident card");

	state
		.client
		.update_message(
			&context.tenant_id,
			&context.conversation_id,
			&message_id,
			&cards::incident_card(incident),
		)
		.await?;

	Ok(Json(json!({})))
}
