//! Bot mention and conversation webhooks.

// crates.io
use axum::{Json, extract::State, http::StatusCode};
// self
use crate::{
	demo,
	event::{ConversationEvent, MessageEvent},
	gate::RequestContext,
	server::{AppError, AppState},
};

/// First reply to every mention.
pub const MENTION_REPLY: &str = "Beep boop I'm a bot!";

/// `POST /bot-mention`: answers right away, then walks through the demo in the background.
///
/// The platform resends a mention that is not acknowledged quickly, so the 200 goes out as soon
/// as the first reply is posted.
pub async fn bot_mention(
	State(state): State<AppState>,
	context: RequestContext,
	Json(event): Json<MessageEvent>,
) -> Result<StatusCode, AppError> {
	tracing::info!(
		caller_id = %context.caller_id,
		conversation_id = %event.conversation_id(),
		message_id = %event.message.id,
		"bot mention"
	);

	state.client.reply_with_text(&event, MENTION_REPLY).await?;

	let client = state.client.clone();

	tokio::spawn(async move { demo::run(&client, &event).await });

	Ok(StatusCode::OK)
}

/// `POST /conversation-updated`.
pub async fn conversation_updated(
	State(state): State<AppState>,
	Json(event): Json<ConversationEvent>,
) -> Result<StatusCode, AppError> {
	let installation = state.store.fetch(&event.conversation.id).await?;

	tracing::info!(
		conversation_id = %event.conversation.id,
		change = %event.action,
		installed_by = installation.as_ref().map(|i| i.installed_by.as_str()),
		"a conversation was changed"
	);

	Ok(StatusCode::OK)
}

/// `POST /roster-updated`.
pub async fn roster_updated(
	State(state): State<AppState>,
	Json(event): Json<ConversationEvent>,
) -> Result<StatusCode, AppError> {
	let installation = state.store.fetch(&event.conversation.id).await?;

	tracing::info!(
		conversation_id = %event.conversation.id,
		change = %event.action,
		installed = installation.is_some(),
		"a user joined or left a conversation"
	);

	Ok(StatusCode::OK)
}
