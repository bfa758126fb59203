//! One step per REST wrapper, each announced in the conversation.

// std
use std::time::Duration as StdDuration;
// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	api::{Conversation, NewConversation, StrideClient, User, text_to_doc},
	document::{Document, Paragraph},
	event::MessageEvent,
};

/// Template used by the mention steps.
pub const PRIVATE_MESSAGE_TEMPLATE: &str =
	"Hello {{MENTION}}, thanks for taking the Stride tutorial!";

/// Delay between creating a conversation and using it; the app is installed there
/// asynchronously.
const CONVERSATION_SETTLE_DELAY: StdDuration = StdDuration::from_secs(2);

/// Runs every step in order.
pub async fn run(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	let cloud_id = event.cloud_id.as_str();
	let conversation_id = event.conversation_id();

	client.reply_with_text(event, "That was nice, wasn't it?").await?;
	client
		.reply_with_text(
			event,
			"Now let me walk you through the lower level functions available in the tutorial \"refapp\":",
		)
		.await?;

	step("sendTextMessage");
	client
		.send_text_message(cloud_id, conversation_id, "demo - sendTextMessage() - Hello, world!")
		.await?;

	step("sendMessage");
	client
		.send_message(
			cloud_id,
			conversation_id,
			&Document::from_text("demo - sendMessage() - Hello, world!"),
		)
		.await?;

	step("replyWithText");
	client.reply_with_text(event, "demo - replyWithText() - Hello, world!").await?;

	step("reply");
	client.reply(event, &text_to_doc("demo - reply() - Hello, world!")?).await?;

	step("getUser");

	let user = client.get_user(cloud_id, &event.sender.id).await?;

	tracing::debug!(?user, "getUser()");
	client
		.reply_with_text(event, &format!("demo - getUser() - your name is \"{}\"", user.display_name))
		.await?;

	step("sendPrivateMessage");
	send_private_message(client, event, &user).await?;

	step("getConversation");

	let conversation = client.get_conversation(cloud_id, conversation_id).await?;

	client
		.reply_with_text(
			event,
			&format!(
				"demo - getConversation() - current conversation name is \"{}\"",
				conversation.name
			),
		)
		.await?;

	step("createConversation");

	let created = create_conversation(client, event).await?;

	step("archiveConversation");

	let archived = client.archive_conversation(cloud_id, &created.id).await?;

	tracing::debug!(%archived, "archiveConversation()");
	client
		.reply_with_text(
			event,
			&format!("demo - archiveConversation() - archived conversation \"{}\"", created.name),
		)
		.await?;

	step("getConversationHistory");

	let history = client.get_conversation_history(cloud_id, conversation_id).await?;

	client
		.reply_with_text(
			event,
			&format!(
				"demo - getConversationHistory() - seen {} recent message(s)",
				history.messages.len()
			),
		)
		.await?;

	step("getConversationRoster");

	let roster = client.get_conversation_roster(cloud_id, conversation_id).await?;
	let members =
		future::try_join_all(roster.values.iter().map(|id| client.get_user(cloud_id, id))).await?;
	let names = members.iter().map(|member| member.display_name.as_str()).collect::<Vec<_>>();

	client
		.reply_with_text(
			event,
			&format!(
				"demo - getConversationRoster() - seen {} users: {}",
				members.len(),
				names.join(", ")
			),
		)
		.await?;

	step("createDocMentioningUser");

	let document = client
		.doc_mentioning_user(
			cloud_id,
			&user.id,
			"demo - createDocMentioningUser() - See {{MENTION}}, I can do it!",
		)
		.await?;

	client.reply(event, &document).await?;

	step("convertDocToText");

	let document = Document::new().with(
		Paragraph::new()
			.text("demo - convertDocToText() - this an ADF document with a link: ")
			.link("https://www.atlassian.com/", "https://www.atlassian.com/"),
	);

	client.reply(event, &document).await?;

	let text = client.convert_doc_to_text(&document).await?;

	client.reply_with_text(event, &format!("{text} <-- converted to text!")).await?;

	step("convertMarkdownToDoc");

	let document = client
		.convert_markdown_to_doc(
			"Here's some **markdown**: Hello *world*, we hope you're enjoying [Stride](https://www.stride.com)",
		)
		.await?;

	client.reply_with_text(event, "demo - convertMarkdownToDoc()").await?;
	client.reply(event, &document).await?;

	Ok(())
}

fn step(name: &str) {
	tracing::info!(step = name, "walkthrough step");
}

async fn send_private_message(
	client: &StrideClient,
	event: &MessageEvent,
	user: &User,
) -> Result<()> {
	client
		.reply_with_text(event, "demo - sendPrivateMessage() - sending you a private message…")
		.await?;

	let sent = async {
		let document =
			client.doc_mentioning_user(&event.cloud_id, &user.id, PRIVATE_MESSAGE_TEMPLATE).await?;

		client.send_private_message(&event.cloud_id, &user.id, &document).await
	}
	.await;

	if let Err(e) = sent {
		tracing::warn!(error = %e, "private message failed");
		client
			.reply_with_text(
				event,
				"Didn't work, but maybe you closed our private conversation? Try re-opening it... (please ;)",
			)
			.await?;
	}

	Ok(())
}

async fn create_conversation(client: &StrideClient, event: &MessageEvent) -> Result<Conversation> {
	let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
	let created = client
		.create_conversation(
			&event.cloud_id,
			&NewConversation::public(format!("Stride-tutorial-Conversation-{millis}")),
		)
		.await?;

	tokio::time::sleep(CONVERSATION_SETTLE_DELAY).await;

	let conversation = client.get_conversation(&event.cloud_id, &created.id).await?;

	client
		.send_text_message(
			&event.cloud_id,
			&conversation.id,
			"demo - createConversation() - Hello, conversation!",
		)
		.await?;

	let mut paragraph = Paragraph::new().text(format!(
		"demo - createConversation() - conversation created with name \"{}\". ",
		conversation.name
	));

	if let Some(link) = conversation.web_link() {
		paragraph = paragraph.text("Find it ").link("here", link);
	}

	client.reply(event, &Document::new().with(paragraph)).await?;

	Ok(conversation)
}
