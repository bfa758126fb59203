//! High-level features: reading the mention, formatting, media, cards, and glances.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	api::{StrideClient, User},
	demo::cards,
	document::{
		ApplicationCard, BulletList, CardAction, CodeBlock, Detail, Document, Icon, MediaGroup,
		Panel, Paragraph, mentions_in,
	},
	error::TransportError,
	event::MessageEvent,
};

/// Image uploaded by the media step.
pub const IMAGE_URL: &str = "https://media.giphy.com/media/L12g7V0J62bf2/giphy.gif";
/// Glance updated by the last step.
pub const GLANCE_KEY: &str = "refapp-glance";

const TASK_ICON_URL: &str = "https://ecosystem.atlassian.net/secure/viewavatar?size=xsmall&avatarId=15318&avatarType=issuetype";

/// Runs every showcase step in order.
pub async fn run(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	convert_message_to_plain_text(client, event).await?;
	report_mentions(client, event).await?;

	let sender = report_sender(client, event).await?;

	send_formatted_message(client, event).await?;
	send_image(client, event).await?;
	send_messages_with_actions(client, event).await?;
	send_updatable_message(client, event).await?;
	update_glance(client, event, &sender).await
}

async fn convert_message_to_plain_text(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	client.reply_with_text(event, "Converting the message you just sent to plain text...").await?;

	tracing::info!(text = ?event.message.text, "message in plain text");

	let text = client.convert_doc_to_text(&event.message.body).await?;

	tracing::info!(%text, "message converted to text");

	let document = Document::new().with(
		Paragraph::new().text("In plain text, it looks like this: ").text(format!("\"{text}\"")),
	);

	client.reply(event, &document).await?;

	Ok(())
}

async fn report_mentions(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	let paragraph = mentions_in(&event.message.body).into_iter().fold(
		Paragraph::new().text("The following people were mentioned: "),
		|paragraph, mention| paragraph.mention(mention.id, mention.text),
	);

	client.reply(event, &Document::new().with(paragraph)).await?;

	Ok(())
}

async fn report_sender(client: &StrideClient, event: &MessageEvent) -> Result<User> {
	client.reply_with_text(event, "Getting user details for the sender of the message...").await?;

	let user = client.get_user(&event.cloud_id, &event.sender.id).await?;

	client
		.reply_with_text(event, &format!("This message was sent by: {}", user.display_name))
		.await?;

	Ok(user)
}

async fn send_formatted_message(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	client.reply_with_text(event, "Sending a message with plenty of formatting...").await?;

	let task_icon = Icon::new(TASK_ICON_URL, "Task");
	let document = Document::new()
		.with(
			Paragraph::new()
				.text("Here is some ")
				.strong("bold test")
				.text(" and ")
				.em("text in italics")
				.text(" as well as ")
				.link(" a link", "https://www.atlassian.com")
				.text(" , emojis ")
				.emoji(":smile:")
				.emoji(":rofl:")
				.emoji(":nerd:")
				.text(" and some code: ")
				.code("const i = 0;")
				.text(" and a bullet list"),
		)
		.with(BulletList::new().text_item("With one bullet point").text_item("And another"))
		.with(Panel::info().paragraph(
			Paragraph::new().text("and an info panel with some text, with some more code below"),
		))
		.with(CodeBlock::new("javascript", "const i = 0;\nwhile(true) {\n  i++;\n}"))
		.with(Paragraph::new().text("And a card"))
		.with(
			ApplicationCard::new("With a title")
				.link("https://www.atlassian.com")
				.description("With some description, and a couple of attributes")
				.detail(Detail::new().title("Type").text("Task").icon(task_icon.clone()))
				.detail(Detail::new().title("User").text("Joe Blog").icon(task_icon)),
		);

	client.reply(event, &document).await?;

	Ok(())
}

async fn send_image(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	client.reply_with_text(event, "Uploading an image...").await?;

	let bytes = client
		.http()
		.get(IMAGE_URL)
		.send()
		.await
		.and_then(|response| response.error_for_status())
		.map_err(TransportError::download)?
		.bytes()
		.await
		.map_err(TransportError::download)?;
	let upload = client
		.send_media(&event.cloud_id, event.conversation_id(), "an_image2.jpg", bytes.to_vec())
		.await?;
	let document = Document::new()
		.with(Paragraph::new().text("and here's that image:"))
		.with(MediaGroup::file(upload.data.id, event.conversation_id()));

	client.reply(event, &document).await?;

	Ok(())
}

async fn send_messages_with_actions(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	client.reply_with_text(event, "Sending messages with actions...").await?;

	let call_service = "refapp-action-callService";
	let card = ApplicationCard::new("Another card")
		.link("https://www.atlassian.com")
		.description("With some description, and a couple of actions")
		.action(CardAction::new("Open Dialog", "refapp-action-openDialog"))
		.action(
			CardAction::new("Call Service", call_service)
				.parameters(json!({ "returnError": false, "then": "done" })),
		)
		.action(
			CardAction::new("Call Service then open sidebar", call_service)
				.parameters(json!({ "then": "open sidebar" })),
		)
		.action(CardAction::new("Open Sidebar", "refapp-action-openSidebar"))
		.action(
			CardAction::new("Show error", call_service)
				.parameters(json!({ "returnError": true, "then": "done" })),
		)
		.context("A footer", Some(cards::footer_icon()));

	client.reply(event, &Document::new().with(card)).await?;

	let dialog_link = Document::new().with(Paragraph::new().action(
		"Click me to open a Dialog",
		CardAction::new("open dialog", "refapp-action-openDialog")
			.parameters(json!({ "expenseId": 123 })),
	));

	client.reply(event, &dialog_link).await?;

	Ok(())
}

async fn send_updatable_message(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	client.reply_with_text(event, "Sending a message that updates itself...").await?;
	client.reply(event, &cards::incident_card(None)).await?;

	Ok(())
}

async fn update_glance(client: &StrideClient, event: &MessageEvent, sender: &User) -> Result<()> {
	client.reply_with_text(event, "Updating the glance state...").await?;

	let label = format!("Click me, {} !!", sender.display_name);

	client.update_glance_state(&event.cloud_id, event.conversation_id(), GLANCE_KEY, &label).await?;

	tracing::info!(%label, "glance state updated");

	client.reply_with_text(event, &format!("It should be updated to \"{label}\" -->")).await?;

	Ok(())
}
