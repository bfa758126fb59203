//! Atlassian Document Format (ADF) model used for every message the app posts.
//!
//! [`Document`] serializes to `{"version": 1, "type": "doc", "content": [...]}`. Node and mark
//! kinds the app never builds are kept whole by the `Other` fallbacks, but unknown attributes on
//! modeled kinds are dropped; bodies received in events are forwarded as raw JSON instead.

pub mod builder;

pub use builder::*;

// crates.io
use serde_json::Value;
// self
use crate::_prelude::*;

/// Placeholder replaced by a mention in [`Document::mentioning`].
pub const MENTION_PLACEHOLDER: &str = "{{MENTION}}";

/// Root of an ADF document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
	/// Format version, always `1`.
	pub version: u32,
	#[serde(rename = "type")]
	kind: DocKind,
	/// Top-level block nodes.
	pub content: Vec<Node>,
}
impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self { version: 1, kind: DocKind::Doc, content: Vec::new() }
	}

	/// Appends a block node.
	pub fn with(mut self, node: impl Into<Node>) -> Self {
		self.push(node);

		self
	}

	/// Appends a block node in place.
	pub fn push(&mut self, node: impl Into<Node>) {
		self.content.push(node.into());
	}

	/// Single-paragraph document holding `text`.
	pub fn from_text(text: impl Into<String>) -> Self {
		Self::new().with(Paragraph::new().text(text))
	}

	/// Builds a single-paragraph document from `template`, replacing every
	/// [`MENTION_PLACEHOLDER`] with a mention of `mention`.
	///
	/// A template without any placeholder yields the mention followed by the text. Empty text
	/// segments are dropped.
	pub fn mentioning(template: &str, mention: &MentionAttrs) -> Self {
		let mut parts = template.split(MENTION_PLACEHOLDER);
		let mut paragraph = Paragraph::new();

		if template.contains(MENTION_PLACEHOLDER) {
			if let Some(head) = parts.next() {
				paragraph = paragraph.text(head);
			}
		}
		for part in parts {
			paragraph = paragraph.mention(&mention.id, &mention.text).text(part);
		}

		Self::new().with(paragraph)
	}
}
impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DocKind {
	Doc,
}

/// Block and inline nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
	/// Paragraph of inline nodes.
	Paragraph {
		/// Inline children.
		#[serde(default)]
		content: Vec<Node>,
	},
	/// Text run.
	Text {
		/// Literal text.
		text: String,
		/// Formatting marks.
		#[serde(default, skip_serializing_if = "Vec::is_empty")]
		marks: Vec<Mark>,
	},
	/// User mention.
	Mention {
		/// Mentioned user.
		attrs: MentionAttrs,
	},
	/// Emoji by short name.
	Emoji {
		/// Emoji reference.
		attrs: EmojiAttrs,
	},
	/// Bulleted list of [`Node::ListItem`].
	BulletList {
		/// List items.
		content: Vec<Node>,
	},
	/// Single list entry.
	ListItem {
		/// Block children.
		content: Vec<Node>,
	},
	/// Colored panel.
	Panel {
		/// Panel style.
		attrs: PanelAttrs,
		/// Block children.
		content: Vec<Node>,
	},
	/// Code block.
	CodeBlock {
		/// Highlighting hint.
		attrs: CodeBlockAttrs,
		/// Text children.
		#[serde(default)]
		content: Vec<Node>,
	},
	/// Card with optional details and actions.
	ApplicationCard {
		/// Card content.
		attrs: CardAttrs,
	},
	/// Group of media items.
	MediaGroup {
		/// [`Node::Media`] children.
		content: Vec<Node>,
	},
	/// Uploaded media reference.
	Media {
		/// Media location.
		attrs: MediaAttrs,
	},
	/// Any node kind not modeled above, kept verbatim.
	#[serde(untagged)]
	Other(Value),
}

/// Inline formatting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
	/// Bold.
	Strong,
	/// Italic.
	Em,
	/// Inline code.
	Code,
	/// Hyperlink.
	Link {
		/// Link target.
		attrs: LinkAttrs,
	},
	/// Clickable text running an app action.
	Action {
		/// Action definition.
		attrs: ActionAttrs,
	},
	/// Any mark kind not modeled above, kept verbatim.
	#[serde(untagged)]
	Other(Value),
}

/// Mention target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionAttrs {
	/// User id.
	pub id: String,
	/// Display text, usually the user's name.
	#[serde(default)]
	pub text: String,
}

/// Emoji reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiAttrs {
	/// Short name such as `:smile:`.
	pub short_name: String,
}

/// Panel style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelAttrs {
	/// `info`, `note`, `tip`, `warning`...
	pub panel_type: String,
}

/// Code block language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
	/// Highlighting language.
	pub language: String,
}

/// Link target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttrs {
	/// URL.
	pub href: String,
}

/// App action attached to a card button or a text mark.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionAttrs {
	/// Button label.
	pub title: String,
	/// Action module to run.
	pub target: ActionTarget,
	/// Parameters passed to the action module.
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub parameters: Value,
}

/// Reference to an action module declared in the app descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTarget {
	/// Module key.
	pub key: String,
}

/// Uploaded media location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttrs {
	/// Media kind, `file` for uploads.
	#[serde(rename = "type")]
	pub kind: String,
	/// Media id returned by the upload.
	pub id: String,
	/// Collection the media belongs to, the conversation id for uploads.
	pub collection: String,
}

/// Icon shown in cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
	/// Image URL.
	pub url: String,
	/// Accessible label.
	pub label: String,
}
impl Icon {
	/// Creates an icon.
	pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
		Self { url: url.into(), label: label.into() }
	}
}

/// Content of an application card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardAttrs {
	/// Fallback text.
	pub text: String,
	/// Title.
	pub title: CardText,
	/// Link opened by the title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<CardLink>,
	/// Description below the title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<CardText>,
	/// Attribute rows.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub details: Vec<CardDetail>,
	/// Buttons.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub actions: Vec<ActionAttrs>,
	/// Footer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context: Option<CardContext>,
}

/// Text wrapper used by card titles and descriptions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardText {
	/// Text.
	pub text: String,
}

/// Card link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLink {
	/// URL.
	pub url: String,
}

/// Card attribute row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetail {
	/// Row label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Row value.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Row icon.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<Icon>,
}

/// Card footer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContext {
	/// Footer text.
	pub text: String,
	/// Footer icon.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<Icon>,
}

/// Collects every mention node found anywhere inside `payload`.
///
/// Objects with `"type": "mention"` and an `attrs.id` are reported in document order; the walk
/// descends into every object and array, so mentions nested in marks or cards are found too.
pub fn mentions_in(payload: &Value) -> Vec<MentionAttrs> {
	fn walk(value: &Value, found: &mut Vec<MentionAttrs>) {
		match value {
			Value::Object(map) => {
				if map.get("type").and_then(Value::as_str) == Some("mention") {
					let attrs = map.get("attrs");
					let id = attrs.and_then(|a| a.get("id")).and_then(Value::as_str);
					let text = attrs.and_then(|a| a.get("text")).and_then(Value::as_str);

					if let Some(id) = id {
						found.push(MentionAttrs {
							id: id.to_owned(),
							text: text.unwrap_or_default().to_owned(),
						});
					}
				}

				map.values().for_each(|child| walk(child, found));
			},
			Value::Array(items) => items.iter().for_each(|child| walk(child, found)),
			_ => {},
		}
	}

	let mut found = Vec::new();

	walk(payload, &mut found);

	found
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn joe() -> MentionAttrs {
		MentionAttrs { id: "U1".into(), text: "Joe".into() }
	}

	#[test]
	fn text_document_matches_the_wire_shape() {
		let value = serde_json::to_value(Document::from_text("Hello, world!"))
			.expect("Document should serialize.");

		assert_eq!(
			value,
			json!({
				"version": 1,
				"type": "doc",
				"content": [{
					"type": "paragraph",
					"content": [{ "type": "text", "text": "Hello, world!" }],
				}],
			})
		);
	}

	#[test]
	fn mention_placeholders_are_replaced_in_place() {
		let doc = Document::mentioning("Hello {{MENTION}}, thanks!", &joe());
		let value = serde_json::to_value(&doc).expect("Document should serialize.");

		assert_eq!(
			value["content"][0]["content"],
			json!([
				{ "type": "text", "text": "Hello " },
				{ "type": "mention", "attrs": { "id": "U1", "text": "Joe" } },
				{ "type": "text", "text": ", thanks!" },
			])
		);
	}

	#[test]
	fn template_without_placeholder_leads_with_the_mention() {
		let doc = Document::mentioning("hi", &joe());

		assert_eq!(
			doc.content,
			vec![Node::Paragraph {
				content: vec![
					Node::Mention { attrs: joe() },
					Node::Text { text: "hi".into(), marks: Vec::new() },
				],
			}]
		);
	}

	#[test]
	fn trailing_placeholder_drops_the_empty_segment() {
		let doc = Document::mentioning("See {{MENTION}}", &joe());

		assert_eq!(
			doc.content,
			vec![Node::Paragraph {
				content: vec![
					Node::Text { text: "See ".into(), marks: Vec::new() },
					Node::Mention { attrs: joe() },
				],
			}]
		);
	}

	#[test]
	fn unknown_nodes_survive_a_round_trip() {
		let raw = json!({
			"version": 1,
			"type": "doc",
			"content": [
				{ "type": "heading", "attrs": { "level": 1 }, "content": [{ "type": "text", "text": "T" }] },
				{ "type": "paragraph", "content": [
					{ "type": "text", "text": "x", "marks": [{ "type": "strong" }, { "type": "subsup", "attrs": { "type": "sub" } }] },
				] },
			],
		});
		let doc: Document = serde_json::from_value(raw.clone()).expect("Document should decode.");

		assert!(matches!(doc.content[0], Node::Other(_)));
		assert!(matches!(doc.content[1], Node::Paragraph { .. }));
		assert_eq!(serde_json::to_value(&doc).expect("Document should serialize."), raw);
	}

	#[test]
	fn mentions_are_collected_from_nested_payloads() {
		let payload = json!({
			"cloudId": "T1",
			"message": {
				"body": {
					"content": [{
						"type": "paragraph",
						"content": [
							{ "type": "mention", "attrs": { "id": "bot", "text": "@refapp" } },
							{ "type": "text", "text": " and " },
							{ "type": "mention", "attrs": { "id": "U2", "text": "@Ann" } },
						],
					}],
				},
			},
		});
		let ids = mentions_in(&payload).into_iter().map(|m| m.id).collect::<Vec<_>>();

		assert_eq!(ids, ["bot", "U2"]);
	}
}
