//! By-value builders for the block nodes the app composes.

// crates.io
use serde_json::Value;
// self
use crate::document::{
	ActionAttrs, ActionTarget, CardAttrs, CardContext, CardDetail, CardLink, CardText,
	CodeBlockAttrs, EmojiAttrs, Icon, LinkAttrs, Mark, MediaAttrs, MentionAttrs, Node, PanelAttrs,
};

/// Paragraph builder.
#[derive(Clone, Debug, Default)]
pub struct Paragraph(Vec<Node>);
impl Paragraph {
	/// Starts an empty paragraph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends plain text. Empty strings are skipped.
	pub fn text(self, text: impl Into<String>) -> Self {
		self.marked(text, Vec::new())
	}

	/// Appends bold text.
	pub fn strong(self, text: impl Into<String>) -> Self {
		self.marked(text, vec![Mark::Strong])
	}

	/// Appends italic text.
	pub fn em(self, text: impl Into<String>) -> Self {
		self.marked(text, vec![Mark::Em])
	}

	/// Appends inline code.
	pub fn code(self, text: impl Into<String>) -> Self {
		self.marked(text, vec![Mark::Code])
	}

	/// Appends a hyperlink labeled `text`.
	pub fn link(self, text: impl Into<String>, href: impl Into<String>) -> Self {
		self.marked(text, vec![Mark::Link { attrs: LinkAttrs { href: href.into() } }])
	}

	/// Appends text that runs `action` when clicked.
	pub fn action(self, text: impl Into<String>, action: CardAction) -> Self {
		self.marked(text, vec![Mark::Action { attrs: action.0 }])
	}

	/// Appends text carrying arbitrary marks.
	pub fn marked(mut self, text: impl Into<String>, marks: Vec<Mark>) -> Self {
		let text = text.into();

		if !text.is_empty() {
			self.0.push(Node::Text { text, marks });
		}

		self
	}

	/// Appends an emoji by short name, e.g. `:smile:`.
	pub fn emoji(mut self, short_name: impl Into<String>) -> Self {
		self.0.push(Node::Emoji { attrs: EmojiAttrs { short_name: short_name.into() } });

		self
	}

	/// Appends a user mention.
	pub fn mention(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
		self.0.push(Node::Mention { attrs: MentionAttrs { id: id.into(), text: text.into() } });

		self
	}
}
impl From<Paragraph> for Node {
	fn from(paragraph: Paragraph) -> Self {
		Node::Paragraph { content: paragraph.0 }
	}
}

/// Bulleted list builder.
#[derive(Clone, Debug, Default)]
pub struct BulletList(Vec<Node>);
impl BulletList {
	/// Starts an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an item holding a single paragraph of `text`.
	pub fn text_item(mut self, text: impl Into<String>) -> Self {
		self.0.push(Node::ListItem { content: vec![Paragraph::new().text(text).into()] });

		self
	}
}
impl From<BulletList> for Node {
	fn from(list: BulletList) -> Self {
		Node::BulletList { content: list.0 }
	}
}

/// Panel builder.
#[derive(Clone, Debug)]
pub struct Panel {
	panel_type: String,
	content: Vec<Node>,
}
impl Panel {
	/// Starts a panel of the given style.
	pub fn new(panel_type: impl Into<String>) -> Self {
		Self { panel_type: panel_type.into(), content: Vec::new() }
	}

	/// Starts an `info` panel.
	pub fn info() -> Self {
		Self::new("info")
	}

	/// Appends a paragraph.
	pub fn paragraph(mut self, paragraph: Paragraph) -> Self {
		self.content.push(paragraph.into());

		self
	}
}
impl From<Panel> for Node {
	fn from(panel: Panel) -> Self {
		Node::Panel { attrs: PanelAttrs { panel_type: panel.panel_type }, content: panel.content }
	}
}

/// Code block builder.
#[derive(Clone, Debug)]
pub struct CodeBlock {
	language: String,
	text: String,
}
impl CodeBlock {
	/// Creates a block of `text` highlighted as `language`.
	pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
		Self { language: language.into(), text: text.into() }
	}
}
impl From<CodeBlock> for Node {
	fn from(block: CodeBlock) -> Self {
		Node::CodeBlock {
			attrs: CodeBlockAttrs { language: block.language },
			content: vec![Node::Text { text: block.text, marks: Vec::new() }],
		}
	}
}

/// Media group holding one uploaded file.
#[derive(Clone, Debug)]
pub struct MediaGroup(Vec<Node>);
impl MediaGroup {
	/// References the uploaded file `id` stored in `collection`.
	pub fn file(id: impl Into<String>, collection: impl Into<String>) -> Self {
		Self(vec![Node::Media {
			attrs: MediaAttrs { kind: "file".into(), id: id.into(), collection: collection.into() },
		}])
	}
}
impl From<MediaGroup> for Node {
	fn from(group: MediaGroup) -> Self {
		Node::MediaGroup { content: group.0 }
	}
}

/// Card button or action mark.
#[derive(Clone, Debug)]
pub struct CardAction(ActionAttrs);
impl CardAction {
	/// Creates an action labeled `title` that runs the action module `target_key`.
	pub fn new(title: impl Into<String>, target_key: impl Into<String>) -> Self {
		Self(ActionAttrs {
			title: title.into(),
			target: ActionTarget { key: target_key.into() },
			parameters: Value::Null,
		})
	}

	/// Attaches the parameters passed to the action module.
	pub fn parameters(mut self, parameters: Value) -> Self {
		self.0.parameters = parameters;

		self
	}
}

/// Card attribute row builder.
#[derive(Clone, Debug, Default)]
pub struct Detail(CardDetail);
impl Detail {
	/// Starts an empty row.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the row label.
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.0.title = Some(title.into());

		self
	}

	/// Sets the row value.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.0.text = Some(text.into());

		self
	}

	/// Sets the row icon.
	pub fn icon(mut self, icon: Icon) -> Self {
		self.0.icon = Some(icon);

		self
	}
}

/// Application card builder.
#[derive(Clone, Debug)]
pub struct ApplicationCard(CardAttrs);
impl ApplicationCard {
	/// Starts a card titled `title`.
	pub fn new(title: impl Into<String>) -> Self {
		let title = title.into();

		Self(CardAttrs {
			text: title.clone(),
			title: CardText { text: title },
			link: None,
			description: None,
			details: Vec::new(),
			actions: Vec::new(),
			context: None,
		})
	}

	/// Links the title to `url`.
	pub fn link(mut self, url: impl Into<String>) -> Self {
		self.0.link = Some(CardLink { url: url.into() });

		self
	}

	/// Sets the description.
	pub fn description(mut self, text: impl Into<String>) -> Self {
		self.0.description = Some(CardText { text: text.into() });

		self
	}

	/// Appends an attribute row.
	pub fn detail(mut self, detail: Detail) -> Self {
		self.0.details.push(detail.0);

		self
	}

	/// Appends a button.
	pub fn action(mut self, action: CardAction) -> Self {
		self.0.actions.push(action.0);

		self
	}

	/// Sets the footer.
	pub fn context(mut self, text: impl Into<String>, icon: Option<Icon>) -> Self {
		self.0.context = Some(CardContext { text: text.into(), icon });

		self
	}
}
impl From<ApplicationCard> for Node {
	fn from(card: ApplicationCard) -> Self {
		Node::ApplicationCard { attrs: card.0 }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::document::Document;

	#[test]
	fn formatted_paragraph_carries_marks() {
		let node: Node = Paragraph::new()
			.text("Here is some ")
			.strong("bold")
			.link("a link", "https://www.atlassian.com")
			.emoji(":smile:")
			.into();

		assert_eq!(
			serde_json::to_value(node).expect("Node should serialize."),
			json!({
				"type": "paragraph",
				"content": [
					{ "type": "text", "text": "Here is some " },
					{ "type": "text", "text": "bold", "marks": [{ "type": "strong" }] },
					{ "type": "text", "text": "a link", "marks": [{ "type": "link", "attrs": { "href": "https://www.atlassian.com" } }] },
					{ "type": "emoji", "attrs": { "shortName": ":smile:" } },
				],
			})
		);
	}

	#[test]
	fn card_serializes_details_actions_and_footer() {
		let card = ApplicationCard::new("Incident #4253")
			.link("https://www.atlassian.com")
			.description("Something is broken")
			.detail(Detail::new().title("Status").text("In progress"))
			.action(
				CardAction::new("Resolve", "refapp-action-callService-updateMessage")
					.parameters(json!({ "incidentAction": "resolve" })),
			)
			.context("A footer", None);
		let value = serde_json::to_value(Document::new().with(card)).expect("Card should serialize.");
		let attrs = &value["content"][0]["attrs"];

		assert_eq!(value["content"][0]["type"], "applicationCard");
		assert_eq!(attrs["title"]["text"], "Incident #4253");
		assert_eq!(attrs["link"]["url"], "https://www.atlassian.com");
		assert_eq!(attrs["details"][0], json!({ "title": "Status", "text": "In progress" }));
		assert_eq!(attrs["actions"][0]["target"]["key"], "refapp-action-callService-updateMessage");
		assert_eq!(attrs["actions"][0]["parameters"]["incidentAction"], "resolve");
		assert_eq!(attrs["context"], json!({ "text": "A footer" }));
	}

	#[test]
	fn action_without_parameters_omits_the_field() {
		let card = ApplicationCard::new("c").action(CardAction::new("Open", "refapp-action-openDialog"));
		let value = serde_json::to_value(Node::from(card)).expect("Card should serialize.");

		assert!(value["attrs"]["actions"][0].get("parameters").is_none());
	}

	#[test]
	fn media_group_references_the_upload() {
		let value = serde_json::to_value(Node::from(MediaGroup::file("m1", "C1")))
			.expect("Media group should serialize.");

		assert_eq!(
			value,
			json!({
				"type": "mediaGroup",
				"content": [{ "type": "media", "attrs": { "type": "file", "id": "m1", "collection": "C1" } }],
			})
		);
	}
}
