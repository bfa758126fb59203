//! Response and request bodies of the Stride REST API.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Conversation details.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
	/// Conversation id.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Topic line.
	#[serde(default)]
	pub topic: Option<String>,
	/// `public` or `private`.
	#[serde(default)]
	pub privacy: Option<String>,
	/// Links keyed by conversation id.
	#[serde(rename = "_links", default)]
	pub links: Map<String, Value>,
}
impl Conversation {
	/// Web link to this conversation, when the API supplied one.
	pub fn web_link(&self) -> Option<&str> {
		self.links.get(&self.id).and_then(Value::as_str)
	}
}

/// Body of a conversation creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewConversation {
	/// Display name.
	pub name: String,
	/// `public` or `private`.
	pub privacy: String,
	/// Topic line.
	pub topic: String,
}
impl NewConversation {
	/// Public conversation named `name` with an empty topic.
	pub fn public(name: impl Into<String>) -> Self {
		Self { name: name.into(), privacy: "public".into(), topic: String::new() }
	}
}

/// Identifier returned by creation endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
	/// New resource id.
	pub id: String,
}

/// Latest messages of a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
	/// Messages, newest first.
	#[serde(default)]
	pub messages: Vec<Value>,
}

/// Member ids of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRoster {
	/// User ids.
	#[serde(default)]
	pub values: Vec<String>,
}

/// User profile from the SCIM users API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// User id.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub display_name: String,
	/// Login name.
	#[serde(default)]
	pub user_name: Option<String>,
}

/// Result of a media upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
	/// Uploaded item.
	pub data: Created,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectConversation {
	#[serde(default)]
	pub(crate) id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleContext<'a> {
	pub(crate) cloud_id: &'a str,
	pub(crate) conversation_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GlanceState<'a> {
	pub(crate) context: ModuleContext<'a>,
	pub(crate) label: &'a str,
	pub(crate) metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigurationState<'a> {
	pub(crate) context: ModuleContext<'a>,
	pub(crate) configured: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageBody<'a, D> {
	pub(crate) body: &'a D,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkdownInput<'a> {
	pub(crate) input: &'a str,
}
