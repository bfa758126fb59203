//! Typed webhook payloads sent by the platform and the replies the app returns to them.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Body of the `installed` and `uninstalled` lifecycle callbacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationEvent {
	/// Site the conversation belongs to.
	#[serde(default)]
	pub cloud_id: String,
	/// User who installed or removed the app.
	#[serde(default)]
	pub user_id: String,
	/// Conversation id.
	pub resource_id: String,
}

/// Conversation reference embedded in event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRef {
	/// Conversation id.
	pub id: String,
}

/// Message author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
	/// User id.
	pub id: String,
}

/// Message carried by a bot mention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRef {
	/// Message id.
	pub id: String,
	/// Plain-text rendition supplied by the platform.
	#[serde(default)]
	pub text: Option<String>,
	/// Message document, kept raw so unknown node kinds are preserved.
	#[serde(default)]
	pub body: Value,
}

/// Body of the bot mention callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
	/// Site id.
	pub cloud_id: String,
	/// Conversation the mention happened in.
	pub conversation: ConversationRef,
	/// Author of the mention.
	pub sender: Sender,
	/// The message itself.
	pub message: MessageRef,
}
impl MessageEvent {
	/// Conversation id replies go to.
	pub fn conversation_id(&self) -> &str {
		&self.conversation.id
	}
}

/// Body of the conversation and roster webhooks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationEvent {
	/// Conversation that changed.
	pub conversation: ConversationRef,
	/// Change description.
	#[serde(default)]
	pub action: Value,
}

/// Parameters attached to a card action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameters {
	/// Ask the service to answer with an error.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub return_error: bool,
	/// Follow-up step, e.g. `open sidebar`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub then: Option<String>,
	/// Conversation opened by the `open conversation` follow-up.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub conversation_id: Option<String>,
	/// Transition requested on the incident card.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub incident_action: Option<String>,
	/// Any other parameter.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl ActionParameters {
	/// Follow-up requested by `then`, if recognized.
	pub fn next_action(&self) -> Option<NextAction> {
		let target = match self.then.as_deref()? {
			"open sidebar" => NextTarget::Key { key: "refapp-action-openSidebar".into() },
			"open dialog" => NextTarget::OpenDialog { key: "refapp-dialog".into() },
			"open conversation" =>
				NextTarget::OpenConversation { conversation_id: self.conversation_id.clone() },
			"open highlights" => NextTarget::OpenHighlights {},
			"open files and links" => NextTarget::OpenFilesAndLinks {},
			_ => return None,
		};

		Some(NextAction { target })
	}

	/// Requested incident card transition.
	pub fn incident(&self) -> Option<IncidentAction> {
		self.incident_action.as_deref()?.parse().ok()
	}
}

/// Message an action was triggered from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
	/// Message id.
	pub mid: String,
}

/// Context of an action callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionContext {
	/// Source message.
	pub message: ActionMessage,
}

/// Body of the action service callbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
	/// Action parameters.
	#[serde(default)]
	pub parameters: ActionParameters,
	/// Source message, present for card actions.
	#[serde(default)]
	pub context: Option<ActionContext>,
}

/// Incident card transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncidentAction {
	/// Acknowledge.
	Ack,
	/// Resolve.
	Resolve,
	/// Reopen.
	Reopen,
}
impl IncidentAction {
	/// Parameter value for this transition.
	pub const fn as_str(self) -> &'static str {
		match self {
			IncidentAction::Ack => "ack",
			IncidentAction::Resolve => "resolve",
			IncidentAction::Reopen => "reopen",
		}
	}
}
impl FromStr for IncidentAction {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ack" => Ok(IncidentAction::Ack),
			"resolve" => Ok(IncidentAction::Resolve),
			"reopen" => Ok(IncidentAction::Reopen),
			_ => Err(()),
		}
	}
}

/// Reply to an action service call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
	/// Confirmation shown to the clicking user.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Error shown to the clicking user.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Follow-up opened by the client.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub next_action: Option<NextAction>,
}
impl ActionResponse {
	/// Builds the answer for `parameters`.
	pub fn for_parameters(parameters: &ActionParameters) -> Self {
		let (message, error) = if parameters.return_error {
			(None, Some("Things failed because of some reason".to_owned()))
		} else {
			(Some("Done!".to_owned()), None)
		};

		Self { message, error, next_action: parameters.next_action() }
	}
}

/// Follow-up opened after an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NextAction {
	/// What to open.
	pub target: NextTarget,
}

/// Things a follow-up can open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NextTarget {
	/// Dialog module.
	OpenDialog {
		/// Dialog key.
		key: String,
	},
	/// Another conversation.
	OpenConversation {
		/// Conversation id.
		#[serde(rename = "conversationId")]
		conversation_id: Option<String>,
	},
	/// Highlights panel.
	OpenHighlights {},
	/// Files and links panel.
	OpenFilesAndLinks {},
	/// Action module by key.
	#[serde(untagged)]
	Key {
		/// Action key.
		key: String,
	},
}
