//! Cards posted by the demo and rebuilt by the action services.

// crates.io
use serde_json::json;
// self
use crate::{
	document::{ApplicationCard, CardAction, Detail, Document, Icon},
	event::IncidentAction,
};

/// Action module that rewrites the incident card in place.
pub const UPDATE_MESSAGE_ACTION: &str = "refapp-action-callService-updateMessage";

const INCIDENT_TITLE: &str = "Incident #4253";
const FOOTER_ICON_URL: &str = "https://image.ibb.co/fPPAB5/Stride_White_On_Blue.png";

/// Footer used by every demo card.
pub fn footer_icon() -> Icon {
	Icon::new(FOOTER_ICON_URL, "Stride")
}

/// Incident card in the state reached through `action`; `None` is the freshly opened incident.
pub fn incident_card(action: Option<IncidentAction>) -> Document {
	let mut card = ApplicationCard::new(INCIDENT_TITLE)
		.link("https://www.atlassian.com")
		.description("Something is broken");

	card = match action {
		None => card.action(transition("Ack", IncidentAction::Ack)).action(transition(
			"Resolve",
			IncidentAction::Resolve,
		)),
		Some(IncidentAction::Ack) => card
			.detail(Detail::new().title("Status").text("In progress"))
			.detail(Detail::new().title("Assigned to").text("Joe Blog"))
			.action(transition("Resolve", IncidentAction::Resolve)),
		Some(IncidentAction::Resolve) => card
			.detail(Detail::new().title("Status").text("Resolved"))
			.action(transition("Reopen", IncidentAction::Reopen)),
		Some(IncidentAction::Reopen) => card
			.detail(Detail::new().title("Status").text("Reopened"))
			.action(transition("Ack", IncidentAction::Ack))
			.action(transition("Resolve", IncidentAction::Resolve)),
	};

	Document::new().with(card.context("A footer", Some(footer_icon())))
}

fn transition(title: &str, action: IncidentAction) -> CardAction {
	CardAction::new(title, UPDATE_MESSAGE_ACTION)
		.parameters(json!({ "incidentAction": action.as_str() }))
}
