//! Observability helpers shared by the REST client, the token cache, and the webhook gate.
//!
//! Every outbound operation runs inside a `stride.op` span carrying the `op` and `stage`
//! fields. With the `metrics` feature enabled, the `stride_op_total` counter is incremented for
//! every attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
	/// Client-credentials token fetch.
	TokenFetch,
	/// Inbound token verification.
	VerifyInbound,
	/// Post a document to a conversation.
	SendMessage,
	/// Replace an existing message.
	UpdateMessage,
	/// Post a document to a user's direct conversation.
	SendPrivateMessage,
	/// Read conversation details.
	GetConversation,
	/// Create a conversation.
	CreateConversation,
	/// Archive a conversation.
	ArchiveConversation,
	/// Read the latest messages of a conversation.
	GetConversationHistory,
	/// Read the member ids of a conversation.
	GetConversationRoster,
	/// Upload a file into a conversation.
	SendMedia,
	/// Update a glance label.
	UpdateGlanceState,
	/// Update a configuration module state.
	UpdateConfigurationState,
	/// Read a user profile.
	GetUser,
	/// Render a document as plain text.
	ConvertDocToText,
	/// Convert markdown into a document.
	ConvertMarkdownToDoc,
}
impl Op {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Op::TokenFetch => "getAccessToken",
			Op::VerifyInbound => "validateJWT",
			Op::SendMessage => "sendMessage",
			Op::UpdateMessage => "updateMessage",
			Op::SendPrivateMessage => "sendPrivateMessage",
			Op::GetConversation => "getConversation",
			Op::CreateConversation => "createConversation",
			Op::ArchiveConversation => "archiveConversation",
			Op::GetConversationHistory => "getConversationHistory",
			Op::GetConversationRoster => "getConversationRoster",
			Op::SendMedia => "sendMedia",
			Op::UpdateGlanceState => "updateGlanceState",
			Op::UpdateConfigurationState => "updateConfigurationState",
			Op::GetUser => "getUser",
			Op::ConvertDocToText => "convertDocToText",
			Op::ConvertMarkdownToDoc => "convertMarkdownToDoc",
		}
	}
}
impl Display for Op {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an [`OpSpan`] and records its attempt and outcome.
pub async fn observe<T, Fut>(op: Op, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(op, stage);

	record_op_outcome(op, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_op_outcome(op, OpOutcome::Success),
		Err(e) => {
			::tracing::warn!(op = op.as_str(), error = %e, "request failed");
			record_op_outcome(op, OpOutcome::Failure);
		},
	}

	result
}
