//! Walk-through the app runs after a bot mention: first the high-level showcase, then every
//! REST wrapper in turn. The first failing step is logged and ends the walk-through.

pub mod cards;
pub mod showcase;
pub mod walkthrough;

// self
use crate::{_prelude::*, api::StrideClient, event::MessageEvent};

/// Final message of the walk-through.
pub const DONE_TEXT: &str = "OK, I'm done. Thanks for watching!";

/// Runs the whole walk-through for `event`, logging instead of returning failures.
pub async fn run(client: &StrideClient, event: &MessageEvent) {
	match run_steps(client, event).await {
		Ok(()) => tracing::info!("all done"),
		Err(e) => tracing::error!(
			error = %e,
			source = ?StdError::source(&e),
			conversation_id = %event.conversation_id(),
			"something went wrong"
		),
	}
}

async fn run_steps(client: &StrideClient, event: &MessageEvent) -> Result<()> {
	showcase::run(client, event).await?;
	walkthrough::run(client, event).await?;
	client.reply_with_text(event, DONE_TEXT).await?;

	Ok(())
}
