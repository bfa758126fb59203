//! Dialog, sidebar, and glance modules.

// crates.io
use axum::{Json, response::Redirect};
use serde_json::{Value, json};

/// Initial glance label.
pub const GLANCE_LABEL: &str = "Click me!";

/// `GET /module/dialog`.
pub async fn dialog() -> Redirect {
	Redirect::to("/app-module-dialog.html")
}

/// `GET /module/sidebar`.
pub async fn sidebar() -> Redirect {
	Redirect::to("/app-module-sidebar.html")
}

/// `GET /module/glance/state`: the label shown before the app updates it.
pub async fn glance_state() -> Json<Value> {
	Json(json!({ "label": { "value": GLANCE_LABEL } }))
}
