//! Stride REST client. Every call is bearer-authenticated with the access token held by the
//! client's own [`TokenCache`]; concurrent calls share a single token fetch.

pub mod model;

pub use model::*;

// crates.io
use reqwest::{
	Method, RequestBuilder,
	header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	config::AppConfig,
	document::{Document, MentionAttrs},
	error::{ApiError, ConfigError, TransportError},
	event::MessageEvent,
	http::ReqwestHttpClient,
	oauth::ClientCredentials,
	obs::{self, Op},
	token::{TokenCache, TokenSecret},
};

/// Async client for the Stride REST API.
pub struct StrideClient {
	base_url: Url,
	http: ReqwestHttpClient,
	tokens: TokenCache,
}
impl StrideClient {
	/// Builds a client for the environment and credentials in `config`.
	pub fn new(config: &AppConfig) -> Result<Self> {
		let http = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Self::with_http_client(
			config.api_base_url()?,
			&config.client_id,
			&config.client_secret,
			ReqwestHttpClient::with_client(http),
		)
	}

	/// Builds a client whose API and token endpoint live under `base_url`.
	pub fn with_http_client(
		base_url: Url,
		client_id: &str,
		client_secret: &str,
		http: ReqwestHttpClient,
	) -> Result<Self> {
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase(base_url.into()).into());
		}

		let token_endpoint = endpoint(&base_url, &["oauth", "token"])?;
		let source =
			ClientCredentials::new(&token_endpoint, client_id, client_secret, http.clone())?;

		Ok(Self { base_url, http, tokens: TokenCache::new(Arc::new(source)) })
	}

	/// Base URL every endpoint is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Underlying HTTP client, for requests outside the Stride API.
	pub fn http(&self) -> &ReqwestClient {
		&self.http
	}

	/// Access-token cache shared by every call.
	pub fn tokens(&self) -> &TokenCache {
		&self.tokens
	}

	/// Returns a valid access token, fetching one only when the cached one is stale.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.tokens.access_token().await
	}

	/// Posts `document` to a conversation.
	pub async fn send_message(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		document: &Document,
	) -> Result<Value> {
		const OP: Op = Op::SendMessage;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;

		obs::observe(OP, "request", async {
			let url =
				self.url(&["site", cloud_id, "conversation", conversation_id, "message"])?;
			let request =
				self.authorized(Method::POST, url).await?.json(&MessageBody { body: document });

			decode_value(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Replaces an existing message with `document`.
	pub async fn update_message(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		message_id: &str,
		document: &Document,
	) -> Result<Value> {
		const OP: Op = Op::UpdateMessage;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;
		require(OP, "messageId", message_id)?;

		obs::observe(OP, "request", async {
			let url = self.url(&[
				"site",
				cloud_id,
				"conversation",
				conversation_id,
				"message",
				message_id,
			])?;
			let request =
				self.authorized(Method::PUT, url).await?.json(&MessageBody { body: document });

			decode_value(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Posts `document` to the direct conversation with `user_id`.
	///
	/// Looking the conversation up also installs the app there, so the first call for a user
	/// may fail while that installation is still in progress.
	pub async fn send_private_message(
		&self,
		cloud_id: &str,
		user_id: &str,
		document: &Document,
	) -> Result<Value> {
		const OP: Op = Op::SendPrivateMessage;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "userId", user_id)?;

		obs::observe(OP, "request", async {
			let url = self.url(&["site", cloud_id, "conversation", "user", user_id])?;
			let request = self.authorized(Method::GET, url).await?;
			let direct: DirectConversation = decode(OP, &dispatch(OP, request).await?)?;
			let conversation_id = direct
				.id
				.filter(|id| !id.is_empty())
				.ok_or_else(|| ApiError::MissingDirectConversation { user_id: user_id.into() })?;
			let url =
				self.url(&["site", cloud_id, "conversation", &conversation_id, "message"])?;
			let request =
				self.authorized(Method::POST, url).await?.json(&MessageBody { body: document });

			decode_value(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Reads conversation details.
	pub async fn get_conversation(
		&self,
		cloud_id: &str,
		conversation_id: &str,
	) -> Result<Conversation> {
		const OP: Op = Op::GetConversation;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;

		obs::observe(OP, "request", async {
			let url = self.url(&["site", cloud_id, "conversation", conversation_id])?;

			decode(OP, &dispatch(OP, self.authorized(Method::GET, url).await?).await?)
		})
		.await
	}

	/// Creates a conversation and returns its id.
	pub async fn create_conversation(
		&self,
		cloud_id: &str,
		conversation: &NewConversation,
	) -> Result<Created> {
		const OP: Op = Op::CreateConversation;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "name", &conversation.name)?;

		obs::observe(OP, "request", async {
			let url = self.url(&["site", cloud_id, "conversation"])?;
			let request = self.authorized(Method::POST, url).await?.json(conversation);

			decode(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Archives a conversation.
	pub async fn archive_conversation(
		&self,
		cloud_id: &str,
		conversation_id: &str,
	) -> Result<Value> {
		const OP: Op = Op::ArchiveConversation;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;

		obs::observe(OP, "request", async {
			let url =
				self.url(&["site", cloud_id, "conversation", conversation_id, "archive"])?;

			decode_value(OP, &dispatch(OP, self.authorized(Method::PUT, url).await?).await?)
		})
		.await
	}

	/// Reads the five most recent messages of a conversation.
	pub async fn get_conversation_history(
		&self,
		cloud_id: &str,
		conversation_id: &str,
	) -> Result<ConversationHistory> {
		const OP: Op = Op::GetConversationHistory;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;

		obs::observe(OP, "request", async {
			let mut url =
				self.url(&["site", cloud_id, "conversation", conversation_id, "message"])?;

			url.query_pairs_mut().append_pair("limit", "5");

			decode(OP, &dispatch(OP, self.authorized(Method::GET, url).await?).await?)
		})
		.await
	}

	/// Reads the member ids of a conversation.
	pub async fn get_conversation_roster(
		&self,
		cloud_id: &str,
		conversation_id: &str,
	) -> Result<ConversationRoster> {
		const OP: Op = Op::GetConversationRoster;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;

		obs::observe(OP, "request", async {
			let url = self.url(&["site", cloud_id, "conversation", conversation_id, "roster"])?;

			decode(OP, &dispatch(OP, self.authorized(Method::GET, url).await?).await?)
		})
		.await
	}

	/// Uploads a file into a conversation; the returned id can be referenced from messages.
	pub async fn send_media(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		name: &str,
		bytes: Vec<u8>,
	) -> Result<MediaUpload> {
		const OP: Op = Op::SendMedia;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;
		require(OP, "name", name)?;

		if bytes.is_empty() {
			return Err(Error::MissingParam { op: OP.as_str(), param: "stream" });
		}

		obs::observe(OP, "request", async {
			let mut url = self.url(&["site", cloud_id, "conversation", conversation_id, "media"])?;

			url.query_pairs_mut().append_pair("name", name);

			let request = self
				.authorized(Method::POST, url)
				.await?
				.header(CONTENT_TYPE, "application/octet-stream")
				.body(bytes);

			decode(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Sets the label of a glance for one conversation.
	pub async fn update_glance_state(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		glance_key: &str,
		label: &str,
	) -> Result<Value> {
		const OP: Op = Op::UpdateGlanceState;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;
		require(OP, "glanceKey", glance_key)?;
		require(OP, "stateTxt", label)?;

		obs::observe(OP, "request", async {
			let url = self.module_state_url("chat:glance", glance_key)?;
			let body = GlanceState {
				context: ModuleContext { cloud_id, conversation_id },
				label,
				metadata: Default::default(),
			};

			decode_value(
				OP,
				&dispatch(OP, self.authorized(Method::POST, url).await?.json(&body)).await?,
			)
		})
		.await
	}

	/// Marks a configuration module as configured or not for one conversation.
	pub async fn update_configuration_state(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		config_key: &str,
		configured: bool,
	) -> Result<Value> {
		const OP: Op = Op::UpdateConfigurationState;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "conversationId", conversation_id)?;
		require(OP, "configKey", config_key)?;

		obs::observe(OP, "request", async {
			let url = self.module_state_url("chat:configuration", config_key)?;
			let body = ConfigurationState {
				context: ModuleContext { cloud_id, conversation_id },
				configured,
			};

			decode_value(
				OP,
				&dispatch(OP, self.authorized(Method::POST, url).await?.json(&body)).await?,
			)
		})
		.await
	}

	/// Reads a user profile.
	pub async fn get_user(&self, cloud_id: &str, user_id: &str) -> Result<User> {
		const OP: Op = Op::GetUser;

		require(OP, "cloudId", cloud_id)?;
		require(OP, "userId", user_id)?;

		obs::observe(OP, "request", async {
			let url = self.url(&["scim", "site", cloud_id, "Users", user_id])?;

			decode(OP, &dispatch(OP, self.authorized(Method::GET, url).await?).await?)
		})
		.await
	}

	/// Renders `document` as plain text.
	///
	/// Accepts a built [`Document`] or a raw body taken from an event, which is posted as-is.
	pub async fn convert_doc_to_text<D>(&self, document: &D) -> Result<String>
	where
		D: ?Sized + Serialize,
	{
		const OP: Op = Op::ConvertDocToText;

		obs::observe(OP, "request", async {
			let url = self.url(&["pf-editor-service", "render"])?;
			let request =
				self.authorized(Method::POST, url).await?.header(ACCEPT, "text/plain").json(document);

			dispatch(OP, request).await
		})
		.await
	}

	/// Converts markdown into a document.
	pub async fn convert_markdown_to_doc(&self, markdown: &str) -> Result<Document> {
		const OP: Op = Op::ConvertMarkdownToDoc;

		require(OP, "markdown", markdown)?;

		obs::observe(OP, "request", async {
			let mut url = self.url(&["pf-editor-service", "convert"])?;

			url.query_pairs_mut().append_pair("from", "markdown").append_pair("to", "adf");

			let request =
				self.authorized(Method::POST, url).await?.json(&MarkdownInput { input: markdown });

			decode(OP, &dispatch(OP, request).await?)
		})
		.await
	}

	/// Posts `text` as a single-paragraph message.
	pub async fn send_text_message(
		&self,
		cloud_id: &str,
		conversation_id: &str,
		text: &str,
	) -> Result<Value> {
		require_named("sendTextMessage", "text", text)?;

		self.send_message(cloud_id, conversation_id, &Document::from_text(text)).await
	}

	/// Posts `document` to the conversation `event` came from.
	pub async fn reply(&self, event: &MessageEvent, document: &Document) -> Result<Value> {
		self.send_message(&event.cloud_id, event.conversation_id(), document).await
	}

	/// Posts `text` to the conversation `event` came from.
	pub async fn reply_with_text(&self, event: &MessageEvent, text: &str) -> Result<Value> {
		require_named("replyWithText", "text", text)?;

		self.send_text_message(&event.cloud_id, event.conversation_id(), text).await
	}

	/// Looks `user_id` up and builds a document from `template`, with every `{{MENTION}}`
	/// replaced by a mention of that user.
	pub async fn doc_mentioning_user(
		&self,
		cloud_id: &str,
		user_id: &str,
		template: &str,
	) -> Result<Document> {
		const OP: &str = "createDocMentioningUser";

		require_named(OP, "cloudId", cloud_id)?;
		require_named(OP, "userId", user_id)?;
		require_named(OP, "text", template)?;

		let user = self.get_user(cloud_id, user_id).await?;

		Ok(Document::mentioning(template, &MentionAttrs { id: user.id, text: user.display_name }))
	}

	fn url(&self, segments: &[&str]) -> Result<Url> {
		endpoint(&self.base_url, segments)
	}

	fn module_state_url(&self, module: &str, key: &str) -> Result<Url> {
		self.url(&["app", "module", "chat", "conversation", module, key, "state"])
	}

	async fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder> {
		let token = self.tokens.access_token().await?;

		tracing::debug!(%method, %url, "requesting");

		Ok(self
			.http
			.request(method, url)
			.bearer_auth(token.expose())
			.header(CACHE_CONTROL, "no-cache"))
	}
}
impl Debug for StrideClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrideClient")
			.field("base_url", &self.base_url.as_str())
			.field("tokens", &self.tokens)
			.finish()
	}
}

/// Validated single-paragraph document for `text`.
pub fn text_to_doc(text: &str) -> Result<Document> {
	require_named("convertTextToDoc", "text", text)?;

	Ok(Document::from_text(text))
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase(base.to_string()))?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

fn require(op: Op, param: &'static str, value: &str) -> Result<()> {
	require_named(op.as_str(), param, value)
}

fn require_named(op: &'static str, param: &'static str, value: &str) -> Result<()> {
	if value.is_empty() { Err(Error::MissingParam { op, param }) } else { Ok(()) }
}

async fn dispatch(op: Op, request: RequestBuilder) -> Result<String> {
	let response = request.send().await.map_err(TransportError::api)?;
	let status = response.status();
	let body = response.text().await.map_err(TransportError::api)?;

	if status.is_client_error() || status.is_server_error() {
		tracing::error!(
			op = op.as_str(),
			status = status.as_u16(),
			body = %body,
			"request failed with an error response"
		);

		return Err(ApiError::Status { op: op.as_str(), status: status.as_u16(), body }.into());
	}

	Ok(body)
}

fn decode<T>(op: Op, body: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ApiError::Decode { op: op.as_str(), source }.into())
}

fn decode_value(op: Op, body: &str) -> Result<Value> {
	if body.trim().is_empty() { Ok(Value::Null) } else { decode(op, body) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.stg.atlassian.com").expect("Base URL should parse.")
	}

	#[test]
	fn endpoints_escape_ids_and_keep_base_paths() {
		let url = endpoint(&base(), &["site", "a/b", "conversation"]).expect("Endpoint should build.");

		assert_eq!(url.as_str(), "https://api.stg.atlassian.com/site/a%2Fb/conversation");

		let nested = Url::parse("http://127.0.0.1:9000/stride/").expect("Base URL should parse.");
		let url = endpoint(&nested, &["oauth", "token"]).expect("Endpoint should build.");

		assert_eq!(url.as_str(), "http://127.0.0.1:9000/stride/oauth/token");
	}

	#[test]
	fn module_state_url_nests_the_module_key() {
		let client = StrideClient::with_http_client(
			base(),
			"id",
			"secret",
			ReqwestHttpClient::default(),
		)
		.expect("Client should build.");
		let url =
			client.module_state_url("chat:glance", "refapp-glance").expect("URL should build.");

		assert_eq!(
			url.as_str(),
			"https://api.stg.atlassian.com/app/module/chat/conversation/chat:glance/refapp-glance/state"
		);
	}

	#[test]
	fn base_url_must_accept_paths() {
		let err = StrideClient::with_http_client(
			Url::parse("mailto:ops@example.com").expect("URL should parse."),
			"id",
			"secret",
			ReqwestHttpClient::default(),
		)
		.expect_err("Opaque URLs cannot host the API.");

		assert!(matches!(err, Error::Config(ConfigError::CannotBeABase(_))));
	}

	#[test]
	fn empty_text_is_rejected() {
		assert!(matches!(
			text_to_doc(""),
			Err(Error::MissingParam { op: "convertTextToDoc", param: "text" })
		));
		assert!(text_to_doc("hi").is_ok());
	}

	#[test]
	fn empty_bodies_decode_to_null() {
		assert_eq!(decode_value(Op::ArchiveConversation, "").expect("Empty body is fine."), Value::Null);
		assert!(matches!(
			decode::<Created>(Op::CreateConversation, "{}"),
			Err(Error::Api(ApiError::Decode { op: "createConversation", .. }))
		));
	}
}
