//! Process configuration resolved from environment variables.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `PORT` | `8000` | HTTP listening port |
//! | `CLIENT_ID` | required | app client id |
//! | `CLIENT_SECRET` | required | app client secret, also the inbound token key |
//! | `ENV` | `production` | `production` selects the production API host |
//! | `STATIC_DIR` | `public` | directory served for unmatched paths |
//! | `DESCRIPTOR_PATH` | `app-descriptor.json` | app descriptor template |

// std
use std::{env::VarError, path::PathBuf};
// self
use crate::{_prelude::*, error::ConfigError};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_DESCRIPTOR_PATH: &str = "app-descriptor.json";

/// Read access to environment variables.
pub trait ReadEnv {
	/// Returns the value of `key`.
	fn var(&self, key: &str) -> Result<String, VarError>;
}

/// [`ReadEnv`] backed by the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;
impl ReadEnv for SystemEnv {
	fn var(&self, key: &str) -> Result<String, VarError> {
		std::env::var(key)
	}
}

/// [`ReadEnv`] backed by an in-process map, for tests.
#[derive(Debug, Default)]
pub struct InMemoryEnv(Mutex<HashMap<String, String>>);
impl InMemoryEnv {
	/// Creates an empty environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` to `value`.
	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.lock().insert(key.into(), value.into());
	}
}
impl ReadEnv for InMemoryEnv {
	fn var(&self, key: &str) -> Result<String, VarError> {
		self.0.lock().get(key).cloned().ok_or(VarError::NotPresent)
	}
}

/// Deployment environment, which selects the Stride API host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
	/// `https://api.atlassian.com`.
	#[default]
	Production,
	/// `https://api.stg.atlassian.com`.
	Development,
}
impl Environment {
	/// Base URL of the Stride API for this environment.
	pub const fn api_base_url(self) -> &'static str {
		match self {
			Environment::Production => "https://api.atlassian.com",
			Environment::Development => "https://api.stg.atlassian.com",
		}
	}
}
impl FromStr for Environment {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(if s == "production" { Environment::Production } else { Environment::Development })
	}
}

/// Resolved application configuration.
#[derive(Clone)]
pub struct AppConfig {
	/// HTTP listening port.
	pub port: u16,
	/// App client id.
	pub client_id: String,
	/// App client secret.
	pub client_secret: String,
	/// Deployment environment.
	pub environment: Environment,
	/// Directory served for unmatched paths.
	pub static_dir: PathBuf,
	/// App descriptor template.
	pub descriptor_path: PathBuf,
}
impl AppConfig {
	/// Reads the configuration from `env`.
	pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
		let port = match env.var("PORT") {
			Ok(raw) =>
				raw.parse().map_err(|_| ConfigError::InvalidVar { name: "PORT", value: raw })?,
			Err(_) => DEFAULT_PORT,
		};

		Ok(Self {
			port,
			client_id: required(env, "CLIENT_ID")?,
			client_secret: required(env, "CLIENT_SECRET")?,
			environment: env
				.var("ENV")
				.ok()
				.and_then(|raw| raw.parse().ok())
				.unwrap_or_default(),
			static_dir: env.var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.into()).into(),
			descriptor_path: env
				.var("DESCRIPTOR_PATH")
				.unwrap_or_else(|_| DEFAULT_DESCRIPTOR_PATH.into())
				.into(),
		})
	}

	/// Base URL of the Stride API selected by [`AppConfig::environment`].
	pub fn api_base_url(&self) -> Result<Url, ConfigError> {
		let raw = self.environment.api_base_url();

		Url::parse(raw).map_err(|source| ConfigError::invalid_url(raw, source))
	}
}
impl Debug for AppConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppConfig")
			.field("port", &self.port)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("environment", &self.environment)
			.field("static_dir", &self.static_dir)
			.field("descriptor_path", &self.descriptor_path)
			.finish()
	}
}

fn required<E: ReadEnv>(env: &E, name: &'static str) -> Result<String, ConfigError> {
	match env.var(name) {
		Ok(value) if !value.is_empty() => Ok(value),
		_ => Err(ConfigError::MissingVar { name }),
	}
}
