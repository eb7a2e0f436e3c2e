use std::net::SocketAddr;

use common::config::{ConfigError, LoggingConfig};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Warbler, a small social network
pub struct AppConfig {
	/// The path to the config file that was loaded
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config_file: Option<String>,

	/// Name of this instance
	pub name: String,

	/// The logging config
	pub logging: LoggingConfig,

	/// API Config
	pub api: ApiConfig,

	/// Database Config
	pub database: DatabaseConfig,

	/// Session cookie Config
	pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// Largest request body we are willing to buffer, in bytes
	pub max_body_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: "[::]:5000".parse().expect("failed to parse bind address"),
			max_body_size: 64 * 1024,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use, `DATABASE_URL` takes precedence
	pub uri: String,

	/// Upper bound of pooled connections
	pub max_connections: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "sqlite://warbler.db?mode=rwc".to_string(),
			max_connections: 5,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
	/// Secret the session token is signed with
	pub secret: String,

	/// Issuer written into and required from the session token
	pub issuer: String,

	/// Name of the session cookie
	pub cookie_name: String,

	/// Seconds a session stays valid after the last change to it
	pub max_age_secs: i64,

	/// Only send the cookie over https
	pub secure: bool,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			secret: "it's a secret".to_string(),
			issuer: "warbler".to_string(),
			cookie_name: "warbler_session".to_string(),
			max_age_secs: 60 * 60 * 24 * 7,
			secure: false,
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			config_file: None,
			name: "warbler".to_string(),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
			session: SessionConfig::default(),
		}
	}
}

impl AppConfig {
	/// Reads `config.toml` (or the explicit file), then `WARBLER_*` and
	/// `DATABASE_URL` from the environment.
	pub fn parse(explicit_file: Option<String>) -> Result<Self, ConfigError> {
		let (mut config, config_file) =
			common::config::parse::<Self>("WARBLER", explicit_file, Some("config.toml".to_string()))?;

		config.config_file = config_file;

		if let Ok(uri) = std::env::var("DATABASE_URL") {
			config.database.uri = uri;
		}

		Ok(config)
	}
}
