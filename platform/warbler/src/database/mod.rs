use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

mod follow;
mod like;
mod message;
mod user;

pub use follow::*;
pub use like::*;
pub use message::*;
pub use user::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityKind {
	Unique,
	ForeignKey,
	NotNull,
	Check,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
	#[error("integrity error ({kind:?}): {message}")]
	Integrity { kind: IntegrityKind, message: String },
	#[error("failed to hash password: {0}")]
	PasswordHash(argon2::password_hash::Error),
	#[error("database error: {0}")]
	Sqlx(sqlx::Error),
}

impl ModelError {
	pub fn integrity_kind(&self) -> Option<IntegrityKind> {
		match self {
			Self::Integrity { kind, .. } => Some(*kind),
			_ => None,
		}
	}
}

impl From<sqlx::Error> for ModelError {
	fn from(err: sqlx::Error) -> Self {
		if let sqlx::Error::Database(db_err) = &err {
			let kind = match db_err.kind() {
				sqlx::error::ErrorKind::UniqueViolation => Some(IntegrityKind::Unique),
				sqlx::error::ErrorKind::ForeignKeyViolation => Some(IntegrityKind::ForeignKey),
				sqlx::error::ErrorKind::NotNullViolation => Some(IntegrityKind::NotNull),
				sqlx::error::ErrorKind::CheckViolation => Some(IntegrityKind::Check),
				_ => None,
			};

			if let Some(kind) = kind {
				return Self::Integrity {
					kind,
					message: db_err.message().to_string(),
				};
			}
		}

		Self::Sqlx(err)
	}
}

/// Opens the pool described by the config. Foreign keys are enforced on every
/// connection, the cascades depend on it.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(&config.uri)?
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));

	// An in-memory database lives exactly as long as its connection.
	let pool = if config.uri.contains(":memory:") || config.uri.contains("mode=memory") {
		pool.max_connections(1).idle_timeout(None).max_lifetime(None)
	} else {
		pool.acquire_timeout(Duration::from_secs(10))
	};

	pool.connect_with(options).await
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
	sqlx::migrate!("./migrations").run(db).await
}
