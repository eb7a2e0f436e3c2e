use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use super::{ModelError, User};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Message {
	pub id: i64,
	pub text: String,
	pub timestamp: DateTime<Utc>,
	pub user_id: i64,
}

/// A message joined with the parts of its author a listing shows.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct AuthoredMessage {
	pub id: i64,
	pub text: String,
	pub timestamp: DateTime<Utc>,
	pub user_id: i64,
	pub username: String,
	pub image_url: String,
}

const AUTHORED_COLUMNS: &str = "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url FROM messages m JOIN users u ON u.id = m.user_id";

impl Message {
	/// Fails with an integrity error when `user_id` does not name a user.
	pub async fn create(db: impl SqliteExecutor<'_>, user_id: i64, text: &str) -> Result<Self, ModelError> {
		Ok(
			sqlx::query_as("INSERT INTO messages (text, timestamp, user_id) VALUES (?, ?, ?) RETURNING *")
				.bind(text)
				.bind(Utc::now())
				.bind(user_id)
				.fetch_one(db)
				.await?,
		)
	}

	pub async fn by_id(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<Self>, ModelError> {
		Ok(sqlx::query_as("SELECT * FROM messages WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await?)
	}

	pub async fn by_user(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<Vec<Self>, ModelError> {
		Ok(
			sqlx::query_as("SELECT * FROM messages WHERE user_id = ? ORDER BY timestamp DESC, id DESC")
				.bind(user_id)
				.fetch_all(db)
				.await?,
		)
	}

	pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, ModelError> {
		let result = sqlx::query("DELETE FROM messages WHERE id = ?").bind(id).execute(db).await?;
		Ok(result.rows_affected() > 0)
	}

	/// The owner of the message.
	pub async fn user(&self, db: impl SqliteExecutor<'_>) -> Result<User, ModelError> {
		Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
			.bind(self.user_id)
			.fetch_one(db)
			.await?)
	}
}

impl AuthoredMessage {
	pub async fn by_id(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<Self>, ModelError> {
		Ok(sqlx::query_as(&format!("{AUTHORED_COLUMNS} WHERE m.id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await?)
	}

	/// The newest messages written by `user_id` or anyone they follow.
	pub async fn timeline(db: impl SqliteExecutor<'_>, user_id: i64, limit: i64) -> Result<Vec<Self>, ModelError> {
		Ok(sqlx::query_as(&format!(
			"{AUTHORED_COLUMNS} WHERE m.user_id = ?1 OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1) ORDER BY m.timestamp DESC, m.id DESC LIMIT ?2"
		))
		.bind(user_id)
		.bind(limit)
		.fetch_all(db)
		.await?)
	}

	pub async fn by_author(db: impl SqliteExecutor<'_>, user_id: i64, limit: i64) -> Result<Vec<Self>, ModelError> {
		Ok(sqlx::query_as(&format!(
			"{AUTHORED_COLUMNS} WHERE m.user_id = ? ORDER BY m.timestamp DESC, m.id DESC LIMIT ?"
		))
		.bind(user_id)
		.bind(limit)
		.fetch_all(db)
		.await?)
	}
}
