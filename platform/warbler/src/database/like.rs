use sqlx::{SqliteConnection, SqliteExecutor};

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Like {
	pub id: i64,
	pub user_id: i64,
	pub message_id: i64,
}

impl Like {
	/// A user likes a message at most once, a second like is an integrity
	/// error.
	pub async fn create(db: impl SqliteExecutor<'_>, user_id: i64, message_id: i64) -> Result<Self, ModelError> {
		Ok(
			sqlx::query_as("INSERT INTO likes (user_id, message_id) VALUES (?, ?) RETURNING *")
				.bind(user_id)
				.bind(message_id)
				.fetch_one(db)
				.await?,
		)
	}

	/// Likes the message, or removes the like when there already is one.
	/// Returns whether the message is liked afterwards.
	pub async fn toggle(conn: &mut SqliteConnection, user_id: i64, message_id: i64) -> Result<bool, ModelError> {
		let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND message_id = ?")
			.bind(user_id)
			.bind(message_id)
			.execute(&mut *conn)
			.await?
			.rows_affected();

		if removed > 0 {
			return Ok(false);
		}

		Self::create(&mut *conn, user_id, message_id).await?;

		Ok(true)
	}

	pub async fn message_ids(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<Vec<i64>, ModelError> {
		Ok(sqlx::query_scalar("SELECT message_id FROM likes WHERE user_id = ?")
			.bind(user_id)
			.fetch_all(db)
			.await?)
	}
}
