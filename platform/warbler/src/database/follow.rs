use sqlx::SqliteExecutor;

use super::ModelError;

/// An edge of the follow graph: `user_following_id` follows
/// `user_being_followed_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Follow {
	pub user_being_followed_id: i64,
	pub user_following_id: i64,
}

impl Follow {
	/// Following someone twice is a no-op. Unknown users still fail with an
	/// integrity error.
	pub async fn create(db: impl SqliteExecutor<'_>, follower_id: i64, followed_id: i64) -> Result<(), ModelError> {
		sqlx::query(
			"INSERT INTO follows (user_being_followed_id, user_following_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
		)
		.bind(followed_id)
		.bind(follower_id)
		.execute(db)
		.await?;

		Ok(())
	}

	pub async fn delete(db: impl SqliteExecutor<'_>, follower_id: i64, followed_id: i64) -> Result<bool, ModelError> {
		let result = sqlx::query("DELETE FROM follows WHERE user_being_followed_id = ? AND user_following_id = ?")
			.bind(followed_id)
			.bind(follower_id)
			.execute(db)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	pub async fn exists(db: impl SqliteExecutor<'_>, follower_id: i64, followed_id: i64) -> Result<bool, ModelError> {
		Ok(sqlx::query_scalar(
			"SELECT EXISTS (SELECT 1 FROM follows WHERE user_being_followed_id = ? AND user_following_id = ?)",
		)
		.bind(followed_id)
		.bind(follower_id)
		.fetch_one(db)
		.await?)
	}
}
