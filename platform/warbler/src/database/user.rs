use std::fmt::{Display, Formatter};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::SqliteExecutor;

use super::{AuthoredMessage, Follow, Message, ModelError};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct User {
	pub id: i64,
	pub email: String,
	pub username: String,
	pub image_url: String,
	pub header_image_url: String,
	pub bio: Option<String>,
	pub location: Option<String>,
	/// The argon2 hash of the password, never rendered.
	#[serde(skip_serializing)]
	pub password: String,
}

/// The columns of a user row that is about to be inserted. `password` is
/// stored as given, [`User::signup`] is the way to insert a plaintext one.
#[derive(Debug, Clone, Default)]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub username: &'a str,
	pub password: &'a str,
	pub image_url: Option<&'a str>,
	pub header_image_url: Option<&'a str>,
	pub bio: Option<&'a str>,
	pub location: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub image_url: Option<&'a str>,
	pub header_image_url: Option<&'a str>,
	pub bio: Option<&'a str>,
	pub location: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct UserStats {
	pub messages: i64,
	pub following: i64,
	pub followers: i64,
	pub likes: i64,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

impl User {
	/// Hashes the password and inserts the user. A blank image url falls back
	/// to the default picture.
	pub async fn signup(
		db: impl SqliteExecutor<'_>,
		username: &str,
		email: &str,
		password: &str,
		image_url: Option<&str>,
	) -> Result<Self, ModelError> {
		let password = Self::hash_password(password)?;

		Self::insert(
			db,
			&NewUser {
				email,
				username,
				password: &password,
				image_url,
				..Default::default()
			},
		)
		.await
	}

	pub async fn insert(db: impl SqliteExecutor<'_>, user: &NewUser<'_>) -> Result<Self, ModelError> {
		Ok(sqlx::query_as(
			"INSERT INTO users (email, username, password, image_url, header_image_url, bio, location) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(user.email)
		.bind(user.username)
		.bind(user.password)
		.bind(non_blank(user.image_url).unwrap_or(DEFAULT_IMAGE_URL))
		.bind(non_blank(user.header_image_url).unwrap_or(DEFAULT_HEADER_IMAGE_URL))
		.bind(non_blank(user.bio))
		.bind(non_blank(user.location))
		.fetch_one(db)
		.await?)
	}

	/// Returns the user only when the username exists and the password matches
	/// its hash.
	pub async fn authenticate(
		db: impl SqliteExecutor<'_>,
		username: &str,
		password: &str,
	) -> Result<Option<Self>, ModelError> {
		let Some(user) = Self::by_username(db, username).await? else {
			return Ok(None);
		};

		Ok(user.verify_password(password).then_some(user))
	}

	pub async fn by_id(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<Self>, ModelError> {
		Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await?)
	}

	pub async fn by_username(db: impl SqliteExecutor<'_>, username: &str) -> Result<Option<Self>, ModelError> {
		Ok(sqlx::query_as("SELECT * FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(db)
			.await?)
	}

	/// Every user whose username contains `query`, or every user when no query
	/// is given.
	pub async fn search(db: impl SqliteExecutor<'_>, query: Option<&str>) -> Result<Vec<Self>, ModelError> {
		match non_blank(query) {
			Some(query) => Ok(sqlx::query_as(
				"SELECT * FROM users WHERE username LIKE '%' || ? || '%' ESCAPE '\\' ORDER BY username",
			)
			.bind(escape_like(query))
			.fetch_all(db)
			.await?),
			None => Ok(sqlx::query_as("SELECT * FROM users ORDER BY username").fetch_all(db).await?),
		}
	}

	pub async fn update_profile(
		db: impl SqliteExecutor<'_>,
		id: i64,
		update: &ProfileUpdate<'_>,
	) -> Result<Option<Self>, ModelError> {
		Ok(sqlx::query_as(
			"UPDATE users SET username = ?, email = ?, image_url = ?, header_image_url = ?, bio = ?, location = ? WHERE id = ? RETURNING *",
		)
		.bind(update.username)
		.bind(update.email)
		.bind(non_blank(update.image_url).unwrap_or(DEFAULT_IMAGE_URL))
		.bind(non_blank(update.header_image_url).unwrap_or(DEFAULT_HEADER_IMAGE_URL))
		.bind(non_blank(update.bio))
		.bind(non_blank(update.location))
		.bind(id)
		.fetch_optional(db)
		.await?)
	}

	/// Deletes the user together with its messages, follow edges and likes.
	pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, ModelError> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(db).await?;
		Ok(result.rows_affected() > 0)
	}

	/// The user's messages, newest first.
	pub async fn messages(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<Message>, ModelError> {
		Message::by_user(db, self.id).await
	}

	/// The users this user follows.
	pub async fn following(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<Self>, ModelError> {
		Ok(sqlx::query_as(
			"SELECT u.* FROM users u JOIN follows f ON f.user_being_followed_id = u.id WHERE f.user_following_id = ? ORDER BY u.username",
		)
		.bind(self.id)
		.fetch_all(db)
		.await?)
	}

	/// The users following this user.
	pub async fn followers(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<Self>, ModelError> {
		Ok(sqlx::query_as(
			"SELECT u.* FROM users u JOIN follows f ON f.user_following_id = u.id WHERE f.user_being_followed_id = ? ORDER BY u.username",
		)
		.bind(self.id)
		.fetch_all(db)
		.await?)
	}

	/// The messages this user liked, most recently liked first.
	pub async fn likes(&self, db: impl SqliteExecutor<'_>) -> Result<Vec<AuthoredMessage>, ModelError> {
		Ok(sqlx::query_as(
			"SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url FROM likes l JOIN messages m ON m.id = l.message_id JOIN users u ON u.id = m.user_id WHERE l.user_id = ? ORDER BY l.id DESC",
		)
		.bind(self.id)
		.fetch_all(db)
		.await?)
	}

	pub async fn stats(&self, db: impl SqliteExecutor<'_>) -> Result<UserStats, ModelError> {
		Ok(sqlx::query_as(
			"SELECT (SELECT COUNT(*) FROM messages WHERE user_id = ?1) AS messages, (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1) AS following, (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1) AS followers, (SELECT COUNT(*) FROM likes WHERE user_id = ?1) AS likes",
		)
		.bind(self.id)
		.fetch_one(db)
		.await?)
	}

	pub async fn is_following(&self, db: impl SqliteExecutor<'_>, other: &User) -> Result<bool, ModelError> {
		Follow::exists(db, self.id, other.id).await
	}

	pub async fn is_followed_by(&self, db: impl SqliteExecutor<'_>, other: &User) -> Result<bool, ModelError> {
		Follow::exists(db, other.id, self.id).await
	}

	/// Adds `other` to the users this user follows.
	pub async fn follow(&self, db: impl SqliteExecutor<'_>, other: &User) -> Result<(), ModelError> {
		Follow::create(db, self.id, other.id).await
	}

	pub async fn unfollow(&self, db: impl SqliteExecutor<'_>, other: &User) -> Result<bool, ModelError> {
		Follow::delete(db, self.id, other.id).await
	}

	/// Uses argon2 to verify the password hash against the provided password.
	pub fn verify_password(&self, password: &str) -> bool {
		let hash = match PasswordHash::new(&self.password) {
			Ok(hash) => hash,
			Err(err) => {
				tracing::error!("failed to parse password hash: {}", err);
				return false;
			}
		};

		Argon2::default().verify_password(password.as_bytes(), &hash).is_ok()
	}

	/// Generates a new password hash using argon2.
	pub fn hash_password(password: &str) -> Result<String, ModelError> {
		let salt = SaltString::generate(&mut OsRng);

		let hash = Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map_err(ModelError::PasswordHash)?;

		Ok(hash.to_string())
	}
}

impl Display for User {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
	}
}

fn escape_like(query: &str) -> String {
	let mut escaped = String::with_capacity(query.len());
	for c in query.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}
