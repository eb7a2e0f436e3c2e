use std::sync::Arc;

use common::http::RouteError;
use hyper::StatusCode;

use super::error::ApiError;
use crate::database::User;
use crate::global::ApiGlobal;

#[derive(thiserror::Error, Debug, Clone)]
pub enum AuthError {
	#[error("not logged in")]
	NotLoggedIn,
	#[error("not the owner of the resource")]
	NotOwner,
	#[error("failed to fetch user")]
	FetchUser,
}

impl From<AuthError> for RouteError<ApiError> {
	fn from(value: AuthError) -> Self {
		RouteError::from(match &value {
			AuthError::NotLoggedIn => (StatusCode::UNAUTHORIZED, "not logged in"),
			AuthError::NotOwner => (StatusCode::FORBIDDEN, "not the owner of the resource"),
			AuthError::FetchUser => (StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"),
		})
		.with_source(Some(ApiError::Auth(value)))
	}
}

/// The logged in user of a request.
#[derive(Debug, Clone)]
pub struct AuthData {
	pub user: User,
}

impl AuthData {
	/// `None` when the session points at a user that no longer exists.
	pub async fn from_user_id<G: ApiGlobal>(global: &Arc<G>, user_id: i64) -> Result<Option<Self>, AuthError> {
		let user = User::by_id(global.db(), user_id).await.map_err(|err| {
			tracing::error!(error = %err, user_id, "failed to fetch session user");
			AuthError::FetchUser
		})?;

		Ok(user.map(|user| Self { user }))
	}
}
