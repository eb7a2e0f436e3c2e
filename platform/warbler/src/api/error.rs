use common::http::RouteError;

use super::auth::AuthError;
use crate::database::ModelError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("database error: {0}")]
	Model(#[from] ModelError),
	#[error("transaction error: {0}")]
	Transaction(#[from] sqlx::Error),
	#[error("failed to render template: {0}")]
	Template(#[from] tera::Error),
	#[error("failed to parse form: {0}")]
	Form(#[from] serde_urlencoded::de::Error),
	#[error("auth error: {0}")]
	Auth(#[from] AuthError),
}
