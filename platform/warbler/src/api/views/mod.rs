use std::collections::BTreeMap;
use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::{full, Body, RouteError};
use common::make_response;
use hyper::{header, StatusCode};
use serde::Serialize;

use super::auth::{AuthData, AuthError};
use super::error::{ApiError, Result};
use super::ext::RequestExt;
use super::request_context::RequestContext;
use super::session::FlashCategory;
use crate::global::ApiGlobal;

pub mod auth;
pub mod home;
pub mod messages;
pub mod users;

pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

/// How many messages a timeline or profile shows.
pub const PAGE_SIZE: i64 = 100;

/// A template together with its variables. Every page also gets the current
/// user, the request path and the pending flashes.
pub struct Page {
	template: &'static str,
	status: StatusCode,
	context: tera::Context,
}

impl Page {
	pub fn new(template: &'static str) -> Self {
		let mut context = tera::Context::new();
		context.insert("form", &BTreeMap::<String, String>::new());
		context.insert("errors", &BTreeMap::<String, Vec<String>>::new());
		context.insert("liked", &Vec::<i64>::new());
		context.insert("following", &Vec::<i64>::new());

		Self {
			template,
			status: StatusCode::OK,
			context,
		}
	}

	pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
		self.context.insert(key, value);
		self
	}

	pub fn status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	pub async fn render<G: ApiGlobal, B>(mut self, global: &Arc<G>, req: &hyper::Request<B>) -> Result<hyper::Response<Body>> {
		let context = req.context()?;
		let auth = context.auth().await;

		self.context.insert("current_user", &auth.as_ref().map(|auth| &auth.user));
		self.context.insert("current_user_id", &auth.as_ref().map(|auth| auth.user.id));
		self.context.insert("request_path", req.uri().path());
		self.context.insert("flashes", &context.take_flashes().await);

		let html = global
			.templates()
			.render(self.template, &self.context)
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to render page"))?;

		Ok(make_response!(self.status, html))
	}
}

pub fn redirect(location: &str) -> hyper::Response<Body> {
	hyper::Response::builder()
		.status(StatusCode::FOUND)
		.header(header::LOCATION, location)
		.body(full(""))
		.expect("failed to build response")
}

/// Separates the body so the head can still be used for rendering.
pub fn split_body(req: hyper::Request<Body>) -> (hyper::Request<()>, Body) {
	let (parts, body) = req.into_parts();
	(hyper::Request::from_parts(parts, ()), body)
}

/// Flashes "Access unauthorized." and sends the visitor home.
pub async fn unauthorized(context: &RequestContext, reason: AuthError) -> RouteError<ApiError> {
	context.flash(FlashCategory::Danger, ACCESS_UNAUTHORIZED).await;
	RouteError::from(redirect("/")).with_source(Some(ApiError::Auth(reason)))
}

pub async fn require_auth(context: &RequestContext) -> Result<AuthData> {
	match context.auth().await {
		Some(auth) => Ok(auth),
		None => Err(unauthorized(context, AuthError::NotLoggedIn).await),
	}
}

pub async fn not_found<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	Page::new("404.html").status(StatusCode::NOT_FOUND).render(&global, &req).await
}
