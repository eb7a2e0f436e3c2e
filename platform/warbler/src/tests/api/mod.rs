use std::sync::Arc;

use common::global::GlobalDb;
use common::http::router::Router;
use common::http::{full, Body, RouteError};
use http_body_util::BodyExt;
use hyper::header::{self, HeaderMap};
use hyper::{Method, StatusCode};

use crate::api::error::ApiError;
use crate::api::session::{JwtState, SessionState};
use crate::api;
use crate::global::GlobalState;

mod auth;
mod messages;
mod users;

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: String,
}

impl TestResponse {
	pub fn location(&self) -> &str {
		self.headers
			.get(header::LOCATION)
			.and_then(|value| value.to_str().ok())
			.expect("response has no location header")
	}
}

/// Drives the router in process and keeps the session cookie between requests
/// like a browser would.
pub struct TestClient {
	global: Arc<GlobalState>,
	router: Router<Body, Body, RouteError<ApiError>>,
	session: Option<String>,
}

impl TestClient {
	pub fn new(global: &Arc<GlobalState>) -> Self {
		Self {
			global: global.clone(),
			router: api::routes(global),
			session: None,
		}
	}

	/// Starts a session for `user_id` without going through the login form.
	pub fn login_as(&mut self, user_id: i64) {
		let session = SessionState {
			user_id: Some(user_id),
			flashes: Vec::new(),
		};

		self.session = Some(session.serialize(&self.global).expect("failed to sign session"));
	}

	pub fn session(&self) -> Option<&str> {
		self.session.as_deref()
	}

	pub fn set_session(&mut self, token: Option<String>) {
		self.session = token;
	}

	pub async fn get(&mut self, path: &str) -> TestResponse {
		self.send(Method::GET, path, Vec::new()).await
	}

	pub async fn post(&mut self, path: &str) -> TestResponse {
		self.send(Method::POST, path, Vec::new()).await
	}

	pub async fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
		let body = serde_urlencoded::to_string(form).expect("failed to encode form");
		self.send(Method::POST, path, body.into_bytes()).await
	}

	/// Follows redirects with GET requests until a page is returned.
	pub async fn follow(&mut self, mut res: TestResponse) -> TestResponse {
		for _ in 0..10 {
			if !res.status.is_redirection() {
				return res;
			}

			let location = res.location().to_string();
			res = self.get(&location).await;
		}

		panic!("too many redirects");
	}

	async fn send(&mut self, method: Method, path: &str, body: Vec<u8>) -> TestResponse {
		let mut req = hyper::Request::builder()
			.method(method)
			.uri(path)
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

		if let Some(token) = &self.session {
			req = req.header(header::COOKIE, format!("warbler_session={token}"));
		}

		let req = req.body(full(body)).expect("failed to build request");

		let res = self.router.handle(req).await.expect("unhandled router error");

		for cookie in res.headers().get_all(header::SET_COOKIE) {
			let cookie = cookie.to_str().expect("cookie is not valid utf-8");
			if let Some(value) = cookie
				.split(';')
				.next()
				.and_then(|pair| pair.trim().strip_prefix("warbler_session="))
			{
				self.session = (!value.is_empty()).then(|| value.to_string());
			}
		}

		let (parts, body) = res.into_parts();
		let body = body.collect().await.expect("failed to read body").to_bytes();

		TestResponse {
			status: parts.status,
			headers: parts.headers,
			body: String::from_utf8(body.to_vec()).expect("body is not valid utf-8"),
		}
	}
}

#[tokio::test]
async fn test_no_cache_headers() {
	let (global, _handler) = crate::tests::global::mock_global_state(Default::default()).await;
	let mut client = TestClient::new(&global);

	let res = client.get("/").await;

	assert_eq!(res.status, StatusCode::OK);
	assert_eq!(
		res.headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
		Some("no-cache, no-store, must-revalidate")
	);
}

#[tokio::test]
async fn test_unknown_route() {
	let (global, _handler) = crate::tests::global::mock_global_state(Default::default()).await;
	let mut client = TestClient::new(&global);

	let res = client.get("/does/not/exist").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
	assert!(res.body.contains("404"));

	// Only POST is routed for logout.
	let res = client.get("/logout").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id() {
	let (global, _handler) = crate::tests::global::mock_global_state(Default::default()).await;
	let mut client = TestClient::new(&global);

	let res = client.get("/users/abc").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_body_too_large_is_not_cached() {
	let (global, _handler) = crate::tests::global::mock_global_state(Default::default()).await;
	let router = Arc::new(api::routes(&global));

	let req = hyper::Request::builder()
		.method(Method::POST)
		.uri("/login")
		.body(full(vec![b'a'; 64]))
		.expect("failed to build request");

	let res = api::serve_request(router, req, 16).await.expect("infallible");

	assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
	assert_eq!(
		res.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
		Some("no-cache, no-store, must-revalidate")
	);
}

#[tokio::test]
async fn test_failed_session_load_is_not_cached() {
	let (global, _handler) = crate::tests::global::mock_global_state(Default::default()).await;
	let user = crate::tests::global::create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	// The session user can no longer be loaded.
	global.db().close().await;

	let res = client.get("/").await;

	assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(
		res.headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
		Some("no-cache, no-store, must-revalidate")
	);
}
