use std::convert::Infallible;
use std::sync::Arc;

use common::http::router::Router;
use common::http::{error_page, full, Body, RouteError};
use common::make_response;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use tokio::net::TcpSocket;
use tokio::select;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod auth;
pub mod error;
pub mod ext;
pub mod forms;
mod middleware;
pub mod request_context;
pub mod session;
pub mod views;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Body, Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		// Loads the session cookie and the logged in user into the request context, a bad
		// cookie only means an anonymous visitor.
		.middleware(middleware::auth::auth_middleware(global))
		.middleware(middleware::auth::session_middleware(global))
		.middleware(middleware::response_headers::no_cache_middleware(global))
		.get("/", views::home::index::<G>)
		.form("/signup", views::auth::signup::<G>)
		.form("/login", views::auth::login::<G>)
		.post("/logout", views::auth::logout)
		.scope(
			"/users",
			Router::builder()
				.get("/", views::users::list::<G>)
				.form("/profile", views::users::profile::<G>)
				.post("/delete", views::users::delete::<G>)
				.post("/follow/:follow_id", views::users::follow::<G>)
				.post("/stop-following/:follow_id", views::users::stop_following::<G>)
				.get("/:user_id", views::users::show::<G>)
				.get("/:user_id/following", views::users::following::<G>)
				.get("/:user_id/followers", views::users::followers::<G>)
				.get("/:user_id/likes", views::users::likes::<G>),
		)
		.scope(
			"/messages",
			Router::builder()
				.form("/new", views::messages::new::<G>)
				.get("/:message_id", views::messages::show::<G>)
				.post("/:message_id/delete", views::messages::delete::<G>)
				.post("/:message_id/like", views::messages::like::<G>),
		)
		.error_handler(common::http::error_handler::<ApiError>)
		.not_found(views::not_found::<G>)
		.build()
}

/// Buffers the request body up to `max_body_size` and hands the request to the
/// router.
pub(crate) async fn serve_request<B>(
	router: Arc<Router<Body, Body, RouteError<ApiError>>>,
	req: hyper::Request<B>,
	max_body_size: usize,
) -> Result<hyper::Response<Body>, Infallible>
where
	B: hyper::body::Body,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	let (parts, body) = req.into_parts();

	tracing::debug!(method = %parts.method, path = %parts.uri.path(), "request");

	let body = match Limited::new(body, max_body_size).collect().await {
		Ok(collected) => collected.to_bytes(),
		Err(err) => {
			tracing::debug!(error = %err, "failed to read request body");
			let mut res = make_response!(
				StatusCode::PAYLOAD_TOO_LARGE,
				error_page(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
			);
			middleware::response_headers::set_no_cache(res.headers_mut());
			return Ok(res);
		}
	};

	match router.handle(hyper::Request::from_parts(parts, full(body))).await {
		Ok(res) => Ok(res),
		Err(err) => {
			tracing::error!(error = %err, "unhandled router error");
			let mut res = make_response!(
				StatusCode::INTERNAL_SERVER_ERROR,
				error_page(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
			);
			middleware::response_headers::set_no_cache(res.headers_mut());
			Ok(res)
		}
	}
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("Listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let max_body_size = config.max_body_size;

	// The router only holds a weak reference to the global state, so open
	// keep-alive connections do not hold up shutdown.
	let router = Arc::new(routes(&global));
	let service = service_fn(move |req: hyper::Request<Incoming>| serve_request(router.clone(), req, max_body_size));

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = service.clone();

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					http1::Builder::new()
						.serve_connection(TokioIo::new(socket), service)
						.await
						.ok();
				});
			},
		}
	}
}
