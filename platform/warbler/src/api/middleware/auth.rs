use std::sync::Arc;

use common::http::router::ext::RequestExt as _;
use common::http::router::middleware::Middleware;
use common::http::{Body, RouteError};
use hyper::header;

use crate::api::auth::AuthData;
use crate::api::error::ApiError;
use crate::api::ext::RequestExt;
use crate::api::request_context::RequestContext;
use crate::api::session::{read_cookie, session_cookie, JwtState, SessionState};
use crate::config::SessionConfig;
use crate::global::ApiGlobal;

/// Reads the session cookie and, when it names a user that still exists, marks
/// the request as authenticated. A missing, forged or expired cookie is an
/// anonymous session, never an error.
pub fn auth_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|mut req| async move {
		let context = RequestContext::default();
		req.provide(context.clone());

		let global = req.global::<G>()?;
		let config = global.config::<SessionConfig>();

		let session = read_cookie(req.headers(), &config.cookie_name)
			.and_then(|token| SessionState::verify(&global, token))
			.unwrap_or_default();

		let auth = match session.user_id {
			Some(user_id) => AuthData::from_user_id(&global, user_id).await?,
			None => None,
		};

		let stale = session.user_id.is_some() && auth.is_none();
		context.load(session, auth).await;

		if stale {
			tracing::debug!("session user no longer exists");
			context.reset_auth().await;
		}

		Ok(req)
	})
}

/// Writes the session back into the cookie when a handler changed it.
pub fn session_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::post_with_req(|mut resp, req| async move {
		let Ok(context) = req.context() else {
			return Ok(resp);
		};

		let Some(session) = context.changed_session().await else {
			return Ok(resp);
		};

		let global = req.global::<G>()?;
		let config = global.config::<SessionConfig>();

		let cookie = if session.is_empty() {
			session_cookie(config, None)
		} else {
			let token = session.serialize(&global);
			if token.is_none() {
				tracing::error!("failed to sign session token");
			}
			token.and_then(|token| session_cookie(config, Some(&token)))
		};

		if let Some(cookie) = cookie {
			resp.headers_mut().append(header::SET_COOKIE, cookie);
		}

		Ok(resp)
	})
}
