use std::sync::Arc;

use common::http::router::middleware::Middleware;
use common::http::{Body, RouteError};
use hyper::header::{self, HeaderMap, HeaderValue};

use crate::api::error::ApiError;
use crate::global::ApiGlobal;

pub fn set_no_cache(headers: &mut HeaderMap) {
	headers.insert(
		header::CACHE_CONTROL,
		HeaderValue::from_static("no-cache, no-store, must-revalidate"),
	);
}

/// Pages depend on the session, so no response may be cached.
pub fn no_cache_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::post(|mut resp| async move {
		set_no_cache(resp.headers_mut());
		Ok(resp)
	})
}
