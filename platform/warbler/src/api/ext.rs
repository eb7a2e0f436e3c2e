use std::sync::Arc;

use bytes::Bytes;
use common::http::ext::{OptionExt, RequestGlobalExt, ResultExt};
use common::http::router::ext::RequestExt as _;
use common::http::Body;
use http_body_util::BodyExt;
use hyper::StatusCode;
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};
use super::request_context::RequestContext;
use crate::global::ApiGlobal;

pub trait RequestExt {
	fn global<G: ApiGlobal>(&self) -> Result<Arc<G>>;

	fn context(&self) -> Result<RequestContext>;

	/// A numeric path parameter, anything else does not name a resource.
	fn path_id(&self, key: &str) -> Result<i64>;

	fn query<T: DeserializeOwned>(&self) -> Result<T>;
}

impl<B> RequestExt for hyper::Request<B> {
	#[track_caller]
	fn global<G: ApiGlobal>(&self) -> Result<Arc<G>> {
		<Self as RequestGlobalExt<ApiError>>::get_global::<G>(self)
	}

	fn context(&self) -> Result<RequestContext> {
		self.data::<RequestContext>()
			.cloned()
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "request context not set"))
	}

	fn path_id(&self, key: &str) -> Result<i64> {
		self.param(key)
			.and_then(|id| id.parse().ok())
			.map_err_route((StatusCode::NOT_FOUND, "not found"))
	}

	fn query<T: DeserializeOwned>(&self) -> Result<T> {
		serde_urlencoded::from_str(self.uri().query().unwrap_or_default())
			.map_err_route((StatusCode::BAD_REQUEST, "invalid query string"))
	}
}

/// Decodes an `application/x-www-form-urlencoded` body. Fields the form does
/// not declare are ignored.
pub async fn read_form<T: DeserializeOwned>(body: Body) -> Result<T> {
	let bytes: Bytes = match body.collect().await {
		Ok(collected) => collected.to_bytes(),
		Err(never) => match never {},
	};

	serde_urlencoded::from_bytes(&bytes).map_err_route((StatusCode::BAD_REQUEST, "invalid form"))
}
