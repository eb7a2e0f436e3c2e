use common::http::ext::ResultExt;
use common::http::Body;
use hyper::StatusCode;

use super::{Page, PAGE_SIZE};
use crate::api::error::Result;
use crate::api::ext::RequestExt;
use crate::database::{AuthoredMessage, Like};
use crate::global::ApiGlobal;

/// The timeline of the logged in user, or the landing page.
pub async fn index<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;

	let Some(auth) = context.auth().await else {
		return Page::new("home-anon.html").render(&global, &req).await;
	};

	let messages = AuthoredMessage::timeline(global.db(), auth.user.id, PAGE_SIZE)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch timeline"))?;

	let liked = Like::message_ids(global.db(), auth.user.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch likes"))?;

	let stats = auth
		.user
		.stats(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user stats"))?;

	Page::new("home.html")
		.with("messages", &messages)
		.with("liked", &liked)
		.with("stats", &stats)
		.render(&global, &req)
		.await
}
