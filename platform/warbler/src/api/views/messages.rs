use common::http::ext::ResultExt;
use common::http::Body;
use hyper::{Method, StatusCode};

use super::{not_found, redirect, require_auth, split_body, unauthorized, Page};
use crate::api::auth::AuthError;
use crate::api::error::Result;
use crate::api::ext::{read_form, RequestExt};
use crate::api::forms::{check, MessageForm};
use crate::api::session::FlashCategory;
use crate::database::{AuthoredMessage, Like, Message};
use crate::global::ApiGlobal;

/// Posts a message as the logged in user. The author always comes from the
/// session, never from the form.
pub async fn new<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;

	if req.method() != Method::POST {
		return Page::new("messages/new.html").render(&global, &req).await;
	}

	let (req, body) = split_body(req);
	let form: MessageForm = read_form(body).await?;

	if let Err(errors) = check(&form) {
		return Page::new("messages/new.html")
			.with("form", &form)
			.with("errors", &errors)
			.render(&global, &req)
			.await;
	}

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let message = Message::create(&mut *tx, auth.user.id, &form.text)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create message"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	tracing::debug!(message_id = message.id, user_id = auth.user.id, "message created");

	Ok(redirect(&format!("/users/{}", auth.user.id)))
}

pub async fn show<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let message_id = req.path_id("message_id")?;

	let message = AuthoredMessage::by_id(global.db(), message_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch message"))?;

	let Some(message) = message else {
		return not_found::<G>(req).await;
	};

	let liked = Like::message_ids(global.db(), auth.user.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch likes"))?;

	Page::new("messages/show.html")
		.with("message", &message)
		.with("is_liked", &liked.contains(&message.id))
		.render(&global, &req)
		.await
}

/// Only the author may delete a message, anyone else is turned away with a
/// flash and the message stays.
pub async fn delete<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let message_id = req.path_id("message_id")?;

	let message = Message::by_id(global.db(), message_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch message"))?;

	let Some(message) = message else {
		return not_found::<G>(req).await;
	};

	if message.user_id != auth.user.id {
		return Err(unauthorized(&context, AuthError::NotOwner).await);
	}

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	Message::delete(&mut *tx, message.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete message"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(redirect(&format!("/users/{}", auth.user.id)))
}

/// Toggles the like of the logged in user on somebody else's message.
pub async fn like<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let message_id = req.path_id("message_id")?;

	let message = Message::by_id(global.db(), message_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch message"))?;

	let Some(message) = message else {
		return not_found::<G>(req).await;
	};

	if message.user_id == auth.user.id {
		context
			.flash(FlashCategory::Danger, "You cannot like your own warble.")
			.await;
		return Ok(redirect("/"));
	}

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let liked = Like::toggle(&mut *tx, auth.user.id, message.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to toggle like"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	tracing::debug!(message_id = message.id, user_id = auth.user.id, liked, "like toggled");

	Ok(redirect("/"))
}
