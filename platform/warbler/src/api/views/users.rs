use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::{Body, RouteError};
use hyper::{Method, StatusCode};

use super::auth::USERNAME_TAKEN;
use super::{not_found, redirect, require_auth, split_body, Page, PAGE_SIZE};
use crate::api::auth::AuthData;
use crate::api::error::Result;
use crate::api::ext::{read_form, RequestExt};
use crate::api::forms::{check, ProfileForm, SearchQuery};
use crate::api::session::FlashCategory;
use crate::database::{AuthoredMessage, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, IntegrityKind, Like, ProfileUpdate, User};
use crate::global::ApiGlobal;

async fn fetch_user<G: ApiGlobal>(global: &Arc<G>, id: i64) -> Result<Option<User>> {
	User::by_id(global.db(), id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"))
}

/// Ids of the users the visitor follows, empty for anonymous visitors.
async fn following_ids<G: ApiGlobal>(global: &Arc<G>, auth: Option<&AuthData>) -> Result<Vec<i64>> {
	let Some(auth) = auth else {
		return Ok(Vec::new());
	};

	Ok(auth
		.user
		.following(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch followed users"))?
		.into_iter()
		.map(|user| user.id)
		.collect())
}

async fn liked_ids<G: ApiGlobal>(global: &Arc<G>, auth: Option<&AuthData>) -> Result<Vec<i64>> {
	let Some(auth) = auth else {
		return Ok(Vec::new());
	};

	Like::message_ids(global.db(), auth.user.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch likes"))
}

/// Renders one of the profile pages of `user` with the header they share.
async fn profile_page<G: ApiGlobal>(
	global: &Arc<G>,
	template: &'static str,
	user: &User,
	auth: Option<&AuthData>,
) -> Result<Page> {
	let stats = user
		.stats(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user stats"))?;

	let following = following_ids(global, auth).await?;
	let liked = liked_ids(global, auth).await?;

	Ok(Page::new(template)
		.with("user", user)
		.with("stats", &stats)
		.with("is_following", &following.contains(&user.id))
		.with("following", &following)
		.with("liked", &liked))
}

pub async fn list<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let query: SearchQuery = req.query()?;

	let users = User::search(global.db(), query.q.as_deref())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to search users"))?;

	let auth = context.auth().await;
	let following = following_ids(&global, auth.as_ref()).await?;

	Page::new("users/index.html")
		.with("users", &users)
		.with("following", &following)
		.with("query", &query.q)
		.render(&global, &req)
		.await
}

pub async fn show<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let user_id = req.path_id("user_id")?;

	let Some(user) = fetch_user(&global, user_id).await? else {
		return not_found::<G>(req).await;
	};

	let messages = AuthoredMessage::by_author(global.db(), user.id, PAGE_SIZE)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch messages"))?;

	let auth = context.auth().await;

	profile_page(&global, "users/show.html", &user, auth.as_ref())
		.await?
		.with("messages", &messages)
		.render(&global, &req)
		.await
}

pub async fn following<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let user_id = req.path_id("user_id")?;

	let Some(user) = fetch_user(&global, user_id).await? else {
		return not_found::<G>(req).await;
	};

	let users = user
		.following(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch followed users"))?;

	profile_page(&global, "users/following.html", &user, Some(&auth))
		.await?
		.with("users", &users)
		.render(&global, &req)
		.await
}

pub async fn followers<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let user_id = req.path_id("user_id")?;

	let Some(user) = fetch_user(&global, user_id).await? else {
		return not_found::<G>(req).await;
	};

	let users = user
		.followers(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch followers"))?;

	profile_page(&global, "users/followers.html", &user, Some(&auth))
		.await?
		.with("users", &users)
		.render(&global, &req)
		.await
}

pub async fn likes<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let user_id = req.path_id("user_id")?;

	let Some(user) = fetch_user(&global, user_id).await? else {
		return not_found::<G>(req).await;
	};

	let messages = user
		.likes(global.db())
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch liked messages"))?;

	profile_page(&global, "users/likes.html", &user, Some(&auth))
		.await?
		.with("messages", &messages)
		.render(&global, &req)
		.await
}

pub async fn follow<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let follow_id = req.path_id("follow_id")?;

	let Some(followed) = fetch_user(&global, follow_id).await? else {
		return not_found::<G>(req).await;
	};

	if followed.id == auth.user.id {
		context.flash(FlashCategory::Danger, "You cannot follow yourself.").await;
		return Ok(redirect(&format!("/users/{}", auth.user.id)));
	}

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	auth.user
		.follow(&mut *tx, &followed)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to follow user"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(redirect(&format!("/users/{}/following", auth.user.id)))
}

pub async fn stop_following<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;
	let follow_id = req.path_id("follow_id")?;

	let Some(followed) = fetch_user(&global, follow_id).await? else {
		return not_found::<G>(req).await;
	};

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	auth.user
		.unfollow(&mut *tx, &followed)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to unfollow user"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	Ok(redirect(&format!("/users/{}/following", auth.user.id)))
}

/// Image urls still pointing at the defaults are shown as empty inputs.
fn profile_form(user: &User) -> ProfileForm {
	ProfileForm {
		username: user.username.clone(),
		email: user.email.clone(),
		image_url: Some(user.image_url.clone()).filter(|url| url != DEFAULT_IMAGE_URL),
		header_image_url: Some(user.header_image_url.clone()).filter(|url| url != DEFAULT_HEADER_IMAGE_URL),
		bio: user.bio.clone(),
		location: user.location.clone(),
		password: String::new(),
	}
}

/// Edits the profile of the logged in user, the current password confirms
/// the change.
pub async fn profile<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;

	if req.method() != Method::POST {
		return Page::new("users/edit.html")
			.with("form", &profile_form(&auth.user))
			.render(&global, &req)
			.await;
	}

	let (req, body) = split_body(req);
	let form: ProfileForm = read_form(body).await?;

	if let Err(errors) = check(&form) {
		return Page::new("users/edit.html")
			.with("form", &form)
			.with("errors", &errors)
			.render(&global, &req)
			.await;
	}

	if !auth.user.verify_password(&form.password) {
		context
			.flash(FlashCategory::Danger, "Wrong password, please try again.")
			.await;
		return Ok(redirect("/"));
	}

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	let update = ProfileUpdate {
		username: &form.username,
		email: &form.email,
		image_url: form.image_url.as_deref(),
		header_image_url: form.header_image_url.as_deref(),
		bio: form.bio.as_deref(),
		location: form.location.as_deref(),
	};

	let user = match User::update_profile(&mut *tx, auth.user.id, &update).await {
		Ok(Some(user)) => user,
		Ok(None) => return Err(RouteError::from((StatusCode::NOT_FOUND, "user not found"))),
		Err(err) if err.integrity_kind() == Some(IntegrityKind::Unique) => {
			drop(tx);
			context.flash(FlashCategory::Danger, USERNAME_TAKEN).await;
			return Page::new("users/edit.html").with("form", &form).render(&global, &req).await;
		}
		Err(err) => return Err(err).map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update profile")),
	};

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	let location = format!("/users/{}", user.id);
	context.set_auth(AuthData { user }).await;

	Ok(redirect(&location))
}

/// Removes the account with everything it owns and logs out.
pub async fn delete<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;
	let auth = require_auth(&context).await?;

	let mut tx = global
		.db()
		.begin()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to start transaction"))?;

	User::delete(&mut *tx, auth.user.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to delete user"))?;

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	context.reset_auth().await;

	tracing::info!(user_id = auth.user.id, "user deleted");

	Ok(redirect("/signup"))
}
