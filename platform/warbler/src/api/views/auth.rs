use common::http::ext::ResultExt;
use common::http::Body;
use hyper::{Method, StatusCode};

use super::{redirect, split_body, Page};
use crate::api::auth::AuthData;
use crate::api::error::Result;
use crate::api::ext::{read_form, RequestExt};
use crate::api::forms::{check, LoginForm, SignupForm};
use crate::api::session::FlashCategory;
use crate::database::{IntegrityKind, User};
use crate::global::ApiGlobal;

pub const USERNAME_TAKEN: &str = "Username or email already taken";

/// Creates the account and logs it in.
pub async fn signup<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;

	if req.method() != Method::POST {
		return Page::new("users/signup.html").render(&global, &req).await;
	}

	let (req, body) = split_body(req);
	let form: SignupForm = read_form(body).await?;

	if let Err(errors) = check(&form) {
		return Page::new("users/signup.html")
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

	let user = match User::signup(&mut *tx, &form.username, &form.email, &form.password, form.image_url.as_deref()).await {
		Ok(user) => user,
		Err(err) if err.integrity_kind() == Some(IntegrityKind::Unique) => {
			drop(tx);
			tracing::debug!(username = %form.username, "signup with a taken username or email");
			context.flash(FlashCategory::Danger, USERNAME_TAKEN).await;
			return Page::new("users/signup.html").with("form", &form).render(&global, &req).await;
		}
		Err(err) => return Err(err).map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create user")),
	};

	tx.commit()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to commit transaction"))?;

	tracing::info!(user_id = user.id, username = %user.username, "user signed up");

	context.set_auth(AuthData { user }).await;

	Ok(redirect("/"))
}

pub async fn login<G: ApiGlobal>(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let global = req.global::<G>()?;
	let context = req.context()?;

	if req.method() != Method::POST {
		return Page::new("users/login.html").render(&global, &req).await;
	}

	let (req, body) = split_body(req);
	let form: LoginForm = read_form(body).await?;

	if let Err(errors) = check(&form) {
		return Page::new("users/login.html")
			.with("form", &form)
			.with("errors", &errors)
			.render(&global, &req)
			.await;
	}

	let user = User::authenticate(global.db(), &form.username, &form.password)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to authenticate"))?;

	let Some(user) = user else {
		context.flash(FlashCategory::Danger, "Invalid credentials.").await;
		return Page::new("users/login.html").with("form", &form).render(&global, &req).await;
	};

	context
		.flash(FlashCategory::Success, format!("Hello, {}!", user.username))
		.await;
	context.set_auth(AuthData { user }).await;

	Ok(redirect("/"))
}

pub async fn logout(req: hyper::Request<Body>) -> Result<hyper::Response<Body>> {
	let context = req.context()?;

	context.reset_auth().await;
	context
		.flash(FlashCategory::Success, "You have successfully logged out.")
		.await;

	Ok(redirect("/login"))
}
