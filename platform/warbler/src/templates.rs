use tera::Tera;

/// Every page is compiled into the binary, `.html` templates autoescape.
pub fn load() -> Result<Tera, tera::Error> {
	let mut tera = Tera::default();

	tera.add_raw_templates(vec![
		("base.html", include_str!("../templates/base.html")),
		("macros.html", include_str!("../templates/macros.html")),
		("home.html", include_str!("../templates/home.html")),
		("home-anon.html", include_str!("../templates/home-anon.html")),
		("404.html", include_str!("../templates/404.html")),
		("users/signup.html", include_str!("../templates/users/signup.html")),
		("users/login.html", include_str!("../templates/users/login.html")),
		("users/index.html", include_str!("../templates/users/index.html")),
		("users/detail.html", include_str!("../templates/users/detail.html")),
		("users/show.html", include_str!("../templates/users/show.html")),
		("users/following.html", include_str!("../templates/users/following.html")),
		("users/followers.html", include_str!("../templates/users/followers.html")),
		("users/likes.html", include_str!("../templates/users/likes.html")),
		("users/edit.html", include_str!("../templates/users/edit.html")),
		("messages/new.html", include_str!("../templates/messages/new.html")),
		("messages/show.html", include_str!("../templates/messages/show.html")),
	])?;

	Ok(tera)
}
