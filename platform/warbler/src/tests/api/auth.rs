use common::global::GlobalDb;
use hyper::StatusCode;

use super::TestClient;
use crate::database::User;
use crate::tests::global::{create_user, mock_global_state};

#[tokio::test]
async fn test_signup() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let mut client = TestClient::new(&global);

	let res = client.get("/signup").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Join Warbler today."));

	let res = client
		.post_form(
			"/signup",
			&[
				("username", "newuser"),
				("email", "new@test.com"),
				("password", "password"),
				("image_url", ""),
			],
		)
		.await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/");
	assert!(client.session().is_some());

	let user = User::by_username(global.db(), "newuser")
		.await
		.expect("failed to fetch user")
		.expect("user was not created");
	assert_eq!(user.email, "new@test.com");
	assert_ne!(user.password, "password");

	let res = client.get("/").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("@newuser"));
}

#[tokio::test]
async fn test_signup_taken_username() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);

	let res = client
		.post_form(
			"/signup",
			&[("username", "testuser"), ("email", "other@test.com"), ("password", "password")],
		)
		.await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Username or email already taken"));
	assert!(res.body.contains("value=\"other@test.com\""));

	let res = client.get("/").await;
	assert!(!res.body.contains("Username or email already taken"));
}

#[tokio::test]
async fn test_signup_invalid_form() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let mut client = TestClient::new(&global);

	let res = client
		.post_form(
			"/signup",
			&[("username", "shortpw"), ("email", "not-an-email"), ("password", "abc")],
		)
		.await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Please enter a valid email address."));
	assert!(res.body.contains("Password must be at least 6 characters."));

	let user = User::by_username(global.db(), "shortpw").await.expect("failed to fetch user");
	assert!(user.is_none());
}

#[tokio::test]
async fn test_login_and_logout() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);

	let res = client
		.post_form("/login", &[("username", "testuser"), ("password", "password")])
		.await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/");

	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Hello, testuser!"));

	// Flashes are shown exactly once.
	let res = client.get("/").await;
	assert!(!res.body.contains("Hello, testuser!"));
	assert!(res.body.contains("Log out"));

	let res = client.post("/logout").await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/login");

	let res = client.follow(res).await;
	assert!(res.body.contains("You have successfully logged out."));
	assert!(!res.body.contains("Log out"));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);

	let res = client
		.post_form("/login", &[("username", "testuser"), ("password", "wrongpassword")])
		.await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Invalid credentials."));

	let res = client
		.post_form("/login", &[("username", "nobody"), ("password", "password")])
		.await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Invalid credentials."));

	let res = client.get("/").await;
	assert!(!res.body.contains("Log out"));
}
