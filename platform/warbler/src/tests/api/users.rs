use common::global::GlobalDb;
use hyper::StatusCode;

use super::TestClient;
use crate::database::{Message, User};
use crate::tests::global::{create_user, mock_global_state};

#[tokio::test]
async fn test_list_and_search_users() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	create_user(&global, "testuser").await;
	create_user(&global, "otheruser").await;

	let mut client = TestClient::new(&global);

	let res = client.get("/users").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("@testuser"));
	assert!(res.body.contains("@otheruser"));

	let res = client.get("/users?q=other").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(!res.body.contains("@testuser"));
	assert!(res.body.contains("@otheruser"));

	let res = client.get("/users?q=nobody").await;
	assert!(res.body.contains("Sorry, no users found"));
}

#[tokio::test]
async fn test_show_user() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	Message::create(global.db(), user.id, "profile warble")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);

	let res = client.get(&format!("/users/{}", user.id)).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("@testuser</a>"));
	assert!(res.body.contains("profile warble"));

	let res = client.get("/users/9999").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

/// testuser follows testuser2 and testuser3, testuser4 follows testuser.
async fn setup_followers(global: &std::sync::Arc<crate::global::GlobalState>) -> User {
	let user = create_user(global, "testuser").await;
	let user2 = create_user(global, "testuser2").await;
	let user3 = create_user(global, "testuser3").await;
	let user4 = create_user(global, "testuser4").await;

	user.follow(global.db(), &user2).await.expect("failed to follow");
	user.follow(global.db(), &user3).await.expect("failed to follow");
	user4.follow(global.db(), &user).await.expect("failed to follow");

	user
}

#[tokio::test]
async fn test_following_page() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = setup_followers(&global).await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.get(&format!("/users/{}/following", user.id)).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("alt=\"Image for testuser2\""));
	assert!(res.body.contains("alt=\"Image for testuser3\""));
	assert!(!res.body.contains("alt=\"Image for testuser4\""));
}

#[tokio::test]
async fn test_followers_page() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = setup_followers(&global).await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.get(&format!("/users/{}/followers", user.id)).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("alt=\"Image for testuser4\""));
	assert!(!res.body.contains("alt=\"Image for testuser2\""));
}

#[tokio::test]
async fn test_follow_pages_logged_out() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = setup_followers(&global).await;

	let mut client = TestClient::new(&global);

	for page in ["following", "followers", "likes"] {
		let res = client.get(&format!("/users/{}/{page}", user.id)).await;
		assert_eq!(res.status, StatusCode::FOUND);

		let res = client.follow(res).await;
		assert_eq!(res.status, StatusCode::OK);
		assert!(res.body.contains("Access unauthorized."));
		assert!(!res.body.contains("testuser3"));
	}
}

#[tokio::test]
async fn test_follow_and_stop_following() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let other = create_user(&global, "otheruser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.post(&format!("/users/follow/{}", other.id)).await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), format!("/users/{}/following", user.id));
	assert!(user.is_following(global.db(), &other).await.expect("failed to check follow"));

	// Following twice changes nothing.
	client.post(&format!("/users/follow/{}", other.id)).await;
	assert_eq!(user.following(global.db()).await.expect("failed to fetch following").len(), 1);

	client.post(&format!("/users/stop-following/{}", other.id)).await;
	assert!(!user.is_following(global.db(), &other).await.expect("failed to check follow"));
}

#[tokio::test]
async fn test_follow_self() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.post(&format!("/users/follow/{}", user.id)).await;
	let res = client.follow(res).await;
	assert!(res.body.contains("You cannot follow yourself."));
	assert!(!user.is_following(global.db(), &user).await.expect("failed to check follow"));
}

#[tokio::test]
async fn test_edit_profile() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.get("/users/profile").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("value=\"testuser\""));

	let res = client
		.post_form(
			"/users/profile",
			&[
				("username", "renamed"),
				("email", "renamed@test.com"),
				("image_url", ""),
				("header_image_url", ""),
				("bio", "Hello there"),
				("location", "Somewhere"),
				("password", "password"),
			],
		)
		.await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), format!("/users/{}", user.id));

	let updated = User::by_id(global.db(), user.id)
		.await
		.expect("failed to fetch user")
		.expect("user disappeared");
	assert_eq!(updated.username, "renamed");
	assert_eq!(updated.bio.as_deref(), Some("Hello there"));
	assert_eq!(updated.location.as_deref(), Some("Somewhere"));
	assert_eq!(updated.image_url, crate::database::DEFAULT_IMAGE_URL);
}

#[tokio::test]
async fn test_edit_profile_wrong_password() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client
		.post_form(
			"/users/profile",
			&[("username", "renamed"), ("email", "renamed@test.com"), ("password", "wrongpassword")],
		)
		.await;
	let res = client.follow(res).await;
	assert!(res.body.contains("Wrong password, please try again."));

	let unchanged = User::by_id(global.db(), user.id)
		.await
		.expect("failed to fetch user")
		.expect("user disappeared");
	assert_eq!(unchanged.username, "testuser");
}

#[tokio::test]
async fn test_edit_profile_taken_username() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	create_user(&global, "otheruser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client
		.post_form(
			"/users/profile",
			&[("username", "otheruser"), ("email", "testuser@test.com"), ("password", "password")],
		)
		.await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Username or email already taken"));

	let unchanged = User::by_id(global.db(), user.id)
		.await
		.expect("failed to fetch user")
		.expect("user disappeared");
	assert_eq!(unchanged.username, "testuser");
}

#[tokio::test]
async fn test_delete_user() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	Message::create(global.db(), user.id, "going away")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.post("/users/delete").await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/signup");
	assert!(client.session().is_none());

	assert!(User::by_id(global.db(), user.id).await.expect("failed to fetch user").is_none());
	assert!(Message::by_user(global.db(), user.id)
		.await
		.expect("failed to fetch messages")
		.is_empty());
}

#[tokio::test]
async fn test_failed_delete_keeps_session() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	sqlx::query("CREATE TRIGGER keep_users BEFORE DELETE ON users BEGIN SELECT RAISE(ABORT, 'users are kept'); END")
		.execute(global.db())
		.await
		.expect("failed to create trigger");

	let mut client = TestClient::new(&global);
	client.login_as(user.id);
	let token = client.session().map(str::to_string);

	let res = client.post("/users/delete").await;
	assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(res.headers.get(hyper::header::SET_COOKIE).is_none());
	assert_eq!(client.session().map(str::to_string), token);

	assert!(User::by_id(global.db(), user.id).await.expect("failed to fetch user").is_some());
}
