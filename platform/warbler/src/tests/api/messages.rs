use common::global::GlobalDb;
use hyper::StatusCode;

use super::TestClient;
use crate::database::{Like, Message, User};
use crate::tests::global::{create_user, mock_global_state};

#[tokio::test]
async fn test_add_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.post_form("/messages/new", &[("text", "Hello")]).await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), format!("/users/{}", user.id));

	let messages = user.messages(global.db()).await.expect("failed to fetch messages");
	assert_eq!(messages.len(), 1);
	assert_eq!(messages[0].text, "Hello");
}

#[tokio::test]
async fn test_add_message_logged_out() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);

	let res = client.post_form("/messages/new", &[("text", "Hello")]).await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/");

	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Access unauthorized."));

	let messages = user.messages(global.db()).await.expect("failed to fetch messages");
	assert!(messages.is_empty());
}

#[tokio::test]
async fn test_add_message_too_long() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let text = "a".repeat(141);
	let res = client.post_form("/messages/new", &[("text", text.as_str())]).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Messages must be between 1 and 140 characters."));

	let messages = user.messages(global.db()).await.expect("failed to fetch messages");
	assert!(messages.is_empty());
}

#[tokio::test]
async fn test_add_message_ignores_spoofed_user() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let other = create_user(&global, "otheruser").await;

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let other_id = other.id.to_string();
	let res = client
		.post_form("/messages/new", &[("text", "Spoofed"), ("user_id", other_id.as_str())])
		.await;
	assert_eq!(res.status, StatusCode::FOUND);

	assert!(other.messages(global.db()).await.expect("failed to fetch messages").is_empty());

	let messages = user.messages(global.db()).await.expect("failed to fetch messages");
	assert_eq!(messages.len(), 1);

	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("@testuser</a>"));
	assert!(res.body.contains("Spoofed"));
}

#[tokio::test]
async fn test_show_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let message = Message::create(global.db(), user.id, "Look at me")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.get(&format!("/messages/{}", message.id)).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Look at me"));
	assert!(res.body.contains("@testuser</a>"));

	let res = client.get("/messages/9999").await;
	assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let message = Message::create(global.db(), user.id, "Delete me")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.post(&format!("/messages/{}/delete", message.id)).await;
	assert_eq!(res.status, StatusCode::FOUND);

	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(!res.body.contains("Delete me"));

	let message = Message::by_id(global.db(), message.id).await.expect("failed to fetch message");
	assert!(message.is_none());
}

#[tokio::test]
async fn test_delete_message_logged_out() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let message = Message::create(global.db(), user.id, "Keep me")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);

	let res = client.post(&format!("/messages/{}/delete", message.id)).await;
	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Access unauthorized"));

	let message = Message::by_id(global.db(), message.id).await.expect("failed to fetch message");
	assert!(message.is_some());
}

#[tokio::test]
async fn test_delete_message_wrong_user() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let owner = create_user(&global, "testuser").await;
	let intruder = create_user(&global, "intruder").await;
	let message = Message::create(global.db(), owner.id, "Keep me")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(intruder.id);

	let res = client.post(&format!("/messages/{}/delete", message.id)).await;
	assert_eq!(res.status, StatusCode::FOUND);

	let res = client.follow(res).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Access unauthorized"));

	let message = Message::by_id(global.db(), message.id).await.expect("failed to fetch message");
	assert!(message.is_some());
}

#[tokio::test]
async fn test_like_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let author = create_user(&global, "author").await;
	let reader = create_user(&global, "reader").await;
	let message = Message::create(global.db(), author.id, "Like me")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(reader.id);

	let res = client.post(&format!("/messages/{}/like", message.id)).await;
	assert_eq!(res.status, StatusCode::FOUND);
	assert_eq!(res.location(), "/");

	let liked = Like::message_ids(global.db(), reader.id).await.expect("failed to fetch likes");
	assert_eq!(liked, vec![message.id]);

	let res = client.get(&format!("/users/{}/likes", reader.id)).await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("Like me"));

	// A second like takes it back.
	client.post(&format!("/messages/{}/like", message.id)).await;

	let liked = Like::message_ids(global.db(), reader.id).await.expect("failed to fetch likes");
	assert!(liked.is_empty());
}

#[tokio::test]
async fn test_like_own_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let author = create_user(&global, "author").await;
	let message = Message::create(global.db(), author.id, "My own")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(author.id);

	let res = client.post(&format!("/messages/{}/like", message.id)).await;
	let res = client.follow(res).await;
	assert!(res.body.contains("You cannot like your own warble."));

	let liked = Like::message_ids(global.db(), author.id).await.expect("failed to fetch likes");
	assert!(liked.is_empty());
}

#[tokio::test]
async fn test_timeline_shows_followed_messages() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let user = create_user(&global, "testuser").await;
	let followed = create_user(&global, "followed").await;
	let stranger = create_user(&global, "stranger").await;

	user.follow(global.db(), &followed).await.expect("failed to follow");

	Message::create(global.db(), user.id, "my own warble").await.expect("failed to create message");
	Message::create(global.db(), followed.id, "followed warble")
		.await
		.expect("failed to create message");
	Message::create(global.db(), stranger.id, "stranger warble")
		.await
		.expect("failed to create message");

	let mut client = TestClient::new(&global);
	client.login_as(user.id);

	let res = client.get("/").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(res.body.contains("my own warble"));
	assert!(res.body.contains("followed warble"));
	assert!(!res.body.contains("stranger warble"));

	// The account going away ends the session on the next request.
	User::delete(global.db(), user.id).await.expect("failed to delete user");

	let res = client.get("/").await;
	assert_eq!(res.status, StatusCode::OK);
	assert!(!res.body.contains("my own warble"));
	assert!(client.session().is_none());
}
