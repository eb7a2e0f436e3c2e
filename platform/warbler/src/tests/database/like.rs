use common::global::GlobalDb;

use crate::database::{IntegrityKind, Like, Message};
use crate::tests::global::{create_user, mock_global_state};

#[tokio::test]
async fn test_like_once() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let author = create_user(&global, "author").await;
	let reader = create_user(&global, "reader").await;
	let message = Message::create(global.db(), author.id, "Hello").await.expect("failed to create message");

	Like::create(global.db(), reader.id, message.id).await.expect("failed to like");

	let err = Like::create(global.db(), reader.id, message.id)
		.await
		.expect_err("second like was accepted");
	assert_eq!(err.integrity_kind(), Some(IntegrityKind::Unique));

	let likes = reader.likes(global.db()).await.expect("failed to fetch likes");
	assert_eq!(likes.len(), 1);
	assert_eq!(likes[0].id, message.id);
	assert_eq!(likes[0].username, "author");
}

#[tokio::test]
async fn test_toggle() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let author = create_user(&global, "author").await;
	let reader = create_user(&global, "reader").await;
	let message = Message::create(global.db(), author.id, "Hello").await.expect("failed to create message");

	let mut conn = global.db().acquire().await.expect("failed to acquire connection");

	assert!(Like::toggle(&mut conn, reader.id, message.id).await.expect("failed to toggle"));
	assert!(!Like::toggle(&mut conn, reader.id, message.id).await.expect("failed to toggle"));
	assert!(Like::toggle(&mut conn, reader.id, message.id).await.expect("failed to toggle"));

	assert_eq!(
		Like::message_ids(&mut *conn, reader.id).await.expect("failed to fetch likes"),
		vec![message.id]
	);
}

#[tokio::test]
async fn test_likes_removed_with_message() {
	let (global, _handler) = mock_global_state(Default::default()).await;
	let author = create_user(&global, "author").await;
	let reader = create_user(&global, "reader").await;
	let message = Message::create(global.db(), author.id, "Hello").await.expect("failed to create message");

	Like::create(global.db(), reader.id, message.id).await.expect("failed to like");
	Message::delete(global.db(), message.id).await.expect("failed to delete message");

	assert!(Like::message_ids(global.db(), reader.id)
		.await
		.expect("failed to fetch likes")
		.is_empty());
}
