use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct RawContext {
	token: CancellationToken,
	// Dropped together with the last clone of the context, which is what the
	// handler waits for.
	_alive: mpsc::Sender<()>,
}

/// A cloneable cancellation signal handed to every long running task.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

pub struct Handler {
	token: CancellationToken,
	alive: mpsc::Receiver<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let token = CancellationToken::new();
		let (alive_send, alive_recv) = mpsc::channel(1);

		(
			Self(Arc::new(RawContext {
				token: token.clone(),
				_alive: alive_send,
			})),
			Handler {
				token,
				alive: alive_recv,
			},
		)
	}

	/// Resolves once the handler cancelled the context.
	pub async fn done(&self) {
		self.0.token.cancelled().await
	}
}

impl Handler {
	/// Resolves once every clone of the context has been dropped, without
	/// cancelling it.
	pub async fn done(&mut self) {
		while self.alive.recv().await.is_some() {}
	}

	/// Cancels the context and waits for every clone of it to be dropped.
	pub async fn cancel(mut self) {
		self.token.cancel();
		self.done().await;
	}
}
