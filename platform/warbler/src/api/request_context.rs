use std::sync::Arc;

use tokio::sync::RwLock;

use super::auth::AuthData;
use super::session::{Flash, FlashCategory, SessionState};

#[derive(Default, Clone)]
pub struct ContextData {
	pub auth: Option<AuthData>,
	pub session: SessionState,
	/// Set whenever the session changed and the cookie has to be rewritten.
	pub dirty: bool,
}

/// Per request state shared between the session middleware and the handlers.
#[derive(Default, Clone)]
pub struct RequestContext(Arc<RwLock<ContextData>>);

impl RequestContext {
	/// Installs the session read from the cookie, without marking it changed.
	pub async fn load(&self, session: SessionState, auth: Option<AuthData>) {
		let mut guard = self.0.write().await;
		guard.session = session;
		guard.auth = auth;
	}

	pub async fn set_auth(&self, data: AuthData) {
		let mut guard = self.0.write().await;
		guard.session.user_id = Some(data.user.id);
		guard.auth = Some(data);
		guard.dirty = true;
	}

	pub async fn reset_auth(&self) {
		let mut guard = self.0.write().await;
		guard.session.user_id = None;
		guard.auth = None;
		guard.dirty = true;
	}

	pub async fn auth(&self) -> Option<AuthData> {
		self.0.read().await.auth.clone()
	}

	pub async fn flash(&self, category: FlashCategory, message: impl Into<String>) {
		let mut guard = self.0.write().await;
		guard.session.flashes.push(Flash::new(category, message));
		guard.dirty = true;
	}

	/// Removes and returns the pending flashes, they are shown exactly once.
	pub async fn take_flashes(&self) -> Vec<Flash> {
		let mut guard = self.0.write().await;
		if guard.session.flashes.is_empty() {
			return Vec::new();
		}

		guard.dirty = true;
		std::mem::take(&mut guard.session.flashes)
	}

	/// The session to write back, if it changed during the request.
	pub async fn changed_session(&self) -> Option<SessionState> {
		let guard = self.0.read().await;
		guard.dirty.then(|| guard.session.clone())
	}
}
