//! Tracks which session, if any, is the current one.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::session::{Session, SessionId};

/// Holder of the current session.
///
/// Shared by `Arc` between the dispatcher and every session it creates.
/// At most one session is current at a time.
#[derive(Default)]
pub struct SessionRegistry {
	current: Mutex<Option<Arc<Session>>>,
}

impl std::fmt::Debug for SessionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let current = self.current.lock().as_ref().map(|s| s.id());
		f.debug_struct("SessionRegistry").field("current", &current).finish()
	}
}

impl SessionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// The current session, if any.
	pub fn current(&self) -> Option<Arc<Session>> {
		self.current.lock().clone()
	}

	/// Makes `session` current and returns the session it replaced.
	///
	/// The replaced session stays alive; disposing it is up to the caller.
	pub fn set_current(&self, session: Arc<Session>) -> Option<Arc<Session>> {
		let evicted = self.current.lock().replace(Arc::clone(&session));
		match &evicted {
			Some(old) if old.id() == session.id() => None,
			_ => {
				tracing::debug!(
					target = "bioview.registry",
					session = %session.id(),
					evicted = ?evicted.as_ref().map(|s| s.id()),
					"current session set"
				);
				evicted
			}
		}
	}

	/// Clears the current session if it is `id`. Returns whether it was cleared.
	pub fn clear_if(&self, id: SessionId) -> bool {
		let mut current = self.current.lock();
		if current.as_ref().is_some_and(|s| s.id() == id) {
			*current = None;
			tracing::debug!(target = "bioview.registry", session = %id, "current session cleared");
			true
		} else {
			false
		}
	}

	/// Clears the current session unconditionally, returning it.
	pub fn clear(&self) -> Option<Arc<Session>> {
		self.current.lock().take()
	}
}
