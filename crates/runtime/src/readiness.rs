//! One-shot readiness signal shared by every waiter of a session.

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Readiness of a session's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
	/// Waiting for the renderer's `ready` message.
	Pending,
	/// The renderer accepted the handshake.
	Ready,
	/// The session went away before or after becoming ready.
	Disposed,
}

/// Resolves at most once from `Pending`, then stays put.
#[derive(Debug)]
pub struct ReadySignal {
	tx: watch::Sender<Readiness>,
}

impl Default for ReadySignal {
	fn default() -> Self {
		Self::new()
	}
}

impl ReadySignal {
	/// Creates a pending signal.
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(Readiness::Pending);
		Self { tx }
	}

	/// Current readiness.
	pub fn get(&self) -> Readiness {
		*self.tx.borrow()
	}

	/// Transitions `Pending -> Ready`.
	///
	/// Returns `true` only for the call that performed the transition.
	pub fn mark_ready(&self) -> bool {
		self.tx.send_if_modified(|state| {
			if *state == Readiness::Pending {
				*state = Readiness::Ready;
				true
			} else {
				false
			}
		})
	}

	/// Moves to `Disposed` from any state, waking every waiter.
	pub fn mark_disposed(&self) {
		self.tx.send_if_modified(|state| {
			if *state == Readiness::Disposed {
				false
			} else {
				*state = Readiness::Disposed;
				true
			}
		});
	}

	/// Waits until the signal leaves `Pending`.
	///
	/// Returns immediately when already ready. `title` names the session in
	/// the `Disposed` error.
	pub async fn wait(&self, title: &str) -> Result<()> {
		let mut rx = self.tx.subscribe();
		let state = rx
			.wait_for(|state| *state != Readiness::Pending)
			.await
			.map(|state| *state)
			.map_err(|_| Error::ChannelClosed)?;

		match state {
			Readiness::Ready => Ok(()),
			_ => Err(Error::Disposed {
				title: title.to_string(),
			}),
		}
	}

	/// Waits until the signal reaches `Disposed`.
	pub async fn disposed(&self) {
		let mut rx = self.tx.subscribe();
		let _ = rx.wait_for(|state| *state == Readiness::Disposed).await;
	}
}
