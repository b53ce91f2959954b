//! Error types for the BioView runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the session runtime.
#[derive(Debug, Error)]
pub enum Error {
	/// The content surface could not be created or shown.
	#[error("Failed to create viewer surface: {0}")]
	SurfaceCreation(String),

	/// Renderer host executable was not found.
	#[error("Renderer host not found: {0}")]
	RendererNotFound(String),

	/// Posting a message to the renderer failed.
	#[error("Failed to send message to renderer: {0}")]
	ChannelWrite(String),

	/// A channel closed unexpectedly.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// The session was disposed while the operation was pending.
	#[error("Session '{title}' was disposed")]
	Disposed {
		/// Title of the disposed session.
		title: String,
	},

	/// The renderer did not announce readiness in time.
	#[error("Renderer did not become ready within {ms}ms")]
	ReadyTimeout {
		/// Elapsed bound in milliseconds.
		ms: u64,
	},

	/// Transport-level error (pipe framing).
	#[error("Transport error: {0}")]
	Transport(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true for errors that leave the session unusable.
	///
	/// These are reported to the user where they occur.
	pub fn is_session_fatal(&self) -> bool {
		matches!(
			self,
			Error::SurfaceCreation(_)
				| Error::ChannelWrite(_)
				| Error::ChannelClosed
				| Error::Disposed { .. }
				| Error::ReadyTimeout { .. }
		)
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::ReadyTimeout { .. })
	}
}
