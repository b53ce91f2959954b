//! The content surface that hosts the renderer.
//!
//! A surface is the host-side view a session renders into: a child process
//! speaking framed JSON ([`crate::process`]), an in-process channel pair
//! ([`crate::memory`]), or whatever an embedder provides. The session only
//! sees this trait pair.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Options passed to a [`SurfaceFactory`] when a session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
	/// Title shown on the surface.
	pub title: String,
	/// Fixed set of directories the renderer may load resources from.
	pub resource_roots: Vec<PathBuf>,
	/// Keep the renderer alive while the surface is hidden.
	pub retain_context_when_hidden: bool,
}

impl SurfaceOptions {
	/// Options with the given title, no resource roots, and context retention on.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			resource_roots: Vec::new(),
			retain_context_when_hidden: true,
		}
	}
}

/// Event delivered from a surface to its session.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
	/// A raw message posted by the renderer.
	Message(Value),
	/// The surface was closed externally or its renderer went away.
	Closed,
}

/// Host-side handle to a renderer surface.
pub trait Surface: Send + Sync {
	/// Surface title.
	fn title(&self) -> &str;

	/// Loads the renderer content.
	///
	/// Called once, after the session has started consuming events, so an
	/// early `ready` cannot be missed.
	fn show(&self) -> Result<()>;

	/// Queues a message for the renderer.
	fn post_message(&self, message: Value) -> Result<()>;

	/// Brings the surface to the front.
	fn reveal(&self);

	/// Destroys the surface. Safe to call more than once.
	fn close(&self);
}

/// A freshly created surface and its event stream.
pub struct SurfaceParts {
	/// The surface handle.
	pub surface: Arc<dyn Surface>,
	/// Renderer messages and close notifications.
	pub events: mpsc::UnboundedReceiver<SurfaceEvent>,
}

impl std::fmt::Debug for SurfaceParts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SurfaceParts")
			.field("title", &self.surface.title())
			.finish_non_exhaustive()
	}
}

/// Creates surfaces for new sessions.
pub trait SurfaceFactory: Send + Sync {
	/// Creates a surface without showing it.
	fn create(&self, options: SurfaceOptions) -> Result<SurfaceParts>;
}
