//! A single viewer session: one surface, one renderer, one lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Initializing --ready--> Ready <--loading/loaded--> Loading
//!       \                   |
//!        +----dispose-------+--> Disposed
//! ```
//!
//! A session becomes the registry's current session when its renderer sends
//! its first `ready`, never earlier, so the registry only ever hands out
//! sessions that accept load commands.
//!
//! Inbound messages are consumed by a pump task that holds a weak reference
//! to the session. A surface close event and an explicit [`Session::dispose`]
//! go through the same idempotent teardown.

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bioview_protocol::{Inbound, LoadCommand, LoadParams, LoadRequest, OutboundMessage, RendererMessage, payload_text};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::readiness::{Readiness, ReadySignal};
use crate::registry::SessionRegistry;
use crate::surface::{Surface, SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceParts};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
	fn next() -> Self {
		Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
	}

	/// Numeric value of the id.
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "session-{}", self.0)
	}
}

/// Observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	/// Surface created, waiting for the renderer handshake.
	Initializing,
	/// Renderer ready and idle.
	Ready,
	/// Renderer ready and a load is in flight.
	Loading,
	/// Torn down. Terminal.
	Disposed,
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Initializing => "initializing",
			Self::Ready => "ready",
			Self::Loading => "loading",
			Self::Disposed => "disposed",
		})
	}
}

/// Collaborators a session is created with.
#[derive(Clone)]
pub struct SessionContext {
	/// Creates the session's surface.
	pub factory: Arc<dyn SurfaceFactory>,
	/// Registry the session registers into once ready.
	pub registry: Arc<SessionRegistry>,
	/// Receives renderer errors for the user.
	pub notifier: Arc<dyn Notifier>,
	/// Directories the renderer may read resources from.
	pub resource_roots: Vec<PathBuf>,
	/// Keep the renderer alive while the surface is hidden.
	pub retain_context_when_hidden: bool,
}

impl SessionContext {
	/// Context with no resource roots and context retention on.
	pub fn new(factory: Arc<dyn SurfaceFactory>, registry: Arc<SessionRegistry>, notifier: Arc<dyn Notifier>) -> Self {
		Self {
			factory,
			registry,
			notifier,
			resource_roots: Vec::new(),
			retain_context_when_hidden: true,
		}
	}
}

/// One renderer instance and its message channel.
pub struct Session {
	id: SessionId,
	title: String,
	surface: Arc<dyn Surface>,
	ready: ReadySignal,
	loading: AtomicBool,
	disposed: AtomicBool,
	registry: Weak<SessionRegistry>,
	notifier: Arc<dyn Notifier>,
	pump: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("id", &self.id)
			.field("title", &self.title)
			.field("state", &self.state())
			.finish()
	}
}

impl Session {
	/// Creates a session and shows its surface.
	///
	/// The message pump is running before the surface is shown. The session
	/// is not registered as current until its renderer reports `ready`.
	///
	/// Must be called from within a tokio runtime.
	pub fn create(title: impl Into<String>, context: SessionContext) -> Result<Arc<Self>> {
		let title = title.into();
		let options = SurfaceOptions {
			title: title.clone(),
			resource_roots: context.resource_roots.clone(),
			retain_context_when_hidden: context.retain_context_when_hidden,
		};

		let SurfaceParts { surface, events } = context.factory.create(options).map_err(into_surface_error)?;

		let session = Arc::new(Self {
			id: SessionId::next(),
			title,
			surface,
			ready: ReadySignal::new(),
			loading: AtomicBool::new(false),
			disposed: AtomicBool::new(false),
			registry: Arc::downgrade(&context.registry),
			notifier: context.notifier,
			pump: Mutex::new(None),
		});

		let pump = tokio::spawn(run_pump(Arc::downgrade(&session), events));
		*session.pump.lock() = Some(pump);

		tracing::debug!(target = "bioview.session", session = %session.id, title = %session.title, "session created");

		if let Err(err) = session.surface.show() {
			tracing::warn!(target = "bioview.session", session = %session.id, error = %err, "failed to show surface");
			session.dispose();
			return Err(into_surface_error(err));
		}

		Ok(session)
	}

	/// Session identifier.
	pub fn id(&self) -> SessionId {
		self.id
	}

	/// Surface title.
	pub fn title(&self) -> &str {
		&self.title
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SessionState {
		if self.is_disposed() {
			return SessionState::Disposed;
		}
		match self.ready.get() {
			Readiness::Pending => SessionState::Initializing,
			Readiness::Ready if self.is_loading() => SessionState::Loading,
			Readiness::Ready => SessionState::Ready,
			Readiness::Disposed => SessionState::Disposed,
		}
	}

	/// Whether the renderer has completed its handshake.
	pub fn is_ready(&self) -> bool {
		self.ready.get() == Readiness::Ready
	}

	/// Whether a load is in flight.
	pub fn is_loading(&self) -> bool {
		self.loading.load(Ordering::Acquire)
	}

	/// Whether the session has been disposed.
	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::Acquire)
	}

	/// Brings the surface to the front.
	pub fn reveal(&self) {
		if !self.is_disposed() {
			self.surface.reveal();
		}
	}

	/// Waits for the renderer handshake.
	///
	/// Returns immediately when already ready. Any number of callers may wait
	/// concurrently. Fails with [`Error::Disposed`] if the session is torn down
	/// first.
	pub async fn wait_for_ready(&self) -> Result<()> {
		self.ready.wait(&self.title).await
	}

	/// Resolves once the session has been disposed.
	pub async fn closed(&self) {
		self.ready.disposed().await
	}

	/// Sends `{command, ...params}` to the renderer.
	///
	/// Marks the session as loading until the renderer reports `loaded` or
	/// `error`. A no-op on a disposed session. A failed write clears the
	/// loading flag, notifies the user, and returns [`Error::ChannelWrite`].
	pub fn load_content(&self, command: LoadCommand, params: LoadParams) -> Result<()> {
		self.send(OutboundMessage::new(command, params))
	}

	/// Sends a classified request, consuming it.
	pub fn load(&self, request: LoadRequest) -> Result<()> {
		self.send(request.into_message())
	}

	fn send(&self, message: OutboundMessage) -> Result<()> {
		if self.is_disposed() {
			tracing::debug!(target = "bioview.session", session = %self.id, command = %message.command, "dropping load on disposed session");
			return Ok(());
		}

		tracing::debug!(
			target = "bioview.session",
			session = %self.id,
			command = %message.command,
			params = %message.log_summary(),
			"load content"
		);
		if !self.is_ready() {
			tracing::warn!(target = "bioview.session", session = %self.id, command = %message.command, "renderer may not be ready yet");
		}

		let command = message.command;
		let value = message.to_value()?;

		self.loading.store(true, Ordering::Release);
		if let Err(err) = self.surface.post_message(value) {
			self.loading.store(false, Ordering::Release);
			let err = match err {
				Error::ChannelWrite(_) => err,
				other => Error::ChannelWrite(other.to_string()),
			};
			tracing::error!(target = "bioview.session", session = %self.id, %command, error = %err, "write to renderer failed");
			self.notifier.error(&format!("{}: {err}", self.title));
			return Err(err);
		}
		Ok(())
	}

	/// Applies one raw message from the renderer.
	///
	/// Malformed and unknown messages are logged and ignored.
	pub fn handle_message(self: &Arc<Self>, raw: Value) {
		if self.is_disposed() {
			return;
		}

		let message = match Inbound::decode(raw) {
			Inbound::Known(message) => message,
			Inbound::Unknown { command } => {
				tracing::debug!(target = "bioview.session", session = %self.id, %command, "ignoring unknown command");
				return;
			}
			Inbound::Malformed { reason } => {
				tracing::warn!(target = "bioview.session", session = %self.id, %reason, "ignoring malformed message");
				return;
			}
		};

		match message {
			RendererMessage::Ready => self.on_ready(),
			RendererMessage::Error { error } => {
				let text = payload_text(&error);
				self.loading.store(false, Ordering::Release);
				tracing::warn!(target = "bioview.session", session = %self.id, error = %text, "renderer error");
				self.notifier.error(&format!("{}: {text}", self.title));
			}
			RendererMessage::Info { info } => {
				tracing::info!(target = "bioview.session", session = %self.id, info = %payload_text(&info), "renderer info");
			}
			RendererMessage::Loading => self.loading.store(true, Ordering::Release),
			RendererMessage::Loaded => {
				self.loading.store(false, Ordering::Release);
				tracing::debug!(target = "bioview.session", session = %self.id, "load complete");
			}
		}
	}

	fn on_ready(self: &Arc<Self>) {
		if self.ready.get() != Readiness::Pending {
			tracing::debug!(target = "bioview.session", session = %self.id, "repeated ready ignored");
			return;
		}

		// registered before waiters wake so they observe it as current
		let registry = self.registry.upgrade();
		if let Some(registry) = &registry {
			if let Some(evicted) = registry.set_current(Arc::clone(self)) {
				tracing::info!(target = "bioview.session", session = %self.id, evicted = %evicted.id, "replacing current session");
				evicted.dispose();
			}
		}

		let ready = self.ready.mark_ready();
		if !ready || self.is_disposed() {
			if let Some(registry) = &registry {
				registry.clear_if(self.id);
			}
			return;
		}
		tracing::info!(target = "bioview.session", session = %self.id, title = %self.title, "renderer ready");
	}

	/// Tears the session down. Safe to call any number of times.
	///
	/// Clears the registry only if it still points at this session, stops the
	/// message pump, fails pending readiness waiters, and closes the surface
	/// last.
	pub fn dispose(&self) {
		if self.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		tracing::debug!(target = "bioview.session", session = %self.id, "disposing session");

		if let Some(registry) = self.registry.upgrade() {
			registry.clear_if(self.id);
		}
		if let Some(pump) = self.pump.lock().take() {
			pump.abort();
		}
		self.loading.store(false, Ordering::Release);
		self.ready.mark_disposed();

		self.surface.close();
	}
}

fn into_surface_error(err: Error) -> Error {
	match err {
		Error::SurfaceCreation(_) | Error::RendererNotFound(_) => err,
		other => Error::SurfaceCreation(other.to_string()),
	}
}

async fn run_pump(session: Weak<Session>, mut events: mpsc::UnboundedReceiver<SurfaceEvent>) {
	while let Some(event) = events.recv().await {
		let Some(session) = session.upgrade() else {
			return;
		};
		match event {
			SurfaceEvent::Message(raw) => session.handle_message(raw),
			SurfaceEvent::Closed => {
				tracing::debug!(target = "bioview.session", session = %session.id, "surface closed");
				session.dispose();
				return;
			}
		}
	}

	if let Some(session) = session.upgrade() {
		tracing::debug!(target = "bioview.session", session = %session.id, "surface event stream ended");
		session.dispose();
	}
}
