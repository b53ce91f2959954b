//! In-process surfaces.
//!
//! [`MemorySurfaceFactory`] creates surfaces whose renderer side is a
//! [`MemoryHost`] handed out on a channel. Embedders that drive a renderer in
//! the same process use it directly; tests use it to script the renderer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::surface::{Surface, SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceParts};

#[derive(Debug)]
struct Shared {
	options: SurfaceOptions,
	shown: AtomicBool,
	closed: AtomicBool,
	fail_writes: AtomicBool,
	reveals: AtomicUsize,
}

/// Factory for [`MemorySurface`]s.
#[derive(Debug)]
pub struct MemorySurfaceFactory {
	hosts: mpsc::UnboundedSender<MemoryHost>,
	auto_ready: bool,
	created: AtomicUsize,
}

impl MemorySurfaceFactory {
	/// Creates a factory and the receiver its hosts are delivered on.
	///
	/// Once a [`MemoryHost`] is dropped, posting to its surface fails with
	/// [`Error::ChannelWrite`]. Dropping the receiver makes `create` fail.
	pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryHost>) {
		let (hosts, rx) = mpsc::unbounded_channel();
		let factory = Self {
			hosts,
			auto_ready: false,
			created: AtomicUsize::new(0),
		};
		(factory, rx)
	}

	/// Makes every surface announce `ready` as soon as it is shown.
	pub fn with_auto_ready(mut self, auto_ready: bool) -> Self {
		self.auto_ready = auto_ready;
		self
	}

	/// Number of surfaces created so far.
	pub fn created(&self) -> usize {
		self.created.load(Ordering::Acquire)
	}
}

impl SurfaceFactory for MemorySurfaceFactory {
	fn create(&self, options: SurfaceOptions) -> Result<SurfaceParts> {
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let (events_tx, events_rx) = mpsc::unbounded_channel();

		let shared = Arc::new(Shared {
			options,
			shown: AtomicBool::new(false),
			closed: AtomicBool::new(false),
			fail_writes: AtomicBool::new(false),
			reveals: AtomicUsize::new(0),
		});

		let host = MemoryHost {
			shared: Arc::clone(&shared),
			outbound: outbound_rx,
			events: events_tx.clone(),
		};
		self.hosts
			.send(host)
			.map_err(|_| Error::SurfaceCreation("memory host receiver dropped".to_string()))?;
		self.created.fetch_add(1, Ordering::AcqRel);

		let surface = MemorySurface {
			shared,
			outbound: outbound_tx,
			events: events_tx,
			auto_ready: self.auto_ready,
		};

		Ok(SurfaceParts {
			surface: Arc::new(surface),
			events: events_rx,
		})
	}
}

/// Controller side of an in-process surface.
#[derive(Debug)]
pub struct MemorySurface {
	shared: Arc<Shared>,
	outbound: mpsc::UnboundedSender<Value>,
	events: mpsc::UnboundedSender<SurfaceEvent>,
	auto_ready: bool,
}

impl Surface for MemorySurface {
	fn title(&self) -> &str {
		&self.shared.options.title
	}

	fn show(&self) -> Result<()> {
		if self.shared.closed.load(Ordering::Acquire) {
			return Err(Error::SurfaceCreation("surface already closed".to_string()));
		}
		self.shared.shown.store(true, Ordering::Release);
		if self.auto_ready {
			let _ = self
				.events
				.send(SurfaceEvent::Message(serde_json::json!({ "command": "ready" })));
		}
		Ok(())
	}

	fn post_message(&self, message: Value) -> Result<()> {
		if self.shared.closed.load(Ordering::Acquire) {
			return Err(Error::ChannelWrite("surface closed".to_string()));
		}
		if self.shared.fail_writes.load(Ordering::Acquire) {
			return Err(Error::ChannelWrite("write rejected by host".to_string()));
		}
		self.outbound
			.send(message)
			.map_err(|_| Error::ChannelWrite("renderer side dropped".to_string()))
	}

	fn reveal(&self) {
		self.shared.reveals.fetch_add(1, Ordering::AcqRel);
	}

	fn close(&self) {
		self.shared.closed.store(true, Ordering::Release);
	}
}

/// Renderer side of an in-process surface.
#[derive(Debug)]
pub struct MemoryHost {
	shared: Arc<Shared>,
	outbound: mpsc::UnboundedReceiver<Value>,
	events: mpsc::UnboundedSender<SurfaceEvent>,
}

impl MemoryHost {
	/// Options the surface was created with.
	pub fn options(&self) -> &SurfaceOptions {
		&self.shared.options
	}

	/// Waits for the next message posted by the session.
	pub async fn recv(&mut self) -> Option<Value> {
		self.outbound.recv().await
	}

	/// Returns the next posted message without waiting.
	pub fn try_recv(&mut self) -> Option<Value> {
		self.outbound.try_recv().ok()
	}

	/// Drains every message posted so far.
	pub fn drain(&mut self) -> Vec<Value> {
		std::iter::from_fn(|| self.try_recv()).collect()
	}

	/// Delivers a renderer message to the session. Returns `false` once the
	/// session stopped listening.
	pub fn send(&self, message: Value) -> bool {
		self.events.send(SurfaceEvent::Message(message)).is_ok()
	}

	/// Sends `{"command": "ready"}`.
	pub fn send_ready(&self) -> bool {
		self.send(serde_json::json!({ "command": "ready" }))
	}

	/// Simulates the user closing the surface.
	pub fn close(&self) {
		self.shared.closed.store(true, Ordering::Release);
		let _ = self.events.send(SurfaceEvent::Closed);
	}

	/// Whether either side closed the surface.
	pub fn is_closed(&self) -> bool {
		self.shared.closed.load(Ordering::Acquire)
	}

	/// Whether the session showed the surface.
	pub fn is_shown(&self) -> bool {
		self.shared.shown.load(Ordering::Acquire)
	}

	/// How many times the session revealed the surface.
	pub fn reveal_count(&self) -> usize {
		self.shared.reveals.load(Ordering::Acquire)
	}

	/// Makes subsequent `post_message` calls fail (or succeed again).
	pub fn fail_writes(&self, fail: bool) {
		self.shared.fail_writes.store(fail, Ordering::Release);
	}
}
