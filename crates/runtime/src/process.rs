//! Surfaces backed by a renderer-host child process.
//!
//! The host executable is started with
//!
//! ```text
//! <program> [args...] --title <title> [--resource-root <dir>]... [--retain-context]
//! ```
//!
//! and exchanges length-prefixed JSON frames ([`crate::transport`]) on its
//! stdin/stdout. Renderer protocol messages pass through unchanged. The
//! controller additionally sends `{"host": "reveal"}` frames, which the host
//! consumes itself. Stderr is inherited.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::surface::{Surface, SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceParts};
use crate::transport::PipeTransport;

/// Creates [`ProcessSurface`]s for a resolved renderer-host executable.
#[derive(Debug, Clone)]
pub struct ProcessSurfaceFactory {
	program: PathBuf,
	args: Vec<String>,
}

impl ProcessSurfaceFactory {
	/// Resolves `command` on `PATH` (or as a path) and keeps `args` as
	/// leading arguments for every launch.
	pub fn new(command: impl AsRef<OsStr>, args: Vec<String>) -> Result<Self> {
		let command = command.as_ref();
		let program = which::which(command)
			.map_err(|e| Error::RendererNotFound(format!("{}: {e}", command.to_string_lossy())))?;
		tracing::debug!(target = "bioview.process", program = %program.display(), "renderer host resolved");
		Ok(Self { program, args })
	}

	/// Resolved executable path.
	pub fn program(&self) -> &Path {
		&self.program
	}
}

impl SurfaceFactory for ProcessSurfaceFactory {
	fn create(&self, options: SurfaceOptions) -> Result<SurfaceParts> {
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let surface = ProcessSurface {
			program: self.program.clone(),
			args: self.args.clone(),
			options,
			events: events_tx,
			outbound: Mutex::new(None),
			child: Mutex::new(None),
		};
		Ok(SurfaceParts {
			surface: Arc::new(surface),
			events: events_rx,
		})
	}
}

/// A surface whose renderer runs in a child process.
///
/// The child is spawned by [`Surface::show`] and killed by [`Surface::close`]
/// or when the surface is dropped.
#[derive(Debug)]
pub struct ProcessSurface {
	program: PathBuf,
	args: Vec<String>,
	options: SurfaceOptions,
	events: mpsc::UnboundedSender<SurfaceEvent>,
	outbound: Mutex<Option<mpsc::UnboundedSender<Value>>>,
	child: Mutex<Option<Child>>,
}

impl ProcessSurface {
	fn command(&self) -> Command {
		let mut cmd = Command::new(&self.program);
		cmd.args(&self.args).arg("--title").arg(&self.options.title);
		for root in &self.options.resource_roots {
			cmd.arg("--resource-root").arg(root);
		}
		if self.options.retain_context_when_hidden {
			cmd.arg("--retain-context");
		}
		cmd.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::inherit())
			.kill_on_drop(true);
		cmd
	}
}

impl Surface for ProcessSurface {
	fn title(&self) -> &str {
		&self.options.title
	}

	fn show(&self) -> Result<()> {
		let mut child_slot = self.child.lock();
		if child_slot.is_some() {
			return Err(Error::SurfaceCreation("renderer host already started".to_string()));
		}

		let mut child = self
			.command()
			.spawn()
			.map_err(|e| Error::SurfaceCreation(format!("failed to spawn {}: {e}", self.program.display())))?;

		let stdin = child
			.stdin
			.take()
			.ok_or_else(|| Error::SurfaceCreation("renderer host stdin unavailable".to_string()))?;
		let stdout = child
			.stdout
			.take()
			.ok_or_else(|| Error::SurfaceCreation("renderer host stdout unavailable".to_string()))?;

		tracing::debug!(target = "bioview.process", pid = ?child.id(), title = %self.options.title, "renderer host started");

		let (transport, mut inbound) = PipeTransport::new(stdin, stdout);
		let (mut sender, receiver) = transport.into_parts();

		let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Value>();
		tokio::spawn(async move {
			while let Some(message) = outbound_rx.recv().await {
				if let Err(e) = sender.send(message).await {
					tracing::warn!(target = "bioview.process", error = %e, "write to renderer host failed");
					break;
				}
			}
		});

		tokio::spawn(async move {
			if let Err(e) = receiver.run().await {
				tracing::warn!(target = "bioview.process", error = %e, "renderer host read failed");
			}
		});

		let events = self.events.clone();
		tokio::spawn(async move {
			while let Some(message) = inbound.recv().await {
				if events.send(SurfaceEvent::Message(message)).is_err() {
					return;
				}
			}
			let _ = events.send(SurfaceEvent::Closed);
		});

		*self.outbound.lock() = Some(outbound_tx);
		*child_slot = Some(child);
		Ok(())
	}

	fn post_message(&self, message: Value) -> Result<()> {
		let outbound = self.outbound.lock();
		let Some(tx) = outbound.as_ref() else {
			return Err(Error::ChannelWrite("renderer host not running".to_string()));
		};
		tx.send(message)
			.map_err(|_| Error::ChannelWrite("renderer host pipe closed".to_string()))
	}

	fn reveal(&self) {
		if let Some(tx) = self.outbound.lock().as_ref() {
			let _ = tx.send(serde_json::json!({ "host": "reveal" }));
		}
	}

	fn close(&self) {
		self.outbound.lock().take();
		if let Some(mut child) = self.child.lock().take() {
			if let Err(e) = child.start_kill() {
				tracing::debug!(target = "bioview.process", error = %e, "renderer host already exited");
			}
		}
	}
}
