//! Turns user intents into sessions and load commands.
//!
//! # Session policy
//!
//! Every intent targets the registry's current session, revealing it, and
//! creates a new session only when there is none. A new session is awaited
//! until its renderer is ready (bounded by the configured ready timeout)
//! before anything is sent. Acquisition is serialised, so concurrent intents
//! never boot two sessions.
//!
//! # Batches
//!
//! Inputs are classified and sent one at a time, in order. In an open batch
//! the first input that is actually sent replaces the scene and every later
//! one is appended. An append batch appends everything. Per-input problems
//! (unsupported format, unreadable file, declined large file) are notified
//! and the batch moves on. A failed write to the renderer ends the batch and
//! is returned. If the viewer is closed mid-batch, the inputs not yet sent
//! are reported as failed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bioview_protocol::{Database, LoadRequest, SceneMode, UnsupportedFormat, base_name, classify};
use bioview_runtime::{Notifier, Session, SessionContext, SessionRegistry, SurfaceFactory};
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::error::{BioviewError, Result};
use crate::folder::expand_folder;
use crate::host::{PickPurpose, Prompter, format_size};

/// One input to an open or append intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
	/// A local file, read by the controller.
	Path(PathBuf),
	/// An `http(s)` location the renderer fetches itself.
	Url(Url),
}

impl Input {
	/// Parses a command-line argument.
	///
	/// `http`/`https` URLs stay URLs, `file` URLs become paths, and anything
	/// else is taken as a path.
	pub fn parse(raw: &str) -> Self {
		if let Ok(url) = Url::parse(raw) {
			match url.scheme() {
				"http" | "https" => return Self::Url(url),
				"file" => {
					if let Ok(path) = url.to_file_path() {
						return Self::Path(path);
					}
				}
				_ => {}
			}
		}
		Self::Path(PathBuf::from(raw))
	}

	/// Short name used in notifications and reports.
	pub fn display_name(&self) -> String {
		match self {
			Self::Path(path) => path
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_else(|| path.display().to_string()),
			Self::Url(url) => base_name(url.path()).to_string(),
		}
	}
}

impl From<PathBuf> for Input {
	fn from(path: PathBuf) -> Self {
		Self::Path(path)
	}
}

impl From<&str> for Input {
	fn from(raw: &str) -> Self {
		Self::parse(raw)
	}
}

/// What happened to each input of an intent, by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
	/// Inputs sent to the renderer, in send order.
	pub sent: Vec<String>,
	/// Inputs the user declined.
	pub skipped: Vec<String>,
	/// Inputs that could not be classified or read.
	pub failed: Vec<String>,
}

impl BatchReport {
	/// True when the intent did nothing, e.g. because the user cancelled.
	pub fn is_empty(&self) -> bool {
		self.sent.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
	}
}

/// Per-input failure. Reported to the user, never fatal to a batch.
#[derive(Debug, Error)]
enum InputError {
	#[error("Unsupported file format: {}", .0.filename)]
	Unsupported(#[from] UnsupportedFormat),

	#[error("Failed to read {path}: {source}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
}

/// Collaborators the dispatcher is built from.
#[derive(Clone)]
pub struct DispatcherContext {
	pub registry: Arc<SessionRegistry>,
	pub factory: Arc<dyn SurfaceFactory>,
	pub prompter: Arc<dyn Prompter>,
	pub notifier: Arc<dyn Notifier>,
	pub config: Config,
}

pub struct Dispatcher {
	registry: Arc<SessionRegistry>,
	factory: Arc<dyn SurfaceFactory>,
	prompter: Arc<dyn Prompter>,
	notifier: Arc<dyn Notifier>,
	config: Config,
	acquire_lock: tokio::sync::Mutex<()>,
}

impl Dispatcher {
	pub fn new(context: DispatcherContext) -> Self {
		Self {
			registry: context.registry,
			factory: context.factory,
			prompter: context.prompter,
			notifier: context.notifier,
			config: context.config,
			acquire_lock: tokio::sync::Mutex::new(()),
		}
	}

	pub fn registry(&self) -> &Arc<SessionRegistry> {
		&self.registry
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The current session, if any.
	pub fn current(&self) -> Option<Arc<Session>> {
		self.registry.current()
	}

	/// Disposes the current session. Returns whether there was one.
	pub fn close_current(&self) -> bool {
		match self.registry.current() {
			Some(session) => {
				session.dispose();
				true
			}
			None => false,
		}
	}

	/// Fetches an accession from a database, prompting for whatever is missing.
	///
	/// A cancelled prompt or a blank accession does nothing.
	pub async fn open_from_database(&self, database: Option<Database>, accession: Option<String>) -> Result<BatchReport> {
		let database = match database {
			Some(database) => database,
			None => match self.prompter.pick_database().await {
				Some(database) => database,
				None => return Ok(BatchReport::default()),
			},
		};
		let accession = match accession {
			Some(accession) => accession,
			None => match self.prompter.input_accession(database).await {
				Some(accession) => accession,
				None => return Ok(BatchReport::default()),
			},
		};
		let accession = accession.trim();
		if accession.is_empty() {
			return Ok(BatchReport::default());
		}

		let session = self.acquire().await?;
		tracing::info!(target = "bioview.dispatch", database = ?database, accession, "fetching entry");
		session.load(LoadRequest::accession(database, accession))?;

		Ok(BatchReport {
			sent: vec![accession.to_string()],
			..Default::default()
		})
	}

	/// Opens files or URLs into a fresh scene of the current session.
	///
	/// With no inputs the user is asked. Nothing chosen does nothing.
	pub async fn open_files(&self, inputs: Vec<Input>) -> Result<BatchReport> {
		let inputs = self.inputs_or_prompt(inputs, PickPurpose::Open).await;
		if inputs.is_empty() {
			return Ok(BatchReport::default());
		}
		self.load_batch(inputs, SceneMode::Replace).await
	}

	/// Opens every supported file under `dir` into a fresh scene.
	pub async fn open_folder(&self, dir: &Path) -> Result<BatchReport> {
		let files = match expand_folder(dir) {
			Ok(files) => files,
			Err(err) => {
				self.notifier.error(&err.to_string());
				return Err(err);
			}
		};
		if files.is_empty() {
			self.notifier
				.info(&format!("No supported structure or map files found in {}", dir.display()));
			return Ok(BatchReport::default());
		}
		tracing::info!(target = "bioview.dispatch", dir = %dir.display(), count = files.len(), "opening folder");
		self.load_batch(files.into_iter().map(Input::Path).collect(), SceneMode::Replace)
			.await
	}

	/// Adds files or URLs to the current scene, creating a session if needed.
	pub async fn append_files(&self, inputs: Vec<Input>) -> Result<BatchReport> {
		let inputs = self.inputs_or_prompt(inputs, PickPurpose::Append).await;
		if inputs.is_empty() {
			return Ok(BatchReport::default());
		}
		self.load_batch(inputs, SceneMode::Append).await
	}

	async fn inputs_or_prompt(&self, inputs: Vec<Input>, purpose: PickPurpose) -> Vec<Input> {
		if !inputs.is_empty() {
			return inputs;
		}
		self.prompter
			.pick_files(purpose)
			.await
			.iter()
			.map(|raw| Input::parse(raw))
			.collect()
	}

	/// Returns the current session or boots a new one and waits for it.
	///
	/// Failures are session-level: they are notified and returned.
	pub async fn acquire(&self) -> Result<Arc<Session>> {
		let _guard = self.acquire_lock.lock().await;

		if let Some(session) = self.registry.current().filter(|s| !s.is_disposed()) {
			tracing::debug!(target = "bioview.dispatch", session = %session.id(), "reusing current session");
			session.reveal();
			return Ok(session);
		}

		self.boot().await.map_err(|err| {
			self.notifier.error(&err.to_string());
			BioviewError::from(err)
		})
	}

	async fn boot(&self) -> bioview_runtime::Result<Arc<Session>> {
		let context = SessionContext {
			factory: Arc::clone(&self.factory),
			registry: Arc::clone(&self.registry),
			notifier: Arc::clone(&self.notifier),
			resource_roots: self.config.effective_resource_roots(),
			retain_context_when_hidden: self.config.retain_context_when_hidden,
		};
		let session = Session::create(self.config.title.clone(), context)?;

		let timeout = self.config.ready_timeout();
		match tokio::time::timeout(timeout, session.wait_for_ready()).await {
			Ok(Ok(())) => Ok(session),
			Ok(Err(err)) => {
				session.dispose();
				Err(err)
			}
			Err(_) => {
				tracing::warn!(target = "bioview.dispatch", session = %session.id(), ?timeout, "renderer never became ready");
				session.dispose();
				Err(bioview_runtime::Error::ReadyTimeout {
					ms: self.config.ready_timeout_ms,
				})
			}
		}
	}

	async fn load_batch(&self, inputs: Vec<Input>, mode: SceneMode) -> Result<BatchReport> {
		let session = self.acquire().await?;
		let mut report = BatchReport::default();

		let mut inputs = inputs.into_iter();
		while let Some(input) = inputs.next() {
			let name = input.display_name();
			let input_mode = match mode {
				SceneMode::Replace if report.sent.is_empty() => SceneMode::Replace,
				_ => SceneMode::Append,
			};

			let request = match self.prepare(&input, input_mode).await {
				Ok(Some(request)) => request,
				Ok(None) => {
					tracing::info!(target = "bioview.dispatch", input = %name, "large file declined");
					report.skipped.push(name);
					continue;
				}
				Err(err) => {
					tracing::warn!(target = "bioview.dispatch", input = %name, error = %err, "input rejected");
					self.notifier.error(&err.to_string());
					report.failed.push(name);
					continue;
				}
			};

			if session.is_disposed() {
				report.failed.push(name);
				report.failed.extend(inputs.by_ref().map(|input| input.display_name()));
				tracing::warn!(target = "bioview.dispatch", session = %session.id(), "viewer closed during batch");
				self.notifier
					.error(&format!("{}: viewer closed before every input was sent", session.title()));
				break;
			}

			tracing::debug!(target = "bioview.dispatch", input = %name, command = %request.command, "sending input");
			if let Err(err) = session.load(request) {
				report.failed.push(name);
				return Err(err.into());
			}
			report.sent.push(name);
		}

		tracing::info!(
			target = "bioview.dispatch",
			session = %session.id(),
			sent = report.sent.len(),
			skipped = report.skipped.len(),
			failed = report.failed.len(),
			"batch finished"
		);
		Ok(report)
	}

	/// Classifies and reads one input. `Ok(None)` means the user declined it.
	async fn prepare(&self, input: &Input, mode: SceneMode) -> std::result::Result<Option<LoadRequest>, InputError> {
		let path = match input {
			Input::Url(url) => return Ok(Some(LoadRequest::url(url.as_str(), mode)?)),
			Input::Path(path) => path,
		};

		let name = path.to_string_lossy().into_owned();
		classify(&name)?;

		let read_error = |source: std::io::Error| InputError::Read {
			path: path.display().to_string(),
			source,
		};
		let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
		if size > self.config.large_file_threshold_bytes {
			let shown = input.display_name();
			tracing::debug!(target = "bioview.dispatch", input = %shown, size = %format_size(size), "large file");
			if !self.prompter.confirm_large_file(&shown, size).await {
				return Ok(None);
			}
		}

		let bytes = tokio::fs::read(path).await.map_err(read_error)?;
		Ok(Some(LoadRequest::file(name, bytes, mode)?))
	}
}
