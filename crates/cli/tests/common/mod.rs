#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bioview_cli::{Config, Dispatcher, DispatcherContext, PickPurpose, Prompter};
use bioview_protocol::Database;
use bioview_runtime::{MemoryHost, MemorySurfaceFactory, Notifier, SessionRegistry};
use tokio::sync::mpsc;

/// Prompter answering from a script and recording what it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
	pub database: Mutex<Option<Database>>,
	pub accession: Mutex<Option<String>>,
	pub files: Mutex<Vec<String>>,
	pub confirm: Mutex<bool>,
	pub confirmations: Mutex<Vec<(String, u64)>>,
	pub picks: AtomicUsize,
	/// Runs once, while the next large-file confirmation is pending.
	pub on_confirm: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

#[async_trait]
impl Prompter for ScriptedPrompter {
	async fn pick_database(&self) -> Option<Database> {
		*self.database.lock().unwrap()
	}

	async fn input_accession(&self, _database: Database) -> Option<String> {
		self.accession.lock().unwrap().clone()
	}

	async fn pick_files(&self, _purpose: PickPurpose) -> Vec<String> {
		self.picks.fetch_add(1, Ordering::SeqCst);
		std::mem::take(&mut *self.files.lock().unwrap())
	}

	async fn confirm_large_file(&self, name: &str, bytes: u64) -> bool {
		self.confirmations.lock().unwrap().push((name.to_string(), bytes));
		let hook = self.on_confirm.lock().unwrap().take();
		if let Some(hook) = hook {
			hook();
		}
		*self.confirm.lock().unwrap()
	}
}

#[derive(Default)]
pub struct RecordingNotifier {
	pub errors: Mutex<Vec<String>>,
	pub infos: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
	fn error(&self, message: &str) {
		self.errors.lock().unwrap().push(message.to_string());
	}

	fn info(&self, message: &str) {
		self.infos.lock().unwrap().push(message.to_string());
	}
}

pub struct Harness {
	pub dispatcher: Arc<Dispatcher>,
	pub registry: Arc<SessionRegistry>,
	pub factory: Arc<MemorySurfaceFactory>,
	pub hosts: mpsc::UnboundedReceiver<MemoryHost>,
	pub prompter: Arc<ScriptedPrompter>,
	pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
	/// Dispatcher over surfaces that report `ready` as soon as they are shown.
	pub fn new() -> Self {
		Self::build(test_config(), true)
	}

	pub fn build(config: Config, auto_ready: bool) -> Self {
		let (factory, hosts) = MemorySurfaceFactory::new();
		let factory = Arc::new(factory.with_auto_ready(auto_ready));
		let registry = Arc::new(SessionRegistry::new());
		let prompter = Arc::new(ScriptedPrompter::default());
		let notifier = Arc::new(RecordingNotifier::default());

		let dispatcher = Dispatcher::new(DispatcherContext {
			registry: Arc::clone(&registry),
			factory: factory.clone(),
			prompter: prompter.clone(),
			notifier: notifier.clone(),
			config,
		});

		Self {
			dispatcher: Arc::new(dispatcher),
			registry,
			factory,
			hosts,
			prompter,
			notifier,
		}
	}

	/// The next created surface's renderer side.
	pub fn host(&mut self) -> MemoryHost {
		self.hosts.try_recv().expect("a surface was created")
	}

	pub fn errors(&self) -> Vec<String> {
		self.notifier.errors.lock().unwrap().clone()
	}
}

pub fn test_config() -> Config {
	Config {
		resource_roots: vec![PathBuf::from("/opt/bioview/dist")],
		ready_timeout_ms: 2_000,
		..Config::default()
	}
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
	let path = dir.join(name);
	std::fs::write(&path, bytes).unwrap();
	path
}

/// Creates a sparse file of `len` bytes.
pub fn sparse_file(dir: &Path, name: &str, len: u64) -> PathBuf {
	let path = dir.join(name);
	let file = std::fs::File::create(&path).unwrap();
	file.set_len(len).unwrap();
	path
}

pub async fn eventually(mut condition: impl FnMut() -> bool) {
	for _ in 0..200 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	panic!("condition not reached");
}
