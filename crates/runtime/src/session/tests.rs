use std::time::Duration;

use bioview_protocol::{Database, SceneMode};
use serde_json::json;

use super::*;
use crate::memory::{MemoryHost, MemorySurfaceFactory};

#[derive(Default)]
struct RecordingNotifier {
	errors: Mutex<Vec<String>>,
	infos: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
	fn error(&self, message: &str) {
		self.errors.lock().push(message.to_string());
	}

	fn info(&self, message: &str) {
		self.infos.lock().push(message.to_string());
	}
}

struct Harness {
	registry: Arc<SessionRegistry>,
	notifier: Arc<RecordingNotifier>,
	factory: Arc<MemorySurfaceFactory>,
	hosts: mpsc::UnboundedReceiver<MemoryHost>,
}

impl Harness {
	fn new() -> Self {
		let (factory, hosts) = MemorySurfaceFactory::new();
		Self {
			registry: Arc::new(SessionRegistry::new()),
			notifier: Arc::new(RecordingNotifier::default()),
			factory: Arc::new(factory),
			hosts,
		}
	}

	fn context(&self) -> SessionContext {
		SessionContext::new(self.factory.clone(), Arc::clone(&self.registry), self.notifier.clone())
	}

	fn create(&mut self) -> (Arc<Session>, MemoryHost) {
		let session = Session::create("BioView", self.context()).unwrap();
		let host = self.hosts.try_recv().expect("host delivered on create");
		(session, host)
	}

	async fn create_ready(&mut self) -> (Arc<Session>, MemoryHost) {
		let (session, host) = self.create();
		host.send_ready();
		within(session.wait_for_ready()).await.unwrap();
		(session, host)
	}
}

async fn within<F: std::future::Future>(future: F) -> F::Output {
	tokio::time::timeout(Duration::from_secs(2), future)
		.await
		.expect("timed out")
}

async fn eventually(mut condition: impl FnMut() -> bool) {
	for _ in 0..200 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	panic!("condition not reached");
}

#[tokio::test]
async fn create_shows_surface_without_registering() {
	let mut h = Harness::new();
	let (session, host) = h.create();

	assert!(host.is_shown());
	assert_eq!(host.options().title, "BioView");
	assert_eq!(session.state(), SessionState::Initializing);
	assert!(h.registry.current().is_none());
}

#[tokio::test]
async fn ready_registers_session_and_resolves_waiters() {
	let mut h = Harness::new();
	let (session, host) = h.create();

	let waiters: Vec<_> = (0..3)
		.map(|_| {
			let session = Arc::clone(&session);
			tokio::spawn(async move { session.wait_for_ready().await })
		})
		.collect();

	host.send_ready();
	for waiter in waiters {
		within(waiter).await.unwrap().unwrap();
	}

	assert_eq!(session.state(), SessionState::Ready);
	let current = h.registry.current().expect("registered on ready");
	assert_eq!(current.id(), session.id());

	within(session.wait_for_ready()).await.unwrap();
}

#[tokio::test]
async fn repeated_ready_is_ignored() {
	let mut h = Harness::new();
	let (session, host) = h.create_ready().await;

	host.send_ready();
	host.send(json!({"command": "loaded"}));
	eventually(|| !session.is_loading()).await;

	assert_eq!(session.state(), SessionState::Ready);
	assert_eq!(h.registry.current().map(|s| s.id()), Some(session.id()));
}

#[tokio::test]
async fn malformed_and_unknown_messages_do_not_resolve_readiness() {
	let mut h = Harness::new();
	let (session, host) = h.create();

	host.send(json!({"accession": "1abc"}));
	host.send(json!({"command": 7}));
	host.send(json!({"command": "futureThing", "x": 1}));
	host.send(json!({"command": "info", "info": "booting"}));

	let outcome = tokio::time::timeout(Duration::from_millis(50), session.wait_for_ready()).await;
	assert!(outcome.is_err(), "readiness resolved without ready");
	assert_eq!(session.state(), SessionState::Initializing);
	assert!(h.notifier.errors.lock().is_empty());
}

#[tokio::test]
async fn load_content_posts_message_and_tracks_loading() {
	let mut h = Harness::new();
	let (session, mut host) = h.create_ready().await;

	session
		.load_content(LoadCommand::LoadPdb, LoadParams::accession("1abc"))
		.unwrap();
	assert!(session.is_loading());
	assert_eq!(session.state(), SessionState::Loading);

	let sent = within(host.recv()).await.unwrap();
	assert_eq!(sent, json!({"command": "loadPdb", "accession": "1abc"}));

	host.send(json!({"command": "loaded"}));
	eventually(|| !session.is_loading()).await;
	assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn load_request_is_consumed_into_message() {
	let mut h = Harness::new();
	let (session, mut host) = h.create_ready().await;

	session.load(LoadRequest::accession(Database::Emdb, "0006")).unwrap();
	let request = LoadRequest::file("ligand.pdb", b"ATOM\n".to_vec(), SceneMode::Append).unwrap();
	session.load(request).unwrap();

	assert_eq!(within(host.recv()).await.unwrap()["command"], "loadEmdb");
	let appended = within(host.recv()).await.unwrap();
	assert_eq!(appended["command"], "appendStructure");
	assert_eq!(appended["data"], "ATOM\n");
	assert_eq!(appended["isBinary"], false);
	assert_eq!(appended["label"], "ligand");
}

#[tokio::test]
async fn load_before_ready_is_still_sent() {
	let mut h = Harness::new();
	let (session, mut host) = h.create();

	session
		.load_content(LoadCommand::LoadPdb, LoadParams::accession("1abc"))
		.unwrap();
	assert_eq!(host.try_recv().unwrap()["accession"], "1abc");
}

#[tokio::test]
async fn renderer_error_is_notified_and_clears_loading() {
	let mut h = Harness::new();
	let (session, host) = h.create_ready().await;

	session
		.load_content(LoadCommand::LoadPdb, LoadParams::accession("0000"))
		.unwrap();
	host.send(json!({"command": "error", "error": "entry not found"}));

	eventually(|| !session.is_loading()).await;
	assert_eq!(session.state(), SessionState::Ready);
	assert_eq!(h.notifier.errors.lock().as_slice(), ["BioView: entry not found"]);
}

#[tokio::test]
async fn write_failure_clears_loading_and_is_returned() {
	let mut h = Harness::new();
	let (session, host) = h.create_ready().await;

	host.fail_writes(true);
	let err = session
		.load_content(LoadCommand::LoadPdb, LoadParams::accession("1abc"))
		.unwrap_err();

	assert!(matches!(err, Error::ChannelWrite(_)), "got {err:?}");
	assert!(!session.is_loading());
	assert_eq!(h.notifier.errors.lock().len(), 1);
}

#[tokio::test]
async fn dispose_is_idempotent_and_clears_registry() {
	let mut h = Harness::new();
	let (session, host) = h.create_ready().await;

	session.dispose();
	session.dispose();

	assert_eq!(session.state(), SessionState::Disposed);
	assert!(host.is_closed());
	assert!(h.registry.current().is_none());
}

#[tokio::test]
async fn dispose_leaves_newer_current_session_alone() {
	let mut h = Harness::new();
	let (old, _old_host) = h.create_ready().await;
	h.registry.clear();
	let (new, _new_host) = h.create_ready().await;

	old.dispose();

	assert_eq!(h.registry.current().map(|s| s.id()), Some(new.id()));
	assert!(!new.is_disposed());
}

#[tokio::test]
async fn surface_close_routes_through_dispose() {
	let mut h = Harness::new();
	let (session, host) = h.create_ready().await;

	host.close();
	within(session.closed()).await;

	assert!(session.is_disposed());
	assert!(h.registry.current().is_none());
	session.dispose();
}

#[tokio::test]
async fn load_after_dispose_is_a_no_op() {
	let mut h = Harness::new();
	let (session, mut host) = h.create_ready().await;

	session.dispose();
	session
		.load_content(LoadCommand::LoadPdb, LoadParams::accession("1abc"))
		.unwrap();

	assert!(host.try_recv().is_none());
	assert!(!session.is_loading());
}

#[tokio::test]
async fn dispose_before_ready_fails_waiters() {
	let mut h = Harness::new();
	let (session, _host) = h.create();

	let waiter = {
		let session = Arc::clone(&session);
		tokio::spawn(async move { session.wait_for_ready().await })
	};
	tokio::task::yield_now().await;
	session.dispose();

	let err = within(waiter).await.unwrap().unwrap_err();
	assert!(matches!(err, Error::Disposed { .. }));
	assert!(h.registry.current().is_none());
}

#[tokio::test]
async fn ready_after_dispose_does_not_register() {
	let mut h = Harness::new();
	let (session, host) = h.create();

	session.dispose();
	host.send_ready();
	tokio::time::sleep(Duration::from_millis(20)).await;

	assert!(h.registry.current().is_none());
	assert_eq!(session.state(), SessionState::Disposed);
}

struct BrokenSurface;

impl Surface for BrokenSurface {
	fn title(&self) -> &str {
		"broken"
	}

	fn show(&self) -> Result<()> {
		Err(Error::Io(std::io::Error::other("no display")))
	}

	fn post_message(&self, _message: Value) -> Result<()> {
		Ok(())
	}

	fn reveal(&self) {}

	fn close(&self) {}
}

struct BrokenFactory;

impl SurfaceFactory for BrokenFactory {
	fn create(&self, _options: SurfaceOptions) -> Result<SurfaceParts> {
		let (_tx, events) = mpsc::unbounded_channel();
		Ok(SurfaceParts {
			surface: Arc::new(BrokenSurface),
			events,
		})
	}
}

#[tokio::test]
async fn show_failure_is_a_surface_error() {
	let registry = Arc::new(SessionRegistry::new());
	let context = SessionContext::new(Arc::new(BrokenFactory), Arc::clone(&registry), Arc::new(RecordingNotifier::default()));

	let err = Session::create("BioView", context).unwrap_err();
	assert!(matches!(err, Error::SurfaceCreation(_)), "got {err:?}");
	assert!(registry.current().is_none());
}
