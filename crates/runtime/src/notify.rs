//! User-visible notifications.

/// Sink for non-fatal messages shown to the user.
pub trait Notifier: Send + Sync {
	/// Reports an error the user should see.
	fn error(&self, message: &str);

	/// Reports an informational status line.
	fn info(&self, message: &str);
}

/// Notifier that only emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
	fn error(&self, message: &str) {
		tracing::error!(target = "bioview.notify", "{message}");
	}

	fn info(&self, message: &str) {
		tracing::info!(target = "bioview.notify", "{message}");
	}
}
