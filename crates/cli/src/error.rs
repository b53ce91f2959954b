use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BioviewError>;

#[derive(Debug, Error)]
pub enum BioviewError {
	#[error(transparent)]
	Runtime(#[from] bioview_runtime::Error),

	#[error("failed to load config from {path}")]
	Config {
		path: PathBuf,
		#[source]
		source: anyhow::Error,
	},

	#[error("invalid input: {0}")]
	InvalidInput(String),

}

impl BioviewError {
	/// Whether the error came from a session going away or failing to start,
	/// as opposed to a bad argument or config.
	pub fn is_session_error(&self) -> bool {
		matches!(self, Self::Runtime(e) if e.is_session_fatal())
	}

	/// The message followed by each `source`, joined with `: `.
	pub fn chain(&self) -> String {
		let mut text = self.to_string();
		let mut source = std::error::Error::source(self);
		while let Some(err) = source {
			let next = err.to_string();
			if !text.ends_with(&next) {
				text.push_str(": ");
				text.push_str(&next);
			}
			source = err.source();
		}
		text
	}
}
