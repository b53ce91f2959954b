//! Per-input load requests.
//!
//! A [`LoadRequest`] is built for one file, URL or accession, consumed once by
//! [`LoadRequest::into_message`], and dropped. Nothing retains it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::classify::{UnsupportedFormat, classify, display_label, url_path};
use crate::format::{Database, Family, Format};
use crate::message::{ContentParams, ContentSource, LoadCommand, LoadParams, OutboundMessage, SceneMode};

/// Where the content of a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
	/// Fetched by the renderer from a remote database.
	Accession(String),
	/// Bytes read by the controller.
	File {
		/// Raw file contents.
		bytes: Vec<u8>,
		/// Name the bytes were read from.
		original_name: String,
	},
	/// Fetched by the renderer from a URL.
	Url(String),
}

/// A single classified input ready to be sent to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
	/// Content origin.
	pub source: Source,
	/// Renderer format.
	pub format: Format,
	/// Renderer verb.
	pub command: LoadCommand,
	/// Display name derived from the source, extension stripped.
	pub label: String,
	compressed: bool,
}

impl LoadRequest {
	/// Request fetching `accession` from `database`.
	pub fn accession(database: Database, accession: impl Into<String>) -> Self {
		let accession = accession.into();
		Self {
			label: accession.clone(),
			source: Source::Accession(accession),
			format: database.format(),
			command: database.command(),
			compressed: false,
		}
	}

	/// Request for file bytes, classified by `original_name`.
	pub fn file(original_name: impl Into<String>, bytes: Vec<u8>, mode: SceneMode) -> Result<Self, UnsupportedFormat> {
		let original_name = original_name.into();
		let classification = classify(&original_name)?;
		Ok(Self {
			label: display_label(&original_name),
			format: classification.format,
			command: classification.command(mode),
			compressed: classification.compressed,
			source: Source::File { bytes, original_name },
		})
	}

	/// Request for content the renderer fetches from `url`, classified by the
	/// last path segment. Query and fragment are ignored for classification
	/// and sent unchanged.
	pub fn url(url: impl Into<String>, mode: SceneMode) -> Result<Self, UnsupportedFormat> {
		let url = url.into();
		let path = url_path(&url);
		let classification = classify(path)?;
		Ok(Self {
			label: display_label(path),
			format: classification.format,
			command: classification.command(mode),
			compressed: classification.compressed,
			source: Source::Url(url),
		})
	}

	/// Whether the payload must be treated as binary by the renderer.
	///
	/// Volumes and compressed inputs are always binary. File bytes that are
	/// not valid UTF-8 are binary as well.
	pub fn is_binary(&self) -> bool {
		if self.compressed || self.format.family() == Family::Volume {
			return true;
		}
		match &self.source {
			Source::File { bytes, .. } => std::str::from_utf8(bytes).is_err(),
			Source::Accession(_) | Source::Url(_) => false,
		}
	}

	/// Converts the request into its wire message, consuming it.
	pub fn into_message(self) -> OutboundMessage {
		let is_binary = self.is_binary();
		let params = match self.source {
			Source::Accession(accession) => LoadParams::Accession { accession },
			Source::Url(url) => LoadParams::Content(ContentParams {
				source: ContentSource::Url(url),
				format: self.format,
				is_binary,
				label: self.label,
			}),
			Source::File { bytes, .. } => {
				let data = if is_binary {
					STANDARD.encode(&bytes)
				} else {
					String::from_utf8(bytes).unwrap_or_else(|e| STANDARD.encode(e.as_bytes()))
				};
				LoadParams::Content(ContentParams {
					source: ContentSource::Data(data),
					format: self.format,
					is_binary,
					label: self.label,
				})
			}
		};
		OutboundMessage::new(self.command, params)
	}
}
