//! Messages exchanged between the controller and the embedded renderer.
//!
//! Every message is a JSON object carrying a `command` discriminator.
//!
//! Controller → renderer ([`OutboundMessage`]):
//!
//! ```text
//! {"command": "loadPdb", "accession": "1abc"}
//! {"command": "loadStructure", "data": "...", "format": "mmcif", "isBinary": false, "label": "1abc"}
//! {"command": "appendVolume", "url": "...", "format": "ccp4", "isBinary": true, "label": "emd_0004"}
//! ```
//!
//! Renderer → controller ([`RendererMessage`]):
//!
//! ```text
//! {"command": "ready"}
//! {"command": "error", "error": "..."}
//! {"command": "info", "info": "..."}
//! {"command": "loading"}
//! {"command": "loaded"}
//! ```
//!
//! Inbound traffic is decoded once at the channel boundary through
//! [`Inbound::decode`], which never fails: payloads that cannot be understood
//! become [`Inbound::Unknown`] or [`Inbound::Malformed`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::Format;

/// Renderer verb carried in the `command` field of outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadCommand {
	/// Fetch a PDB entry by accession into a fresh scene.
	LoadPdb,
	/// Fetch an AlphaFold DB model by UniProt accession into a fresh scene.
	LoadAlphaFoldDb,
	/// Fetch an EMDB map by accession into a fresh scene.
	LoadEmdb,
	/// Replace the scene with a structure.
	LoadStructure,
	/// Add a structure to the current scene.
	AppendStructure,
	/// Replace the scene with a density map.
	LoadVolume,
	/// Add a density map to the current scene.
	AppendVolume,
}

impl LoadCommand {
	/// Wire spelling of the verb.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::LoadPdb => "loadPdb",
			Self::LoadAlphaFoldDb => "loadAlphaFoldDb",
			Self::LoadEmdb => "loadEmdb",
			Self::LoadStructure => "loadStructure",
			Self::AppendStructure => "appendStructure",
			Self::LoadVolume => "loadVolume",
			Self::AppendVolume => "appendVolume",
		}
	}

	/// Returns `true` for verbs that add to the existing scene.
	pub fn is_append(self) -> bool {
		matches!(self, Self::AppendStructure | Self::AppendVolume)
	}
}

impl std::fmt::Display for LoadCommand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Whether a load creates a fresh scene or adds to the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneMode {
	/// `load*`: discard the current scene.
	#[default]
	Replace,
	/// `append*`: keep the current scene.
	Append,
}

/// Where the renderer reads content from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
	/// Inline payload; base64 when the accompanying `isBinary` is set.
	Data(String),
	/// Location the renderer fetches itself.
	Url(String),
}

/// Parameters of a content load (`loadStructure`, `appendVolume`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParams {
	/// Inline data or URL.
	#[serde(flatten)]
	pub source: ContentSource,
	/// Renderer format.
	pub format: Format,
	/// Whether the payload is binary (base64-encoded when inline).
	pub is_binary: bool,
	/// Name shown in the renderer's scene tree.
	pub label: String,
}

/// Parameters flattened next to `command` in an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadParams {
	/// Database fetch by accession.
	Accession {
		/// Accession identifier, e.g. `1abc` or `P68871`.
		accession: String,
	},
	/// Inline or URL content.
	Content(ContentParams),
}

impl LoadParams {
	/// Creates accession parameters.
	pub fn accession(accession: impl Into<String>) -> Self {
		Self::Accession {
			accession: accession.into(),
		}
	}
}

/// A complete controller → renderer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
	/// Renderer verb.
	pub command: LoadCommand,
	/// Verb parameters, serialized into the same object as `command`.
	#[serde(flatten)]
	pub params: LoadParams,
}

impl OutboundMessage {
	/// Creates a message from its parts.
	pub fn new(command: LoadCommand, params: LoadParams) -> Self {
		Self { command, params }
	}

	/// Serializes the message to a JSON value.
	pub fn to_value(&self) -> serde_json::Result<Value> {
		serde_json::to_value(self)
	}

	/// JSON form suitable for logs, with inline payloads replaced by a size
	/// summary.
	pub fn log_summary(&self) -> Value {
		let mut summary = serde_json::json!({ "command": self.command });
		match &self.params {
			LoadParams::Accession { accession } => {
				summary["accession"] = Value::from(accession.as_str());
			}
			LoadParams::Content(content) => {
				match &content.source {
					ContentSource::Data(data) => {
						let kind = if content.is_binary { "Binary" } else { "Text" };
						summary["data"] = Value::from(format!("[{kind} content: {} chars]", data.len()));
					}
					ContentSource::Url(url) => summary["url"] = Value::from(url.as_str()),
				}
				summary["format"] = Value::from(content.format.as_str());
				summary["isBinary"] = Value::from(content.is_binary);
				summary["label"] = Value::from(content.label.as_str());
			}
		}
		summary
	}
}

/// Lifecycle and status messages emitted by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum RendererMessage {
	/// The renderer finished booting and accepts load commands.
	Ready,
	/// The renderer reports a failure; surfaced to the user.
	Error {
		/// Error text or object as sent by the renderer.
		#[serde(default)]
		error: Value,
	},
	/// Informational status line.
	Info {
		/// Info text or object as sent by the renderer.
		#[serde(default)]
		info: Value,
	},
	/// A load started.
	Loading,
	/// A load completed.
	Loaded,
}

impl RendererMessage {
	/// Commands this controller understands.
	pub const COMMANDS: [&'static str; 5] = ["ready", "error", "info", "loading", "loaded"];

	/// Builds an `error` message with a text payload.
	pub fn error(text: impl Into<String>) -> Self {
		Self::Error {
			error: Value::String(text.into()),
		}
	}

	/// Builds an `info` message with a text payload.
	pub fn info(text: impl Into<String>) -> Self {
		Self::Info {
			info: Value::String(text.into()),
		}
	}
}

/// Result of decoding one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
	/// A recognised renderer message.
	Known(RendererMessage),
	/// A well-formed message with a command this controller does not know.
	Unknown {
		/// The unrecognised command.
		command: String,
	},
	/// No usable `command` field, or a known command with an invalid payload.
	Malformed {
		/// Why decoding failed.
		reason: String,
	},
}

impl Inbound {
	/// Decodes a raw JSON value received from the renderer.
	pub fn decode(value: Value) -> Self {
		let command = match value.get("command") {
			Some(Value::String(command)) if !command.is_empty() => command.clone(),
			Some(Value::String(_)) => {
				return Self::Malformed {
					reason: "empty command field".to_string(),
				};
			}
			Some(other) => {
				return Self::Malformed {
					reason: format!("command field is not a string: {other}"),
				};
			}
			None => {
				return Self::Malformed {
					reason: "missing command field".to_string(),
				};
			}
		};

		match serde_json::from_value::<RendererMessage>(value) {
			Ok(message) => Self::Known(message),
			Err(err) if RendererMessage::COMMANDS.contains(&command.as_str()) => Self::Malformed {
				reason: format!("invalid {command} payload: {err}"),
			},
			Err(_) => Self::Unknown { command },
		}
	}
}

/// Renders an `error`/`info` payload as display text.
pub fn payload_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Null => String::new(),
		Value::Object(map) => match map.get("message") {
			Some(Value::String(message)) => message.clone(),
			_ => value.to_string(),
		},
		other => other.to_string(),
	}
}
