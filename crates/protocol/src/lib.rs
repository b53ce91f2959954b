//! Wire types for the BioView renderer protocol.
//!
//! This crate contains the serde-serializable messages exchanged between the
//! controller and the embedded molecular renderer, plus the pure mapping from
//! input filenames to renderer formats and verbs.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No I/O, no async, no session state
//! - **1:1 with the renderer**: Field names and verbs match what the renderer reads
//! - **Closed**: Inbound traffic is decoded into enumerations at the boundary
//!
//! Session lifecycle and transport live in `bioview-runtime`.

pub mod classify;
pub mod format;
pub mod message;
pub mod request;

pub use classify::{
	COMPRESSION_EXTENSION, Classification, SUPPORTED_EXTENSIONS, UnsupportedFormat, base_name, classify,
	display_label, is_supported, url_path,
};
pub use format::{Database, Family, Format};
pub use message::{
	ContentParams, ContentSource, Inbound, LoadCommand, LoadParams, OutboundMessage, RendererMessage, SceneMode,
	payload_text,
};
pub use request::{LoadRequest, Source};
