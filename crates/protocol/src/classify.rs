//! Filename classification into renderer formats and verbs.
//!
//! Classification is a pure function of the filename: extensions are matched
//! case-insensitively, and a trailing compression marker is stripped so the
//! inner extension decides the format (`emd_0004.map.gz` is a CCP4 map).
//!
//! The classifier has no notion of a current scene. Callers pick between the
//! `load*` and `append*` verbs through [`SceneMode`].

use thiserror::Error;

use crate::format::{Family, Format};
use crate::message::{LoadCommand, SceneMode};

/// Compression suffix that is stripped before format lookup.
pub const COMPRESSION_EXTENSION: &str = "gz";

/// Every extension (lowercase, without dot) the classifier accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdb", "ent", "cif", "mmcif", "mcif", "map", "mrc", "ccp4"];

/// Result of classifying a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
	/// Renderer format.
	pub format: Format,
	/// Whether the name carried a compression suffix.
	pub compressed: bool,
}

impl Classification {
	/// Family of the classified format.
	pub fn family(&self) -> Family {
		self.format.family()
	}

	/// Renderer verb for this input in the given scene mode.
	pub fn command(&self, mode: SceneMode) -> LoadCommand {
		self.family().command(mode)
	}
}

/// The filename did not map to any supported format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported file format: {filename}")]
pub struct UnsupportedFormat {
	/// Name that was classified.
	pub filename: String,
	/// Extension that failed the lookup, lowercased.
	pub extension: Option<String>,
}

/// Classifies `filename` into a [`Classification`].
///
/// Only the final path component is inspected, so full paths can be passed
/// directly. `?` and `#` are ordinary filename characters here; strip URL
/// queries with [`url_path`] first.
pub fn classify(filename: &str) -> Result<Classification, UnsupportedFormat> {
	let name = base_name(filename);
	let (stem, ext) = split_extension(name);
	let mut ext = ext.map(str::to_ascii_lowercase);
	let mut compressed = false;

	if ext.as_deref() == Some(COMPRESSION_EXTENSION) {
		compressed = true;
		ext = split_extension(stem).1.map(str::to_ascii_lowercase);
	}

	match ext.as_deref().and_then(Format::from_extension) {
		Some(format) => Ok(Classification { format, compressed }),
		None => Err(UnsupportedFormat {
			filename: name.to_string(),
			extension: ext,
		}),
	}
}

/// Human-readable label for an input: the base name with its compression
/// suffix and format extension removed.
pub fn display_label(filename: &str) -> String {
	let name = base_name(filename);
	let (mut stem, ext) = split_extension(name);
	let Some(ext) = ext else {
		return name.to_string();
	};

	if ext.eq_ignore_ascii_case(COMPRESSION_EXTENSION) {
		let (inner_stem, inner_ext) = split_extension(stem);
		if inner_ext.is_some() {
			stem = inner_stem;
		}
	}
	stem.to_string()
}

/// Returns `true` if `filename` classifies to a supported format.
pub fn is_supported(filename: &str) -> bool {
	classify(filename).is_ok()
}

/// Final component of a `/` or `\` separated path.
pub fn base_name(path: &str) -> &str {
	path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The part of a URL string before its query or fragment.
pub fn url_path(url: &str) -> &str {
	url.split(['?', '#']).next().unwrap_or(url)
}

/// Splits `name` at its last dot. Leading-dot names (`.pdb`) have no extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
	match name.rsplit_once('.') {
		Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
		_ => (name, None),
	}
}
