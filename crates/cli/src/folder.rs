//! Recursive expansion of a folder into supported input files.

use std::path::{Path, PathBuf};

use bioview_protocol::{COMPRESSION_EXTENSION, SUPPORTED_EXTENSIONS};
use glob::{MatchOptions, Pattern};

use crate::error::{BioviewError, Result};

/// Every file under `dir` whose extension (optionally followed by the
/// compression suffix) is supported. Matching ignores case. The result is
/// sorted and free of duplicates.
pub fn expand_folder(dir: &Path) -> Result<Vec<PathBuf>> {
	if !dir.is_dir() {
		return Err(BioviewError::InvalidInput(format!("{} is not a directory", dir.display())));
	}

	let options = MatchOptions {
		case_sensitive: false,
		require_literal_separator: false,
		require_literal_leading_dot: false,
	};
	let root = Pattern::escape(&dir.to_string_lossy());

	let mut files = Vec::new();
	for ext in SUPPORTED_EXTENSIONS {
		for suffix in [ext.to_string(), format!("{ext}.{COMPRESSION_EXTENSION}")] {
			let pattern = format!("{root}/**/*.{suffix}");
			let paths = glob::glob_with(&pattern, options).map_err(|e| BioviewError::InvalidInput(e.to_string()))?;
			for entry in paths {
				match entry {
					Ok(path) if path.is_file() => files.push(path),
					Ok(_) => {}
					Err(e) => tracing::warn!(target = "bioview.folder", error = %e, "skipping unreadable path"),
				}
			}
		}
	}

	files.sort();
	files.dedup();
	tracing::debug!(target = "bioview.folder", dir = %dir.display(), count = files.len(), "folder expanded");
	Ok(files)
}
