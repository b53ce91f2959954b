//! Configuration file and command-line overrides.
//!
//! The file is JSON with camelCase keys, read from `--config <FILE>` or
//! `<config_dir>/bioview/config.json`. Every field is optional:
//!
//! ```json
//! {
//!   "renderer": { "command": "bioview-renderer", "args": [] },
//!   "resourceRoots": ["/opt/bioview/dist", "/opt/bioview/resources"],
//!   "title": "BioView",
//!   "largeFileThresholdBytes": 52428800,
//!   "readyTimeoutMs": 30000,
//!   "retainContextWhenHidden": true
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::error::{BioviewError, Result};

pub const DEFAULT_TITLE: &str = "BioView";
pub const DEFAULT_RENDERER_COMMAND: &str = "bioview-renderer";
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 30_000;

/// How to launch the renderer host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
	pub command: String,
	pub args: Vec<String>,
}

impl Default for RendererConfig {
	fn default() -> Self {
		Self {
			command: DEFAULT_RENDERER_COMMAND.to_string(),
			args: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	pub renderer: RendererConfig,
	/// Directories the renderer may read resources from. Empty means the
	/// packaged `dist` and `resources` directories under the user data dir.
	pub resource_roots: Vec<PathBuf>,
	pub title: String,
	pub large_file_threshold_bytes: u64,
	pub ready_timeout_ms: u64,
	pub retain_context_when_hidden: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			renderer: RendererConfig::default(),
			resource_roots: Vec::new(),
			title: DEFAULT_TITLE.to_string(),
			large_file_threshold_bytes: DEFAULT_LARGE_FILE_THRESHOLD,
			ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
			retain_context_when_hidden: true,
		}
	}
}

/// Values from command-line flags. Each one set here wins over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
	pub renderer: Option<String>,
	pub title: Option<String>,
	pub ready_timeout_ms: Option<u64>,
	pub large_file_threshold_bytes: Option<u64>,
}

impl Config {
	/// `<config_dir>/bioview/config.json`, if the platform has a config dir.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("bioview").join("config.json"))
	}

	/// Loads from `path`, or from [`default_path`](Self::default_path).
	///
	/// An explicit path must exist. A missing default file yields defaults.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::from_file(path),
			None => match Self::default_path() {
				Some(path) if path.is_file() => Self::from_file(&path),
				_ => Ok(Self::default()),
			},
		}
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let load = || -> anyhow::Result<Self> {
			let text = std::fs::read_to_string(path).context("read failed")?;
			let config = serde_json::from_str(&text).context("invalid JSON")?;
			Ok(config)
		};
		let config: Self = load().map_err(|source| BioviewError::Config {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(target = "bioview.config", path = %path.display(), "config loaded");
		Ok(config)
	}

	pub fn with_overrides(self, overrides: ConfigOverrides) -> Self {
		Self {
			renderer: RendererConfig {
				command: overrides.renderer.unwrap_or(self.renderer.command),
				args: self.renderer.args,
			},
			title: overrides.title.unwrap_or(self.title),
			ready_timeout_ms: overrides.ready_timeout_ms.unwrap_or(self.ready_timeout_ms),
			large_file_threshold_bytes: overrides
				.large_file_threshold_bytes
				.unwrap_or(self.large_file_threshold_bytes),
			..self
		}
	}

	pub fn ready_timeout(&self) -> Duration {
		Duration::from_millis(self.ready_timeout_ms)
	}

	/// Configured resource roots, or the packaged defaults when none are set.
	pub fn effective_resource_roots(&self) -> Vec<PathBuf> {
		if !self.resource_roots.is_empty() {
			return self.resource_roots.clone();
		}
		dirs::data_dir()
			.map(|data| {
				let base = data.join("bioview");
				vec![base.join("dist"), base.join("resources")]
			})
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn defaults() {
		let config = Config::default();
		assert_eq!(config.title, "BioView");
		assert_eq!(config.large_file_threshold_bytes, 52_428_800);
		assert_eq!(config.ready_timeout(), Duration::from_secs(30));
		assert!(config.retain_context_when_hidden);
		assert_eq!(config.renderer.command, "bioview-renderer");
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"title": "Structures", "renderer": {{"args": ["--gpu"]}}}}"#).unwrap();

		let config = Config::load(Some(file.path())).unwrap();
		assert_eq!(config.title, "Structures");
		assert_eq!(config.renderer.command, "bioview-renderer");
		assert_eq!(config.renderer.args, vec!["--gpu".to_string()]);
		assert_eq!(config.ready_timeout_ms, DEFAULT_READY_TIMEOUT_MS);
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
		assert!(matches!(err, BioviewError::Config { .. }));
	}

	#[test]
	fn invalid_json_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{{ not json").unwrap();
		let err = Config::load(Some(file.path())).unwrap_err();
		assert!(err.to_string().contains("failed to load config"));
	}

	#[test]
	fn overrides_win() {
		let config = Config::default().with_overrides(ConfigOverrides {
			renderer: Some("/usr/local/bin/molstar-host".to_string()),
			ready_timeout_ms: Some(500),
			..Default::default()
		});
		assert_eq!(config.renderer.command, "/usr/local/bin/molstar-host");
		assert_eq!(config.ready_timeout_ms, 500);
		assert_eq!(config.title, DEFAULT_TITLE);
	}

	#[test]
	fn explicit_resource_roots_are_kept() {
		let config = Config {
			resource_roots: vec![PathBuf::from("/srv/bioview")],
			..Default::default()
		};
		assert_eq!(config.effective_resource_roots(), vec![PathBuf::from("/srv/bioview")]);
	}
}
