//! Host seams: how the dispatcher asks the user things and tells them things.
//!
//! [`Prompter`] abstracts the pickers and confirmation dialogs. The terminal
//! implementation reads stdin. Tests script their own.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use bioview_protocol::Database;
use bioview_runtime::Notifier;

use crate::styles::{error_prefix, info_prefix, prompt_prefix};

/// What a file picker is choosing files for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
	/// Files for a fresh scene.
	Open,
	/// Files added to the current scene.
	Append,
}

impl PickPurpose {
	fn verb(self) -> &'static str {
		match self {
			Self::Open => "open",
			Self::Append => "append",
		}
	}
}

/// Interactive prompts. `None` or an empty list means the user cancelled.
#[async_trait]
pub trait Prompter: Send + Sync {
	/// Asks which database to fetch from.
	async fn pick_database(&self) -> Option<Database>;

	/// Asks for an accession in `database`.
	async fn input_accession(&self, database: Database) -> Option<String>;

	/// Asks for files (paths or URLs).
	async fn pick_files(&self, purpose: PickPurpose) -> Vec<String>;

	/// Asks whether to load a file of `bytes` bytes anyway.
	async fn confirm_large_file(&self, name: &str, bytes: u64) -> bool;
}

/// Prompter reading answers from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter {
	assume_yes: bool,
}

impl TerminalPrompter {
	/// With `assume_yes`, confirmations are accepted without asking.
	pub fn new(assume_yes: bool) -> Self {
		Self { assume_yes }
	}
}

/// Prints `prompt` to stderr and reads one line from stdin.
///
/// Returns `None` at EOF or on read failure.
pub async fn read_line(prompt: String) -> Option<String> {
	let line = tokio::task::spawn_blocking(move || {
		let mut stderr = std::io::stderr();
		let _ = write!(stderr, "{prompt}");
		let _ = stderr.flush();

		let mut line = String::new();
		match std::io::stdin().lock().read_line(&mut line) {
			Ok(0) | Err(_) => None,
			Ok(_) => Some(line),
		}
	})
	.await
	.ok()
	.flatten()?;
	Some(line.trim().to_string())
}

/// Parses a database choice: a 1-based index into [`Database::ALL`] or a name.
pub fn parse_database(answer: &str) -> Option<Database> {
	let answer = answer.trim();
	if let Ok(index) = answer.parse::<usize>() {
		return index.checked_sub(1).and_then(|i| Database::ALL.get(i).copied());
	}
	match answer.to_ascii_lowercase().as_str() {
		"pdb" => Some(Database::Pdb),
		"alphafold" | "alphafolddb" | "afdb" => Some(Database::AlphaFoldDb),
		"emdb" | "emd" => Some(Database::Emdb),
		_ => None,
	}
}

#[async_trait]
impl Prompter for TerminalPrompter {
	async fn pick_database(&self) -> Option<Database> {
		let mut prompt = format!("{} Select a database\n", prompt_prefix());
		for (i, db) in Database::ALL.iter().enumerate() {
			prompt.push_str(&format!("  {}) {}\n", i + 1, db.label()));
		}
		prompt.push_str("> ");

		let answer = read_line(prompt).await?;
		if answer.is_empty() {
			return None;
		}
		let choice = parse_database(&answer);
		if choice.is_none() {
			eprintln!("{} unknown database '{answer}'", error_prefix());
		}
		choice
	}

	async fn input_accession(&self, database: Database) -> Option<String> {
		let answer = read_line(format!("{} {}: ", prompt_prefix(), database.accession_hint())).await?;
		(!answer.is_empty()).then_some(answer)
	}

	async fn pick_files(&self, purpose: PickPurpose) -> Vec<String> {
		let prompt = format!(
			"{} Files or URLs to {} (space separated, empty to cancel): ",
			prompt_prefix(),
			purpose.verb()
		);
		read_line(prompt)
			.await
			.map(|answer| answer.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default()
	}

	async fn confirm_large_file(&self, name: &str, bytes: u64) -> bool {
		if self.assume_yes {
			return true;
		}
		let prompt = format!(
			"{} {name} is {}. Loading it may be slow. Continue? [y/N] ",
			prompt_prefix(),
			format_size(bytes)
		);
		matches!(read_line(prompt).await.as_deref(), Some("y" | "Y" | "yes" | "Yes"))
	}
}

/// Formats a byte count as megabytes with one decimal.
pub fn format_size(bytes: u64) -> String {
	format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Notifier printing colored lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
	fn error(&self, message: &str) {
		tracing::debug!(target = "bioview.notify", level = "error", "{message}");
		eprintln!("{} {message}", error_prefix());
	}

	fn info(&self, message: &str) {
		tracing::debug!(target = "bioview.notify", level = "info", "{message}");
		eprintln!("{} {message}", info_prefix());
	}
}
