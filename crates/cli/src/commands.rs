//! Wiring from parsed arguments to a running dispatcher.

use std::sync::Arc;

use bioview_runtime::{ProcessSurfaceFactory, SessionRegistry};
use colored::Colorize;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::dispatcher::{BatchReport, Dispatcher, DispatcherContext, Input};
use crate::error::Result;
use crate::host::{ConsoleNotifier, TerminalPrompter};
use crate::shell;

pub async fn run(cli: Cli) -> Result<()> {
	let config = Config::load(cli.config.as_deref())?.with_overrides(cli.overrides());
	tracing::debug!(target = "bioview.cli", ?config, "effective config");

	let factory = ProcessSurfaceFactory::new(&config.renderer.command, config.renderer.args.clone())?;
	let dispatcher = Dispatcher::new(DispatcherContext {
		registry: Arc::new(SessionRegistry::new()),
		factory: Arc::new(factory),
		prompter: Arc::new(TerminalPrompter::new(cli.yes)),
		notifier: Arc::new(ConsoleNotifier),
		config,
	});

	match cli.command {
		Commands::Shell => shell::run(&dispatcher).await,
		command => {
			let result = execute(&dispatcher, command).await;
			match result {
				Ok(report) => {
					print_report(&report);
					hold(&dispatcher).await;
					Ok(())
				}
				Err(err) => {
					dispatcher.close_current();
					Err(err)
				}
			}
		}
	}
}

/// Runs one intent. `Shell` does nothing here.
pub async fn execute(dispatcher: &Dispatcher, command: Commands) -> Result<BatchReport> {
	match command {
		Commands::Fetch { db, accession } => {
			dispatcher
				.open_from_database(db.map(Into::into), accession)
				.await
		}
		Commands::Open { inputs } => dispatcher.open_files(parse_inputs(&inputs)).await,
		Commands::OpenFolder { dir } => dispatcher.open_folder(&dir).await,
		Commands::Append { inputs } => dispatcher.append_files(parse_inputs(&inputs)).await,
		Commands::Shell => Ok(BatchReport::default()),
	}
}

pub fn parse_inputs(raw: &[String]) -> Vec<Input> {
	raw.iter().map(|s| Input::parse(s)).collect()
}

pub fn print_report(report: &BatchReport) {
	if report.is_empty() {
		return;
	}
	let mut line = format!("{} {}", "sent".green().bold(), report.sent.len());
	if !report.skipped.is_empty() {
		line.push_str(&format!(", {} {}", "skipped".yellow().bold(), report.skipped.join(", ")));
	}
	if !report.failed.is_empty() {
		line.push_str(&format!(", {} {}", "failed".red().bold(), report.failed.join(", ")));
	}
	println!("{line}");
}

/// Keeps the process alive while the current session is open.
///
/// Returns when the viewer is closed, or disposes it on Ctrl-C.
async fn hold(dispatcher: &Dispatcher) {
	let Some(session) = dispatcher.current() else {
		return;
	};
	tracing::info!(target = "bioview.cli", session = %session.id(), "viewer open; press Ctrl-C to close");
	tokio::select! {
		_ = session.closed() => {}
		_ = tokio::signal::ctrl_c() => session.dispose(),
	}
}
