//! Line-oriented shell driving one long-lived dispatcher.

use bioview_protocol::Database;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::cli::CliDatabase;
use crate::commands::{parse_inputs, print_report};
use crate::dispatcher::{BatchReport, Dispatcher};
use crate::error::Result;
use crate::host::read_line;
use crate::styles::error_prefix;

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(no_binary_name = true, disable_version_flag = true)]
#[command(about = "BioView shell commands")]
struct ShellLine {
	#[command(subcommand)]
	command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
	/// Fetch an entry: fetch [pdb|alphafold|emdb] [ACCESSION]
	Fetch {
		#[arg(value_enum)]
		db: Option<CliDatabase>,
		accession: Option<String>,
	},
	/// Open files or URLs in a fresh scene
	Open { inputs: Vec<String> },
	/// Open every supported file under a folder
	Folder { dir: std::path::PathBuf },
	/// Add files or URLs to the current scene
	Append { inputs: Vec<String> },
	/// Show the current session
	Status,
	/// Close the current session
	Close,
	/// Leave the shell
	#[command(alias = "exit")]
	Quit,
}

fn parse_line(line: &str) -> std::result::Result<ShellLine, clap::Error> {
	ShellLine::try_parse_from(line.split_whitespace())
}

/// Reads commands until `quit` or EOF, then closes the current session.
pub async fn run(dispatcher: &Dispatcher) -> Result<()> {
	eprintln!("{}", "BioView shell. Type 'help' for commands.".dimmed());

	while let Some(line) = read_line(format!("{} ", "bioview>".green().bold())).await {
		if line.is_empty() {
			continue;
		}
		let parsed = match parse_line(&line) {
			Ok(parsed) => parsed,
			Err(err) => {
				let _ = err.print();
				continue;
			}
		};

		let result = match parsed.command {
			ShellCommand::Quit => break,
			ShellCommand::Status => {
				print_status(dispatcher);
				continue;
			}
			ShellCommand::Close => {
				if !dispatcher.close_current() {
					eprintln!("no viewer open");
				}
				continue;
			}
			ShellCommand::Fetch { db, accession } => {
				dispatcher
					.open_from_database(db.map(Database::from), accession)
					.await
			}
			ShellCommand::Open { inputs } => dispatcher.open_files(parse_inputs(&inputs)).await,
			ShellCommand::Folder { dir } => dispatcher.open_folder(&dir).await,
			ShellCommand::Append { inputs } => dispatcher.append_files(parse_inputs(&inputs)).await,
		};
		report(result);
	}

	dispatcher.close_current();
	Ok(())
}

fn report(result: Result<BatchReport>) {
	match result {
		Ok(report) => print_report(&report),
		// session-level errors were already notified
		Err(err) if err.is_session_error() => {
			tracing::debug!(target = "bioview.shell", error = %err, "intent failed");
		}
		Err(err) => eprintln!("{} {err}", error_prefix()),
	}
}

fn print_status(dispatcher: &Dispatcher) {
	match dispatcher.current() {
		Some(session) => println!("{} {} ({})", session.id(), session.title(), session.state()),
		None => println!("no viewer open"),
	}
}
