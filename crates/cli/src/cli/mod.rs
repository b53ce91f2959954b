use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::styles::cli_styles;


/// Source database (CLI wrapper for bioview_protocol::Database)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliDatabase {
	/// RCSB Protein Data Bank
	Pdb,
	/// AlphaFold DB, by UniProt accession
	#[value(alias = "afdb")]
	Alphafold,
	/// Electron Microscopy Data Bank
	Emdb,
}

impl From<CliDatabase> for bioview_protocol::Database {
	fn from(db: CliDatabase) -> Self {
		match db {
			CliDatabase::Pdb => bioview_protocol::Database::Pdb,
			CliDatabase::Alphafold => bioview_protocol::Database::AlphaFoldDb,
			CliDatabase::Emdb => bioview_protocol::Database::Emdb,
		}
	}
}

#[derive(Parser, Debug)]
#[command(name = "bioview")]
#[command(about = "BioView - molecular structure and density map viewer")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file (default: <config dir>/bioview/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Renderer host executable, overriding the config file
	#[arg(long, global = true, value_name = "CMD")]
	pub renderer: Option<String>,

	/// Viewer title
	#[arg(long, global = true, value_name = "TITLE")]
	pub title: Option<String>,

	/// How long to wait for the renderer to become ready, in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub ready_timeout: Option<u64>,

	/// Ask before loading local files larger than this many bytes
	#[arg(long, global = true, value_name = "BYTES")]
	pub large_file_threshold: Option<u64>,

	/// Load large files without asking
	#[arg(short, long, global = true)]
	pub yes: bool,

	#[command(subcommand)]
	pub command: Commands,
}

impl Cli {
	pub fn overrides(&self) -> ConfigOverrides {
		ConfigOverrides {
			renderer: self.renderer.clone(),
			title: self.title.clone(),
			ready_timeout_ms: self.ready_timeout,
			large_file_threshold_bytes: self.large_file_threshold,
		}
	}
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
	/// Fetch an entry from PDB, AlphaFold DB or EMDB
	Fetch {
		/// Database to fetch from (prompted when omitted)
		#[arg(long, value_enum)]
		db: Option<CliDatabase>,

		/// Accession (prompted when omitted)
		accession: Option<String>,
	},

	/// Open files or URLs in a fresh scene
	Open {
		/// Paths or http(s) URLs (prompted when omitted)
		inputs: Vec<String>,
	},

	/// Open every supported file under a folder
	#[command(alias = "folder")]
	OpenFolder {
		/// Folder to search recursively
		dir: PathBuf,
	},

	/// Add files or URLs to the current scene
	Append {
		/// Paths or http(s) URLs (prompted when omitted)
		inputs: Vec<String>,
	},

	/// Interactive shell driving one viewer
	Shell,
}
