use bioview_cli::{cli::Cli, commands, logging, styles::error_prefix};
use clap::Parser;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::run(cli).await {
		// session-level failures were already shown by the notifier
		if !err.is_session_error() {
			eprintln!("{} {}", error_prefix(), err.chain());
		}
		std::process::exit(1);
	}
}
