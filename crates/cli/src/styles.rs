//! Terminal styling for help output and notifications.

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use colored::{ColoredString, Colorize};

/// Help styles: green bold headers and usage, cyan literals and placeholders.
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

pub fn error_prefix() -> ColoredString {
	"error:".red().bold()
}

pub fn info_prefix() -> ColoredString {
	"info:".cyan().bold()
}

pub fn prompt_prefix() -> ColoredString {
	"?".green().bold()
}
