use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

/// Connection and startup options for the console.
///
/// Flags win over `CBLR_URL`/`CBLR_TOKEN`, which win over the config file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "cblr")]
#[command(about = "Live response console for endpoint sensors")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Control plane address (`host:port` or a full URL)
	#[arg(long, env = "CBLR_URL", value_name = "URL")]
	pub url: Option<String>,

	/// API token
	#[arg(long, env = "CBLR_TOKEN", value_name = "TOKEN", hide_env_values = true)]
	pub token: Option<String>,

	/// Config file (default: <config dir>/cblr/config.json)
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Append HTTP exchanges to this file
	#[arg(long, value_name = "FILE", conflicts_with = "no_http_log")]
	pub http_log: Option<PathBuf>,

	/// Do not write the HTTP log
	#[arg(long)]
	pub no_http_log: bool,

	/// Accept invalid TLS certificates
	#[arg(long)]
	pub insecure: bool,

	/// Per-request timeout in seconds (default 120)
	#[arg(long, value_name = "SECS")]
	pub timeout: Option<u64>,

	/// Run LINE as a console command instead of prompting; repeatable
	#[arg(short = 'c', long = "command", value_name = "LINE")]
	pub commands: Vec<String>,
}

/// Help colors shared by the startup parser and the verb parser.
pub fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default().bold())
		.usage(AnsiColor::Yellow.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.error(AnsiColor::Red.on_default().bold())
}
