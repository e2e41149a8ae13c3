use cblr_cli::cli::Cli;
use cblr_cli::{console, logging, output};
use clap::Parser;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match console::run(cli).await {
		Ok(true) => {}
		Ok(false) => std::process::exit(1),
		Err(err) => {
			output::print_error(&err);
			std::process::exit(1);
		}
	}
}
