//! The interactive loop and scripted (`-c`) execution.

use std::borrow::Cow;
use std::io::Write;

use cblr::{CancellationToken, LiveResponse};
use clap::Parser;
use clap::error::ErrorKind;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::commands::{self, Flow, VerbLine};
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::lexer;
use crate::output;

/// Connects, runs the requested lines or the prompt, then detaches.
///
/// Returns `false` when a scripted line failed or stdin could not be read.
pub async fn run(cli: Cli) -> Result<bool> {
	let settings = Settings::resolve(&cli)?;
	info!(target: "cblr.console", url = %settings.base_url, http_log = ?settings.http_log, "connecting");

	let lr = LiveResponse::connect(settings.transport_config()).await?;
	let mut console = Console::new(lr);
	let ok = if cli.commands.is_empty() {
		match console.interactive().await {
			Ok(()) => true,
			Err(err) => {
				output::print_error(&err);
				false
			}
		}
	} else {
		console.script(&cli.commands).await
	};
	console.shutdown().await;
	Ok(ok)
}

/// Result of one console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
	Done { ok: bool },
	Exit,
}

pub struct Console {
	lr: LiveResponse,
}

impl Console {
	pub fn new(lr: LiveResponse) -> Self {
		Self { lr }
	}

	pub fn engine(&self) -> &LiveResponse {
		&self.lr
	}

	/// Runs `lines` in order, stopping at `exit`. Failures are reported and
	/// do not stop later lines.
	pub async fn script(&mut self, lines: &[String]) -> bool {
		let mut ok = true;
		for line in lines {
			match self.line(line).await {
				LineOutcome::Done { ok: line_ok } => ok &= line_ok,
				LineOutcome::Exit => break,
			}
		}
		ok
	}

	/// Prompts until `exit`, EOF or Ctrl-C at the prompt.
	pub async fn interactive(&mut self) -> Result<()> {
		let mut stdin = BufReader::new(tokio::io::stdin());
		let mut raw = Vec::new();
		loop {
			print!("{}", output::prompt(self.lr.session_id()));
			std::io::stdout().flush()?;

			raw.clear();
			let read = tokio::select! {
				read = stdin.read_until(b'\n', &mut raw) => read?,
				_ = tokio::signal::ctrl_c() => {
					println!();
					0
				}
			};
			if read == 0 {
				break;
			}
			if self.line(&decode_line(&raw)).await == LineOutcome::Exit {
				break;
			}
		}
		Ok(())
	}

	/// Lexes, parses and runs one line. Ctrl-C while the verb runs cancels
	/// its outstanding sensor command.
	pub async fn line(&mut self, line: &str) -> LineOutcome {
		let tokens = match lexer::tokenize(line) {
			Ok(tokens) if tokens.is_empty() => return LineOutcome::Done { ok: true },
			Ok(tokens) => tokens,
			Err(err) => {
				output::print_error(&CliError::from(err));
				return LineOutcome::Done { ok: false };
			}
		};

		let verb = match VerbLine::try_parse_from(&tokens) {
			Ok(parsed) => parsed.verb,
			Err(err) => {
				// Help goes to stdout and usage errors to stderr.
				if let Err(io) = err.print() {
					warn!(target: "cblr.console", error = %io, "failed to print verb usage");
				}
				let help = matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
				return LineOutcome::Done { ok: help };
			}
		};

		let cancel = CancellationToken::new();
		let interrupt = {
			let cancel = cancel.clone();
			tokio::spawn(async move {
				if tokio::signal::ctrl_c().await.is_ok() {
					debug!(target: "cblr.console", "interrupt received");
					cancel.cancel();
				}
			})
		};
		let result = commands::execute(verb, &mut self.lr, &cancel).await;
		interrupt.abort();

		match result {
			Ok(Flow::Continue) => LineOutcome::Done { ok: true },
			Ok(Flow::Exit) => LineOutcome::Exit,
			Err(err) => {
				output::print_error(&err);
				LineOutcome::Done { ok: false }
			}
		}
	}

	/// Detaches if still attached.
	pub async fn shutdown(mut self) {
		if !self.lr.is_attached() {
			return;
		}
		match self.lr.detach().await {
			Ok(id) => info!(target: "cblr.console", session = id, "detached on exit"),
			Err(err) => warn!(target: "cblr.console", error = %err, "detach on exit failed"),
		}
	}
}

/// Decodes one raw stdin line. Bytes that are not UTF-8 become U+FFFD so the
/// line still reaches the lexer.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
	match String::from_utf8_lossy(raw) {
		Cow::Borrowed(line) => Cow::Borrowed(line.trim_end_matches(['\r', '\n'])),
		Cow::Owned(line) => Cow::Owned(line.trim_end_matches(['\r', '\n']).to_string()),
	}
}

#[cfg(test)]
mod tests {
	use cblr::{Transport, TransportConfig};
	use serde_json::json;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	async fn console(server: &MockServer) -> Console {
		Mock::given(method("GET"))
			.and(path("/api/v1/cblr/session"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
			.mount(server)
			.await;
		let transport = Transport::new(TransportConfig::new(server.uri(), "t")).unwrap();
		Console::new(LiveResponse::with_transport(transport).await.unwrap())
	}

	#[test]
	fn stdin_lines_decode_lossily_without_line_endings() {
		assert_eq!(decode_line(b"pwd\r\n"), "pwd");
		assert_eq!(decode_line(b"dir caf\xe9\n"), "dir caf\u{FFFD}");
		assert_eq!(decode_line(b""), "");
	}

	#[tokio::test]
	async fn blank_lines_and_help_succeed() {
		let server = MockServer::start().await;
		let mut console = console(&server).await;
		assert_eq!(console.line("   ").await, LineOutcome::Done { ok: true });
		assert_eq!(console.line("pwd --help").await, LineOutcome::Done { ok: true });
	}

	#[tokio::test]
	async fn bad_lines_fail_without_ending_the_console() {
		let server = MockServer::start().await;
		let mut console = console(&server).await;
		assert_eq!(console.line("cd \"C:\\x").await, LineOutcome::Done { ok: false });
		assert_eq!(console.line("kill notapid").await, LineOutcome::Done { ok: false });
		assert_eq!(console.line("pwd").await, LineOutcome::Done { ok: false });
		assert_eq!(console.line("quit").await, LineOutcome::Exit);
	}

	#[tokio::test]
	async fn script_stops_at_exit_and_reports_failures() {
		let server = MockServer::start().await;
		let mut console = console(&server).await;
		let lines = vec!["pwd".to_string(), "exit".to_string(), "session".to_string()];
		assert!(!console.script(&lines).await);
		// Startup scan only; `session` after `exit` never ran.
		assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
		assert!(!console.engine().is_attached());
	}
}
