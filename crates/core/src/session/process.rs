use cblr_protocol::{CommandName, CommandRequest, ProcessEntry};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::LiveResponse;
use crate::dispatch::PathStat;
use crate::error::Result;
use crate::path::{self, PathKind};

/// A process to start on the sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecRequest {
	pub executable: String,
	pub arguments: Vec<String>,
	/// Sensor-side file that receives the process output.
	pub output_file: Option<String>,
	/// Defaults to the pseudo working directory.
	pub working_directory: Option<String>,
	/// Wait for the process to exit and report its return code.
	pub wait: bool,
}

impl ExecRequest {
	pub fn new(executable: impl Into<String>) -> Self {
		Self {
			executable: executable.into(),
			..Self::default()
		}
	}

	pub fn args<I, S>(mut self, arguments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.arguments = arguments.into_iter().map(Into::into).collect();
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
	/// Full command line as submitted.
	pub command_line: String,
	pub pid: Option<u64>,
	/// Only present when the request waited for exit.
	pub return_code: Option<i64>,
}

impl LiveResponse {
	pub async fn process_list(&self, cancel: &CancellationToken) -> Result<Vec<ProcessEntry>> {
		let result = self.execute(CommandRequest::new(CommandName::ProcessList, ""), cancel).await?;
		Ok(result.processes())
	}

	pub async fn kill(&self, pid: u64, cancel: &CancellationToken) -> Result<()> {
		self.execute(CommandRequest::new(CommandName::Kill, pid.to_string()), cancel).await?;
		Ok(())
	}

	/// Starts a process on the sensor.
	///
	/// A relative executable is tried under the working directory first and
	/// passed through as given (for the sensor's search path) when no such
	/// file exists there.
	pub async fn exec(&self, request: ExecRequest, cancel: &CancellationToken) -> Result<ExecOutcome> {
		let executable = self.resolve_executable(&request.executable, cancel).await?;
		let command_line = command_line(&executable, &request.arguments);

		let working_directory = match request.working_directory.as_deref() {
			Some(dir) => self.resolve(dir)?,
			None => self.resolve("")?,
		};

		let mut submission = CommandRequest::new(CommandName::CreateProcess, command_line.as_str())
			.arg("wait", request.wait)
			.arg("working_directory", path::trim_trailing_separator(&working_directory));
		if let Some(output) = request.output_file.as_deref() {
			submission = submission.arg("output_file", self.resolve(output)?);
		}

		let result = self.execute(submission, cancel).await?;
		Ok(ExecOutcome {
			command_line,
			pid: result.pid(),
			return_code: result.return_code(),
		})
	}

	async fn resolve_executable(&self, executable: &str, cancel: &CancellationToken) -> Result<String> {
		match path::classify(executable) {
			PathKind::Absolute | PathKind::DriveRelative => self.resolve(executable),
			PathKind::DirectoryRelative => {
				let candidate = self.resolve(executable)?;
				match self.stat(executable, cancel).await {
					Ok(PathStat::File) => Ok(candidate),
					Ok(_) => Ok(executable.to_string()),
					Err(err) if err.is_cancellation() => Err(err),
					Err(err) => {
						debug!(target: "cblr.session", executable, error = %err, "executable probe failed");
						Ok(executable.to_string())
					}
				}
			}
		}
	}
}

/// Joins an executable and its arguments, quoting anything with whitespace.
fn command_line(executable: &str, arguments: &[String]) -> String {
	std::iter::once(executable)
		.chain(arguments.iter().map(String::as_str))
		.map(quote)
		.collect::<Vec<_>>()
		.join(" ")
}

fn quote(token: &str) -> String {
	if token.is_empty() || (token.contains(char::is_whitespace) && !token.starts_with('"')) {
		format!("\"{token}\"")
	} else {
		token.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_line_quotes_arguments_with_spaces() {
		let line = command_line("C:\\Program Files\\app.exe", &["-x".into(), "two words".into()]);
		assert_eq!(line, "\"C:\\Program Files\\app.exe\" -x \"two words\"");
	}

	#[test]
	fn command_line_without_arguments_is_the_executable() {
		assert_eq!(command_line("ipconfig", &[]), "ipconfig");
	}

	#[test]
	fn exec_request_builder_collects_arguments() {
		let request = ExecRequest::new("cmd.exe").args(["/c", "whoami"]);
		assert_eq!(request.arguments, vec!["/c", "whoami"]);
		assert!(!request.wait);
	}
}
