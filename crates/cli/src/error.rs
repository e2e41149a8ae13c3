use thiserror::Error;

use crate::lexer::LexError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Verb arguments were well-formed but not usable together.
	#[error("{0}")]
	Usage(String),

	#[error(transparent)]
	Lex(#[from] LexError),

	#[error("sensor {0} not found")]
	SensorNotFound(String),

	#[error(transparent)]
	Engine(#[from] cblr::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Config(#[from] anyhow::Error),
}

impl CliError {
	pub fn usage(message: impl Into<String>) -> Self {
		CliError::Usage(message.into())
	}

	/// Returns true if the operator interrupted the command.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, CliError::Engine(err) if err.is_cancellation())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn canceled_engine_error_is_cancellation() {
		let err = CliError::from(cblr::Error::CommandCanceled { command_id: 3 });
		assert!(err.is_cancellation());
		assert!(!CliError::usage("bad").is_cancellation());
	}

	#[test]
	fn engine_errors_display_unchanged() {
		let err = CliError::from(cblr::Error::RemoteCommand { code: 5 });
		assert_eq!(err.to_string(), "command failed: HRESULT 0x00000005");
	}
}
