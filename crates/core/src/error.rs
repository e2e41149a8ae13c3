//! Error types for the live response engine.

use cblr_protocol::SessionId;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the engine.
///
/// Every variant aborts only the operation that produced it; attach state is
/// left as it was.
#[derive(Debug, Error)]
pub enum Error {
	/// Control plane answered with a status other than 200.
	#[error("HTTP {status} from {url}: {body}")]
	RemoteRequest { url: String, status: u16, body: String },

	/// No response within the transport's request timeout.
	#[error("request to {url} timed out")]
	RemoteTimeout { url: String },

	/// Response body could not be decoded.
	#[error("malformed response from {url}: {source}")]
	MalformedResponse {
		url: String,
		#[source]
		source: serde_json::Error,
	},

	/// Command resolved with a non-zero result code (sensor HRESULT).
	#[error("command failed: HRESULT {}", hresult(.code))]
	RemoteCommand { code: i64 },

	/// Operator canceled an outstanding command.
	#[error("command {command_id} canceled")]
	CommandCanceled { command_id: u64 },

	#[error("not attached to a session")]
	NotAttached,

	#[error("already attached to session {0}; detach first")]
	AlreadyAttached(SessionId),

	#[error("no pending or active session {0}")]
	SessionNotFound(SessionId),

	#[error("session {0} is not active")]
	SessionNotActive(SessionId),

	#[error("path {0} does not exist")]
	PathNotFound(String),

	/// Connection-level failure below HTTP (DNS, TLS, refused).
	#[error("transport failure: {0}")]
	Http(#[source] reqwest::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Sensor result codes are Win32 HRESULTs; render the 32-bit pattern.
fn hresult(code: &i64) -> String {
	format!("0x{:08x}", *code as u32)
}

impl Error {
	/// Returns true if this error reports an operator cancellation.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Error::CommandCanceled { .. })
	}

	/// Returns the sensor result code if this is a failed command.
	pub fn result_code(&self) -> Option<i64> {
		match self {
			Error::RemoteCommand { code } => Some(*code),
			_ => None,
		}
	}

	/// Returns the HTTP status if the control plane rejected the request.
	pub fn status(&self) -> Option<u16> {
		match self {
			Error::RemoteRequest { status, .. } => Some(*status),
			_ => None,
		}
	}
}
