//! Session records and state transitions.

use serde::{Deserialize, Serialize};

/// Server-assigned session identifier.
pub type SessionId = u64;

/// Lifecycle status reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	/// Waiting for the sensor to check in.
	Pending,
	/// Sensor is connected and accepting commands.
	Active,
	/// Closed by an operator.
	Close,
	/// Expired from inactivity.
	Timeout,
	/// Any status this client does not know about.
	#[serde(other)]
	Unknown,
}

impl SessionStatus {
	/// Returns `true` for statuses a session never leaves.
	pub fn is_dead(self) -> bool {
		matches!(self, SessionStatus::Close | SessionStatus::Timeout)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			SessionStatus::Pending => "pending",
			SessionStatus::Active => "active",
			SessionStatus::Close => "close",
			SessionStatus::Timeout => "timeout",
			SessionStatus::Unknown => "unknown",
		}
	}
}

impl std::fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Snapshot of a session as returned by `GET /api/v1/cblr/session`.
///
/// Pending sessions have not yet received the sensor's environment, so the
/// working directory, drives and command set are optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub status: SessionStatus,
	pub sensor_id: u64,
	#[serde(default)]
	pub session_timeout: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_working_directory: Option<String>,
	#[serde(default)]
	pub drives: Vec<String>,
	/// Remote command names as advertised; unknown names are kept verbatim.
	#[serde(default)]
	pub supported_commands: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
}

/// Body of `POST /api/v1/cblr/session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
	pub sensor_id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_timeout: Option<u64>,
}

/// Body of `PUT /api/v1/cblr/session/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatusUpdate {
	pub id: SessionId,
	pub status: SessionStatus,
}

impl SessionStatusUpdate {
	pub fn close(id: SessionId) -> Self {
		Self { id, status: SessionStatus::Close }
	}
}
