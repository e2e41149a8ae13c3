//! Files staged in the server's per-session file space.

use serde::{Deserialize, Serialize};

/// A file uploaded to, or retrieved into, the session's staging area.
///
/// `size` is absent while an upload is failing; `status` is non-zero then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFile {
	pub id: u64,
	#[serde(default)]
	pub file_name: String,
	#[serde(default)]
	pub status: i64,
	#[serde(default)]
	pub size: Option<u64>,
	#[serde(default)]
	pub size_uploaded: Option<u64>,
}

impl StagedFile {
	pub fn is_error(&self) -> bool {
		self.status != 0
	}
}
