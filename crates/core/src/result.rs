//! Resolved command payloads.

use cblr_protocol::{DirectoryEntry, ProcessEntry, RegistryValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Payload of a command that resolved with `result_code == 0`.
///
/// The raw JSON is kept unchanged; typed views decode the parts a verb needs
/// and treat missing or ill-typed fields as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
	payload: Value,
}

impl CommandResult {
	pub fn new(payload: Value) -> Self {
		Self { payload }
	}

	pub fn payload(&self) -> &Value {
		&self.payload
	}

	pub fn into_payload(self) -> Value {
		self.payload
	}

	/// Server-assigned command id.
	pub fn id(&self) -> Option<u64> {
		self.payload.get("id").and_then(Value::as_u64)
	}

	pub fn result_code(&self) -> i64 {
		self.payload.get("result_code").and_then(Value::as_i64).unwrap_or(0)
	}

	/// Entries of a `directory list`; `None` when the key is missing.
	pub fn files(&self) -> Option<Vec<DirectoryEntry>> {
		self.field("files")
	}

	pub fn processes(&self) -> Vec<ProcessEntry> {
		self.field("processes").unwrap_or_default()
	}

	/// Staged file id produced by `get file`.
	pub fn file_id(&self) -> Option<u64> {
		self.payload.get("file_id").and_then(Value::as_u64)
	}

	/// Pid of a process started by `create process`.
	pub fn pid(&self) -> Option<u64> {
		self.payload.get("pid").and_then(Value::as_u64)
	}

	/// Exit code of a process started with `wait`.
	pub fn return_code(&self) -> Option<i64> {
		self.payload.get("return_code").and_then(Value::as_i64)
	}

	pub fn sub_keys(&self) -> Vec<String> {
		self.field("sub_keys").unwrap_or_default()
	}

	pub fn values(&self) -> Vec<RegistryValue> {
		self.field("values").unwrap_or_default()
	}

	pub fn value(&self) -> Option<RegistryValue> {
		self.field("value")
	}

	fn field<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let value = self.payload.get(key)?;
		serde_json::from_value(value.clone()).ok()
	}
}
