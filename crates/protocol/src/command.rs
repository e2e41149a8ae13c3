//! Command vocabulary, submission payloads and typed result records.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Commands a sensor executes inside a live response session.
///
/// Serialized with the control plane's space-separated names
/// (`"create process"`, `"reg enum key"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandName {
	#[serde(rename = "create process")]
	CreateProcess,
	#[serde(rename = "create directory")]
	CreateDirectory,
	#[serde(rename = "delete file")]
	DeleteFile,
	#[serde(rename = "put file")]
	PutFile,
	#[serde(rename = "directory list")]
	DirectoryList,
	#[serde(rename = "get file")]
	GetFile,
	#[serde(rename = "kill")]
	Kill,
	#[serde(rename = "process list")]
	ProcessList,
	#[serde(rename = "reg create key")]
	RegCreateKey,
	#[serde(rename = "reg enum key")]
	RegEnumKey,
	#[serde(rename = "reg query key")]
	RegQueryKey,
	#[serde(rename = "reg query value")]
	RegQueryValue,
	#[serde(rename = "reg delete value")]
	RegDeleteValue,
	#[serde(rename = "reg delete key")]
	RegDeleteKey,
	#[serde(rename = "reg set value")]
	RegSetValue,
	#[serde(rename = "memdump")]
	Memdump,
}

impl CommandName {
	pub const ALL: [CommandName; 16] = [
		CommandName::CreateProcess,
		CommandName::CreateDirectory,
		CommandName::DeleteFile,
		CommandName::PutFile,
		CommandName::DirectoryList,
		CommandName::GetFile,
		CommandName::Kill,
		CommandName::ProcessList,
		CommandName::RegCreateKey,
		CommandName::RegEnumKey,
		CommandName::RegQueryKey,
		CommandName::RegQueryValue,
		CommandName::RegDeleteValue,
		CommandName::RegDeleteKey,
		CommandName::RegSetValue,
		CommandName::Memdump,
	];

	/// Name used on the wire.
	pub fn as_wire(self) -> &'static str {
		match self {
			CommandName::CreateProcess => "create process",
			CommandName::CreateDirectory => "create directory",
			CommandName::DeleteFile => "delete file",
			CommandName::PutFile => "put file",
			CommandName::DirectoryList => "directory list",
			CommandName::GetFile => "get file",
			CommandName::Kill => "kill",
			CommandName::ProcessList => "process list",
			CommandName::RegCreateKey => "reg create key",
			CommandName::RegEnumKey => "reg enum key",
			CommandName::RegQueryKey => "reg query key",
			CommandName::RegQueryValue => "reg query value",
			CommandName::RegDeleteValue => "reg delete value",
			CommandName::RegDeleteKey => "reg delete key",
			CommandName::RegSetValue => "reg set value",
			CommandName::Memdump => "memdump",
		}
	}

	/// Operator verb that issues this command.
	pub fn verb(self) -> &'static str {
		match self {
			CommandName::CreateProcess => "exec",
			CommandName::CreateDirectory => "mkdir",
			CommandName::DeleteFile => "del",
			CommandName::PutFile => "put",
			CommandName::DirectoryList => "dir",
			CommandName::GetFile => "get",
			CommandName::Kill => "kill",
			CommandName::ProcessList => "ps",
			CommandName::RegCreateKey
			| CommandName::RegEnumKey
			| CommandName::RegQueryKey
			| CommandName::RegQueryValue
			| CommandName::RegDeleteValue
			| CommandName::RegDeleteKey
			| CommandName::RegSetValue => "reg",
			CommandName::Memdump => "memdump",
		}
	}
}

impl std::fmt::Display for CommandName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_wire())
	}
}

impl FromStr for CommandName {
	type Err = String;

	/// Accepts the wire name or its hyphenated form (`create-process`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().replace('-', " ");
		CommandName::ALL
			.into_iter()
			.find(|name| name.as_wire() == normalized)
			.ok_or_else(|| format!("unknown command name: {s}"))
	}
}

/// Payload for `POST /api/v1/cblr/session/{id}/command`.
///
/// Extra arguments are flattened next to `name` and `object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
	pub name: CommandName,
	pub object: String,
	#[serde(flatten)]
	pub args: Map<String, Value>,
}

impl CommandRequest {
	pub fn new(name: CommandName, object: impl Into<String>) -> Self {
		Self {
			name,
			object: object.into(),
			args: Map::new(),
		}
	}

	/// Adds an extra argument, replacing any previous value for `key`.
	pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.args.insert(key.into(), value.into());
		self
	}
}

/// Server acknowledgement of a submitted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
}

/// Body of `PUT /api/v1/cblr/session/{id}/command/{cmd}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandStatusUpdate {
	pub id: u64,
	pub status: String,
}

impl CommandStatusUpdate {
	pub fn cancel(id: u64) -> Self {
		Self {
			id,
			status: "cancel".to_string(),
		}
	}
}

/// One entry of a `directory list` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
	pub filename: String,
	#[serde(default)]
	pub attributes: Vec<String>,
	#[serde(default)]
	pub size: u64,
	#[serde(default)]
	pub create_time: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_write_time: Option<i64>,
}

impl DirectoryEntry {
	pub fn is_directory(&self) -> bool {
		self.attributes.iter().any(|attr| attr == "DIRECTORY")
	}
}

/// One entry of a `process list` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
	pub pid: u64,
	#[serde(default)]
	pub path: String,
	#[serde(default)]
	pub proc_guid: String,
	#[serde(default)]
	pub create_time: i64,
	#[serde(default)]
	pub parent: u64,
	#[serde(default)]
	pub parent_guid: String,
	#[serde(default)]
	pub sid: String,
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub command_line: String,
}

/// A registry value as reported by `reg enum key` / `reg query value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryValue {
	#[serde(default)]
	pub value_name: String,
	pub value_type: String,
	#[serde(default)]
	pub value_data: Value,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_flattens_extra_arguments() {
		let request = CommandRequest::new(CommandName::GetFile, "C:\\temp\\a.txt")
			.arg("offset", 10)
			.arg("get_count", 512);

		let body = serde_json::to_value(&request).unwrap();
		assert_eq!(
			body,
			serde_json::json!({
				"name": "get file",
				"object": "C:\\temp\\a.txt",
				"offset": 10,
				"get_count": 512,
			})
		);
	}

	#[test]
	fn names_parse_from_wire_and_hyphenated_forms() {
		assert_eq!("reg enum key".parse::<CommandName>().unwrap(), CommandName::RegEnumKey);
		assert_eq!("create-process".parse::<CommandName>().unwrap(), CommandName::CreateProcess);
		assert!("format disk".parse::<CommandName>().is_err());
	}

	#[test]
	fn every_name_round_trips_through_its_wire_form() {
		for name in CommandName::ALL {
			let json = serde_json::to_string(&name).unwrap();
			assert_eq!(json, format!("\"{}\"", name.as_wire()));
			assert_eq!(name.as_wire().parse::<CommandName>().unwrap(), name);
		}
	}

	#[test]
	fn registry_commands_share_one_verb() {
		assert_eq!(CommandName::RegSetValue.verb(), "reg");
		assert_eq!(CommandName::RegDeleteKey.verb(), "reg");
		assert_eq!(CommandName::ProcessList.verb(), "ps");
	}

	#[test]
	fn directory_flag_detected_from_attributes() {
		let entry: DirectoryEntry = serde_json::from_value(serde_json::json!({
			"filename": "Windows",
			"attributes": ["DIRECTORY", "SYSTEM"],
			"size": 0,
			"create_time": 1_400_000_000,
		}))
		.unwrap();
		assert!(entry.is_directory());
	}
}
