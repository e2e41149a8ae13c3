use cblr_protocol::{CommandName, CommandRequest, RegistryValue};
use tokio_util::sync::CancellationToken;

use super::LiveResponse;
use crate::error::Result;
use crate::result::CommandResult;

/// Sub-keys and values under a registry key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryKeyListing {
	pub sub_keys: Vec<String>,
	pub values: Vec<RegistryValue>,
}

/// A value for `reg set value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValueSpec {
	pub key: String,
	pub name: String,
	/// `REG_SZ`, `REG_DWORD`, `REG_MULTI_SZ`, ...
	pub value_type: String,
	pub data: String,
	pub overwrite: bool,
}

impl LiveResponse {
	pub async fn reg_create_key(&self, key: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		self.execute(CommandRequest::new(CommandName::RegCreateKey, key), cancel).await
	}

	pub async fn reg_delete_key(&self, key: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		self.execute(CommandRequest::new(CommandName::RegDeleteKey, key), cancel).await
	}

	pub async fn reg_delete_value(&self, key: &str, name: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		self.execute(CommandRequest::new(CommandName::RegDeleteValue, value_path(key, name)), cancel).await
	}

	pub async fn reg_set_value(&self, spec: &RegistryValueSpec, cancel: &CancellationToken) -> Result<CommandResult> {
		let request = CommandRequest::new(CommandName::RegSetValue, value_path(&spec.key, &spec.name))
			.arg("value_type", spec.value_type.as_str())
			.arg("value_data", value_data(&spec.value_type, &spec.data))
			.arg("overwrite", spec.overwrite);
		self.execute(request, cancel).await
	}

	pub async fn reg_enum_key(&self, key: &str, cancel: &CancellationToken) -> Result<RegistryKeyListing> {
		let result = self.execute(CommandRequest::new(CommandName::RegEnumKey, key), cancel).await?;
		Ok(RegistryKeyListing {
			sub_keys: result.sub_keys(),
			values: result.values(),
		})
	}

	pub async fn reg_query_value(&self, key: &str, name: &str, cancel: &CancellationToken) -> Result<Option<RegistryValue>> {
		let result = self.execute(CommandRequest::new(CommandName::RegQueryValue, value_path(key, name)), cancel).await?;
		Ok(result.value())
	}
}

fn value_path(key: &str, name: &str) -> String {
	format!("{}\\{name}", key.trim_end_matches('\\'))
}

/// `REG_MULTI_SZ` data travels as a list; `;` separates entries on input.
fn value_data(value_type: &str, data: &str) -> serde_json::Value {
	if value_type.eq_ignore_ascii_case("REG_MULTI_SZ") {
		data.split(';').map(str::to_string).collect::<Vec<_>>().into()
	} else {
		data.into()
	}
}
