use cblr::{CancellationToken, LiveResponse, RegistryValueSpec};
use clap::{Args, Subcommand};

use crate::error::{CliError, Result};
use crate::output;

#[derive(Args, Debug, PartialEq)]
pub struct RegArgs {
	#[command(subcommand)]
	pub action: RegAction,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum RegAction {
	/// Create a key, or set a value with -v
	Add {
		key: String,
		#[arg(short = 'v', long = "value", value_name = "NAME")]
		value: Option<String>,
		/// REG_SZ, REG_DWORD, REG_MULTI_SZ, ...
		#[arg(short = 't', long = "type", value_name = "TYPE")]
		value_type: Option<String>,
		/// Value data; `;` separates REG_MULTI_SZ entries
		#[arg(short = 'd', long = "data", value_name = "DATA")]
		data: Option<String>,
		/// Overwrite an existing value
		#[arg(short = 'f', long)]
		force: bool,
	},
	/// Delete a key, or one value with -v
	Delete {
		key: String,
		#[arg(short = 'v', long = "value", value_name = "NAME")]
		value: Option<String>,
	},
	/// Show a key's sub keys and values, or one value with -v
	Query {
		key: String,
		#[arg(short = 'v', long = "value", value_name = "NAME")]
		value: Option<String>,
	},
}

pub(super) async fn reg(lr: &LiveResponse, action: RegAction, cancel: &CancellationToken) -> Result<()> {
	match action {
		RegAction::Add {
			key,
			value: None,
			..
		} => {
			lr.reg_create_key(&key, cancel).await?;
			println!("Created key {key}");
		}
		RegAction::Add {
			key,
			value: Some(name),
			value_type,
			data,
			force,
		} => {
			let (Some(value_type), Some(data)) = (value_type, data) else {
				return Err(CliError::usage("reg add -v needs both -t TYPE and -d DATA"));
			};
			let spec = RegistryValueSpec {
				key,
				name,
				value_type,
				data,
				overwrite: force,
			};
			lr.reg_set_value(&spec, cancel).await?;
			println!("Set {}\\{}", spec.key, spec.name);
		}
		RegAction::Delete { key, value: None } => {
			lr.reg_delete_key(&key, cancel).await?;
			println!("Deleted key {key}");
		}
		RegAction::Delete { key, value: Some(name) } => {
			lr.reg_delete_value(&key, &name, cancel).await?;
			println!("Deleted value {key}\\{name}");
		}
		RegAction::Query { key, value: None } => {
			let listing = lr.reg_enum_key(&key, cancel).await?;
			println!("{}", output::registry_key(&listing));
		}
		RegAction::Query { key, value: Some(name) } => match lr.reg_query_value(&key, &name, cancel).await? {
			Some(value) => println!("{}", output::registry_value(&value)),
			None => println!("No data for {key}\\{name}"),
		},
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;
	use crate::commands::{Verb, VerbLine};

	#[test]
	fn value_flags_parse_under_add() {
		let line = VerbLine::try_parse_from(["reg", "add", "HKLM\\Software\\Acme", "-v", "Run", "-t", "REG_SZ", "-d", "C:\\a.exe", "-f"]).unwrap();
		let Verb::Reg(RegArgs { action }) = line.verb else {
			panic!("not reg");
		};
		assert_eq!(
			action,
			RegAction::Add {
				key: "HKLM\\Software\\Acme".into(),
				value: Some("Run".into()),
				value_type: Some("REG_SZ".into()),
				data: Some("C:\\a.exe".into()),
				force: true,
			}
		);
	}
}
