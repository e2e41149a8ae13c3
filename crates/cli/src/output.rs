//! Text rendering for console results.
//!
//! Renderers return strings so handlers stay free of formatting and the
//! layouts can be checked in tests.

use std::fmt::Write as _;

use cblr::protocol::{DirectoryEntry, ProcessEntry, RegistryValue, SensorInfo, Session, StagedFile};
use cblr::{AttachedSession, DirectoryListing, ExecOutcome, RegistryKeyListing};
use chrono::DateTime;
use colored::Colorize;

use crate::error::CliError;

/// Listing timestamps are shown in GMT, `MM/DD/YYYY hh:mm:ss AM`.
pub fn gmt(unix_seconds: i64) -> String {
	DateTime::from_timestamp(unix_seconds, 0)
		.map(|time| time.format("%m/%d/%Y %I:%M:%S %p").to_string())
		.unwrap_or_else(|| unix_seconds.to_string())
}

pub fn session(session: &Session) -> String {
	format!(
		"Session: {}\n  status: {}\n  sensorId: {}\n  timeout: {}",
		session.id, session.status, session.sensor_id, session.session_timeout
	)
}

pub fn attached(session: &AttachedSession) -> String {
	format!(
		"Session: {}\n  Available Drives: {}\n  Supported Commands: {}\n  Working Directory: {}",
		session.id(),
		session.drives().join(" "),
		session.verbs().join(" "),
		cblr::path::display(session.cwd())
	)
}

pub fn sensor(sensor: &SensorInfo) -> String {
	format!(
		"Computer Name: {}\nSensor ID: {}\nOperating System: {}\nStatus: {}",
		sensor.computer_name, sensor.id, sensor.os_environment_display_string, sensor.status
	)
}

pub fn sensor_table(sensors: &[SensorInfo]) -> String {
	let width = sensors.iter().map(|s| s.computer_name.len()).max().unwrap_or(0).max("Computer Name".len());
	let mut out = format!("{:<width$}  Sensor ID\n", "Computer Name");
	for sensor in sensors {
		let _ = writeln!(out, "{:<width$}  {}", sensor.computer_name, sensor.id);
	}
	out.trim_end().to_string()
}

pub fn directory(listing: &DirectoryListing) -> String {
	let mut out = format!("Directory: {}\n", listing.path);
	for entry in &listing.entries {
		let _ = write!(out, "\n{}", directory_entry(entry));
	}
	out
}

fn directory_entry(entry: &DirectoryEntry) -> String {
	let size = if entry.is_directory() { format!("{:<20}", "<DIR>") } else { format!("{:>20}", entry.size) };
	format!("{}\t{} {}", gmt(entry.create_time), size, entry.filename)
}

pub fn processes(processes: &[ProcessEntry], verbose: bool) -> String {
	let mut out = String::new();
	for process in processes {
		let name = cblr::path::leaf(&process.path);
		if verbose {
			let _ = writeln!(out, "Process: {:5} : {name}", process.pid);
			let _ = writeln!(out, "  Guid:        {}", process.proc_guid);
			let _ = writeln!(out, "  CreateTime:  {} (GMT)", gmt(process.create_time));
			let _ = writeln!(out, "  ParentPid:   {}", process.parent);
			let _ = writeln!(out, "  ParentGuid:  {}", process.parent_guid);
			let _ = writeln!(out, "  SID:         {}", process.sid.to_uppercase());
			let _ = writeln!(out, "  UserName:    {}", process.username);
			let _ = writeln!(out, "  ExePath:     {}", process.path);
			let _ = writeln!(out, "  CommandLine: {}\n", process.command_line);
		} else {
			let _ = writeln!(out, "{:5}  {name:<30} {:<20}", process.pid, process.username);
		}
	}
	out.trim_end().to_string()
}

pub fn staged_files(files: &[StagedFile]) -> String {
	let mut out = String::new();
	for file in files {
		let _ = writeln!(out, "File Id: {}\n name:   {}", file.id, file.file_name);
		if file.is_error() {
			let _ = writeln!(out, " error:  0x{:x}", file.status as u32);
		} else {
			let _ = writeln!(out, " size:   {} ({} uploaded)", file.size.unwrap_or(0), file.size_uploaded.unwrap_or(0));
		}
	}
	out.trim_end().to_string()
}

pub fn exec(outcome: &ExecOutcome) -> String {
	let pid = outcome.pid.map_or_else(|| "?".to_string(), |pid| pid.to_string());
	match outcome.return_code {
		Some(code) => format!("Process Pid: {pid} (ReturnCode: {code})"),
		None => format!("Process Pid: {pid}"),
	}
}

pub fn registry_value(value: &RegistryValue) -> String {
	let name = if value.value_name.is_empty() { "(Default)" } else { &value.value_name };
	let data = match &value.value_data {
		serde_json::Value::String(s) => s.clone(),
		serde_json::Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join("; "),
		other => other.to_string(),
	};
	format!("  {name:<30} {:>10} {data}", value.value_type)
}

fn value_text(value: &serde_json::Value) -> String {
	value.as_str().map_or_else(|| value.to_string(), str::to_string)
}

pub fn registry_key(listing: &RegistryKeyListing) -> String {
	let mut out = String::from("Keys:\n");
	for key in &listing.sub_keys {
		let _ = writeln!(out, "  {key}");
	}
	out.push_str("Values:\n");
	for value in &listing.values {
		let _ = writeln!(out, "{}", registry_value(value));
	}
	out.trim_end().to_string()
}

/// Console prompt, tagged with the attached session id.
pub fn prompt(session: Option<u64>) -> String {
	match session {
		Some(id) => format!("{} {}> ", "CB".cyan(), format!("[{id}]").green()),
		None => format!("{} > ", "CB".cyan()),
	}
}

pub fn print_error(err: &CliError) {
	if err.is_cancellation() {
		eprintln!("{}", "command canceled".yellow());
	} else {
		eprintln!("{} {err:#}", "[-]".red());
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn timestamps_render_in_gmt() {
		assert_eq!(gmt(0), "01/01/1970 12:00:00 AM");
		assert_eq!(gmt(1_500_000_000), "07/14/2017 02:40:00 AM");
	}

	#[test]
	fn directory_rows_mark_directories() {
		let listing = DirectoryListing {
			path: "C:\\Windows\\*".into(),
			entries: vec![
				serde_json::from_value(json!({ "filename": "System32", "attributes": ["DIRECTORY"], "create_time": 0 })).unwrap(),
				serde_json::from_value(json!({ "filename": "win.ini", "attributes": ["ARCHIVE"], "size": 92, "create_time": 0 })).unwrap(),
			],
		};
		let text = directory(&listing);
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines[0], "Directory: C:\\Windows\\*");
		assert!(lines[2].ends_with("<DIR>                System32"), "{}", lines[2]);
		assert!(lines[3].ends_with("                  92 win.ini"), "{}", lines[3]);
	}

	#[test]
	fn staged_file_errors_show_hresult() {
		let files: Vec<StagedFile> = serde_json::from_value(json!([
			{ "id": 1, "file_name": "ok.bin", "status": 0, "size": 4, "size_uploaded": 4 },
			{ "id": 2, "file_name": "bad.bin", "status": -2147024891i64 }
		]))
		.unwrap();
		let text = staged_files(&files);
		assert!(text.contains(" size:   4 (4 uploaded)"));
		assert!(text.contains(" error:  0x80070005"));
	}

	#[test]
	fn default_registry_value_is_named() {
		let value: RegistryValue = serde_json::from_value(json!({ "value_name": "", "value_type": "REG_SZ", "value_data": "x" })).unwrap();
		assert!(registry_value(&value).starts_with("  (Default)"));
	}

	#[test]
	fn exec_reports_return_code_only_when_waited() {
		let outcome = ExecOutcome {
			command_line: "ipconfig".into(),
			pid: Some(12),
			return_code: None,
		};
		assert_eq!(exec(&outcome), "Process Pid: 12");
		let waited = ExecOutcome {
			return_code: Some(1),
			..outcome
		};
		assert_eq!(exec(&waited), "Process Pid: 12 (ReturnCode: 1)");
	}
}
