//! Append-only log of HTTP exchanges with the control plane.
//!
//! The log is a debugging aid for operators. Nothing here may fail the
//! request being logged: open and write errors are reported through
//! `tracing` and otherwise ignored.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

const OPEN_MARKER: &str = "-------------------------";
const CLOSE_MARKER: &str = "^^^^^^^^^^^^^^^^^^^^^^^^^";

/// Destination for request/response records.
#[derive(Debug, Default)]
pub struct AuditLog {
	sink: Option<Sink>,
}

#[derive(Debug)]
struct Sink {
	path: PathBuf,
	file: Mutex<File>,
}

impl AuditLog {
	/// A log that records nothing.
	pub fn disabled() -> Self {
		Self::default()
	}

	/// Opens `path` for appending, creating parent directories as needed.
	///
	/// Falls back to a disabled log if the file cannot be opened.
	pub fn open(path: &Path) -> Self {
		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				if let Err(err) = std::fs::create_dir_all(parent) {
					warn!(target: "cblr.transport", path = %path.display(), error = %err, "http log directory unavailable; logging disabled");
					return Self::disabled();
				}
			}
		}

		match OpenOptions::new().create(true).append(true).open(path) {
			Ok(file) => Self {
				sink: Some(Sink {
					path: path.to_path_buf(),
					file: Mutex::new(file),
				}),
			},
			Err(err) => {
				warn!(target: "cblr.transport", path = %path.display(), error = %err, "cannot open http log; logging disabled");
				Self::disabled()
			}
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.sink.is_some()
	}

	pub fn path(&self) -> Option<&Path> {
		self.sink.as_ref().map(|sink| sink.path.as_path())
	}

	/// Records one exchange as a delimited block.
	pub fn exchange(&self, method: &str, url: &str, request: Option<&str>, outcome: &str) {
		let Some(sink) = &self.sink else {
			return;
		};

		let mut block = format!("{OPEN_MARKER}\n{method} (url: {url})\n");
		if let Some(data) = request {
			block.push_str("Data: ");
			block.push_str(data);
			block.push('\n');
		}
		block.push_str(outcome);
		block.push('\n');
		block.push_str(CLOSE_MARKER);
		block.push('\n');

		let mut file = sink.file.lock();
		if let Err(err) = file.write_all(block.as_bytes()).and_then(|_| file.flush()) {
			warn!(target: "cblr.transport", path = %sink.path.display(), error = %err, "failed writing http log");
		}
	}
}
