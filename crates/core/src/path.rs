//! Remote path resolution against the pseudo working directory.
//!
//! Sensors speak Windows path syntax no matter where this client runs, so
//! everything here works on plain strings with `\` as the separator rather
//! than on [`std::path::Path`].

/// Remote path separator.
pub const SEPARATOR: char = '\\';

/// How a user-supplied path relates to the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
	/// `\\server\share\...` or `C:\...`; used as given.
	Absolute,
	/// `\` or `\dir\...`; rooted on the working directory's drive.
	DriveRelative,
	/// Anything else; joined under the working directory.
	DirectoryRelative,
}

/// Classifies `path` without touching the remote side.
pub fn classify(path: &str) -> PathKind {
	if path.starts_with("\\\\") || has_drive_root(path) {
		PathKind::Absolute
	} else if path.starts_with(SEPARATOR) {
		PathKind::DriveRelative
	} else {
		PathKind::DirectoryRelative
	}
}

/// Returns true for `X:\...` where `X` is an ASCII letter.
fn has_drive_root(path: &str) -> bool {
	let bytes = path.as_bytes();
	bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

/// Drive portion (`C:`) of a working directory.
pub fn drive(cwd: &str) -> &str {
	cwd.get(..2).unwrap_or(cwd)
}

/// Produces the canonical remote path for `path` given the working directory.
///
/// `cwd` must not carry a trailing separator (see [`trim_trailing_separator`]).
pub fn resolve(cwd: &str, path: &str) -> String {
	match classify(path) {
		PathKind::Absolute => path.to_string(),
		PathKind::DriveRelative => format!("{}{}", drive(cwd), path),
		PathKind::DirectoryRelative => join(cwd, path),
	}
}

/// Joins `name` under `dir` with exactly one separator between them.
pub fn join(dir: &str, name: &str) -> String {
	let dir = dir.trim_end_matches(SEPARATOR);
	format!("{dir}{SEPARATOR}{name}")
}

/// Final component of a remote path (`notepad.exe` for `C:\Windows\notepad.exe`).
pub fn leaf(path: &str) -> &str {
	let path = path.trim_end_matches(SEPARATOR);
	path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Collapses `.` and `..` segments and duplicate separators.
///
/// `..` never climbs above the drive root or UNC prefix. A bare drive comes
/// back with its root separator (`C:\`).
pub fn normalize(path: &str) -> String {
	let path = path.replace('/', "\\");

	let (prefix, rest) = if let Some(rest) = path.strip_prefix("\\\\") {
		("\\\\".to_string(), rest.to_string())
	} else if path.len() >= 2 && path.as_bytes()[0].is_ascii_alphabetic() && path.as_bytes()[1] == b':' {
		(format!("{}{SEPARATOR}", &path[..2]), path[2..].to_string())
	} else if let Some(rest) = path.strip_prefix(SEPARATOR) {
		(SEPARATOR.to_string(), rest.to_string())
	} else {
		(String::new(), path)
	};

	let mut parts: Vec<&str> = Vec::new();
	for segment in rest.split(SEPARATOR) {
		match segment {
			"" | "." => {}
			".." => {
				parts.pop();
			}
			other => parts.push(other),
		}
	}

	format!("{prefix}{}", parts.join("\\"))
}

/// Removes trailing separators, keeping a bare drive as `C:`.
pub fn trim_trailing_separator(path: &str) -> &str {
	let trimmed = path.trim_end_matches(SEPARATOR);
	if trimmed.is_empty() { path } else { trimmed }
}

/// Working directory as shown to the operator: a bare drive gets its root.
pub fn display(cwd: &str) -> String {
	if cwd.len() == 2 && cwd.ends_with(':') {
		format!("{cwd}{SEPARATOR}")
	} else {
		cwd.to_string()
	}
}
