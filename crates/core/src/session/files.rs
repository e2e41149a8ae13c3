use std::path::Path;

use cblr_protocol::{CommandName, CommandRequest, DirectoryEntry, SessionId, StagedFile, routes};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::LiveResponse;
use crate::error::{Error, Result};
use crate::path::{self, SEPARATOR};
use crate::result::CommandResult;

/// Result of a `dir` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryListing {
	/// Path as sent to the sensor, wildcard included.
	pub path: String,
	pub entries: Vec<DirectoryEntry>,
}

/// Byte range for `get file`. A `count` of `None` reads to the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileRange {
	pub offset: u64,
	pub count: Option<u64>,
}

/// Content of a file retrieved from the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedFile {
	pub remote_path: String,
	pub file_id: u64,
	pub content: Vec<u8>,
}

#[derive(Deserialize)]
struct GetFileReply {
	file_id: u64,
}

impl LiveResponse {
	/// Lists a directory; `None` lists the working directory.
	///
	/// A path ending in a separator is listed with a trailing `*` wildcard.
	pub async fn list_directory(&self, user_path: Option<&str>, cancel: &CancellationToken) -> Result<DirectoryListing> {
		let mut target = match user_path {
			Some(p) if !p.trim().is_empty() => self.resolve(p.trim())?,
			_ => self.resolve("")?,
		};
		if target.ends_with(SEPARATOR) {
			target.push('*');
		}

		let result = self.execute(CommandRequest::new(CommandName::DirectoryList, target.as_str()), cancel).await?;
		Ok(DirectoryListing {
			path: target,
			entries: result.files().unwrap_or_default(),
		})
	}

	pub async fn create_directory(&self, user_path: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		let target = self.resolve(user_path)?;
		self.execute(CommandRequest::new(CommandName::CreateDirectory, target), cancel).await
	}

	pub async fn delete_file(&self, user_path: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		let target = self.resolve(user_path)?;
		self.execute(CommandRequest::new(CommandName::DeleteFile, target), cancel).await
	}

	/// Stages a sensor file on the server and downloads its content.
	pub async fn get_file(&self, user_path: &str, range: FileRange, cancel: &CancellationToken) -> Result<RetrievedFile> {
		let remote_path = self.resolve(user_path)?;
		let mut request = CommandRequest::new(CommandName::GetFile, remote_path.as_str());
		if range.offset > 0 {
			request = request.arg("offset", range.offset);
		}
		if let Some(count) = range.count {
			request = request.arg("get_count", count);
		}

		let result = self.execute(request, cancel).await?;
		let session_id = self.require_attached()?.id();
		let reply: GetFileReply = serde_json::from_value(result.into_payload()).map_err(|source| Error::MalformedResponse {
			url: self.transport.url(&routes::commands(session_id)),
			source,
		})?;

		let content = self.transport.get_bytes(&routes::file_content(session_id, reply.file_id)).await?;
		debug!(target: "cblr.session", session = session_id, file = reply.file_id, bytes = content.len(), "file retrieved");
		Ok(RetrievedFile {
			remote_path,
			file_id: reply.file_id,
			content,
		})
	}

	/// Uploads `local` to the session file space, then writes it to
	/// `user_path` on the sensor.
	pub async fn put_file(&self, local: &Path, user_path: &str, cancel: &CancellationToken) -> Result<StagedFile> {
		let session_id = self.require_attached()?.id();
		let remote_path = self.resolve(user_path)?;
		let content = tokio::fs::read(local).await?;
		let file_name = local
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| path::leaf(&remote_path).to_string());

		let staged: StagedFile = self.transport.post_file(&routes::files(session_id), &file_name, content).await?;
		debug!(target: "cblr.session", session = session_id, file = staged.id, name = %staged.file_name, "file staged");

		let request = CommandRequest::new(CommandName::PutFile, remote_path).arg("file_id", staged.id);
		self.execute(request, cancel).await?;
		Ok(staged)
	}

	/// Files currently staged in the session file space.
	pub async fn staged_files(&self) -> Result<Vec<StagedFile>> {
		let session_id = self.require_attached()?.id();
		self.transport.get_json(&routes::files(session_id), &[]).await
	}

	/// Downloads the session archive. Defaults to the attached session.
	pub async fn archive(&self, session: Option<SessionId>) -> Result<Vec<u8>> {
		let id = session.or(self.session_id()).ok_or(Error::NotAttached)?;
		self.transport.get_bytes(&routes::archive(id)).await
	}

	/// Writes a full memory dump of the sensor host to `user_path`.
	pub async fn memdump(&self, user_path: &str, cancel: &CancellationToken) -> Result<CommandResult> {
		let target = self.resolve(user_path)?;
		self.execute(CommandRequest::new(CommandName::Memdump, target), cancel).await
	}
}
