use std::path::Path;

use cblr::{CancellationToken, FileRange, LiveResponse};
use tracing::debug;

use super::GetArgs;
use crate::error::{CliError, Result};
use crate::output;

pub(super) fn pwd(lr: &LiveResponse) -> Result<()> {
	println!("{}", lr.pwd()?);
	Ok(())
}

pub(super) async fn cd(lr: &mut LiveResponse, path: &str, cancel: &CancellationToken) -> Result<()> {
	lr.change_directory(path, cancel).await?;
	Ok(())
}

pub(super) async fn dir(lr: &LiveResponse, path: Option<&str>, cancel: &CancellationToken) -> Result<()> {
	let listing = lr.list_directory(path, cancel).await?;
	println!("{}", output::directory(&listing));
	Ok(())
}

pub(super) async fn mkdir(lr: &LiveResponse, path: &str, cancel: &CancellationToken) -> Result<()> {
	lr.create_directory(path, cancel).await?;
	Ok(())
}

pub(super) async fn del(lr: &LiveResponse, path: &str, cancel: &CancellationToken) -> Result<()> {
	lr.delete_file(path, cancel).await?;
	Ok(())
}

pub(super) async fn get(lr: &LiveResponse, args: GetArgs, cancel: &CancellationToken) -> Result<()> {
	let range = FileRange {
		offset: args.offset,
		count: args.count,
	};
	let file = lr.get_file(&args.remote, range, cancel).await?;
	write_local(&args.local, &file.content).await?;
	println!("Retrieved {} ({} bytes) to {}", file.remote_path, file.content.len(), args.local.display());
	Ok(())
}

pub(super) async fn put(lr: &LiveResponse, local: &Path, remote: &str, cancel: &CancellationToken) -> Result<()> {
	let staged = lr.put_file(local, remote, cancel).await?;
	println!("Uploaded {} as file {} to {}", local.display(), staged.id, lr.resolve(remote)?);
	Ok(())
}

pub(super) async fn files(lr: &LiveResponse) -> Result<()> {
	let files = lr.staged_files().await?;
	if files.is_empty() {
		println!("No staged files");
	} else {
		println!("{}", output::staged_files(&files));
	}
	Ok(())
}

pub(super) async fn archive(lr: &LiveResponse, out: &Path, session: Option<u64>) -> Result<()> {
	if session.is_none() && !lr.is_attached() {
		return Err(CliError::usage("archive needs a session id when not attached"));
	}
	let content = lr.archive(session).await?;
	write_local(out, &content).await?;
	println!("Wrote {} bytes to {}", content.len(), out.display());
	Ok(())
}

pub(super) async fn memdump(lr: &LiveResponse, path: &str, cancel: &CancellationToken) -> Result<()> {
	lr.memdump(path, cancel).await?;
	println!("Memory dump written to {}", lr.resolve(path)?);
	Ok(())
}

/// Writes `content` to `path`, removing whatever was written on failure.
async fn write_local(path: &Path, content: &[u8]) -> Result<()> {
	if let Err(err) = tokio::fs::write(path, content).await {
		if let Err(cleanup) = tokio::fs::remove_file(path).await {
			debug!(target: "cblr.console", path = %path.display(), error = %cleanup, "no partial file to remove");
		}
		return Err(err.into());
	}
	Ok(())
}
