//! Command submission and completion wait.
//!
//! A command is posted to the session's command collection and then awaited
//! with a single `GET ...?wait=true`; the control plane holds that request
//! open until the sensor resolves the command. Cancelling the caller's token
//! while the wait is outstanding abandons the GET and asks the control plane
//! to cancel the command instead.

use cblr_protocol::{CommandDescriptor, CommandName, CommandRequest, CommandStatusUpdate, SessionId, routes};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::keepalive::IdleCounter;
use crate::result::CommandResult;
use crate::transport::Transport;

/// What a remote path names, as far as a directory listing can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStat {
	Directory,
	File,
	/// The listing command failed or returned nothing.
	Absent,
}

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
	transport: Transport,
	idle: IdleCounter,
}

impl CommandDispatcher {
	/// `idle` is reset on every submission so the keep-alive task stays quiet
	/// while commands are flowing.
	pub fn new(transport: Transport, idle: IdleCounter) -> Self {
		Self { transport, idle }
	}

	/// Submits `request` to `session_id` and blocks until it resolves.
	///
	/// Fails with [`Error::RemoteCommand`] on a non-zero result code and with
	/// [`Error::CommandCanceled`] if `cancel` fires during the wait.
	pub async fn submit_and_await(&self, session_id: SessionId, request: CommandRequest, cancel: &CancellationToken) -> Result<CommandResult> {
		let name = request.name;
		let descriptor: CommandDescriptor = self.transport.post_json(&routes::commands(session_id), &request).await?;
		self.idle.reset();

		let command_id = descriptor.id;
		debug!(target: "cblr.dispatch", session = session_id, command = command_id, %name, object = %request.object, "command submitted");

		let path = routes::command(session_id, command_id);
		let payload = tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				self.cancel_remote(session_id, command_id).await;
				return Err(Error::CommandCanceled { command_id });
			}
			reply = self.transport.get_json::<Value>(&path, &[("wait", "true")]) => reply?,
		};

		let result = interpret(payload)?;
		debug!(target: "cblr.dispatch", session = session_id, command = command_id, %name, "command completed");
		Ok(result)
	}

	/// Classifies `path` by listing it on the sensor.
	///
	/// A failed listing is reported as [`PathStat::Absent`], not as an error.
	pub async fn stat(&self, session_id: SessionId, path: &str, cancel: &CancellationToken) -> Result<PathStat> {
		let path = path.strip_suffix('\\').unwrap_or(path);
		let request = CommandRequest::new(CommandName::DirectoryList, path);

		match self.submit_and_await(session_id, request, cancel).await {
			Ok(result) => Ok(classify_listing(&result)),
			Err(Error::RemoteCommand { code }) => {
				debug!(target: "cblr.dispatch", session = session_id, path, code, "stat target absent");
				Ok(PathStat::Absent)
			}
			Err(err) => Err(err),
		}
	}

	/// Best effort: a failed cancel is logged, the caller still sees the cancellation.
	async fn cancel_remote(&self, session_id: SessionId, command_id: u64) {
		let path = routes::command(session_id, command_id);
		match self.transport.put_json::<_, Value>(&path, &CommandStatusUpdate::cancel(command_id)).await {
			Ok(_) => debug!(target: "cblr.dispatch", session = session_id, command = command_id, "command cancel requested"),
			Err(err) => warn!(target: "cblr.dispatch", session = session_id, command = command_id, error = %err, "failed to cancel command"),
		}
	}
}

/// Maps a resolved command payload to success or [`Error::RemoteCommand`].
pub fn interpret(payload: Value) -> Result<CommandResult> {
	let result = CommandResult::new(payload);
	match result.result_code() {
		0 => Ok(result),
		code => Err(Error::RemoteCommand { code }),
	}
}

fn classify_listing(result: &CommandResult) -> PathStat {
	match result.files().as_deref() {
		Some([first, ..]) if first.is_directory() => PathStat::Directory,
		Some([_, ..]) => PathStat::File,
		_ => PathStat::Absent,
	}
}
