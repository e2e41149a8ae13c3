//! [`LiveResponse`]: the attach/detach state machine and everything that
//! needs an attached session.
//!
//! The controller owns the pseudo working directory, the keep-alive task and
//! the sensor's advertised command set for the lifetime of one attach. Every
//! sensor-affecting operation checks for an attached session before any
//! network call is made.

mod files;
mod process;
mod reg;

use std::time::{Duration, Instant};

use cblr_protocol::{CommandName, CommandRequest, Session, SessionId, SessionStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use self::files::{DirectoryListing, FileRange, RetrievedFile};
pub use self::process::{ExecOutcome, ExecRequest};
pub use self::reg::{RegistryKeyListing, RegistryValueSpec};
use crate::dispatch::{CommandDispatcher, PathStat};
use crate::error::{Error, Result};
use crate::keepalive::{IdleCounter, KeepAliveConfig, KeepAliveSupervisor};
use crate::path;
use crate::registry::SessionRegistry;
use crate::result::CommandResult;
use crate::sensor::SensorDirectory;
use crate::transport::{Transport, TransportConfig};

/// Default budget for waiting on a pending session.
pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(300);

/// Working directory used when an active session reports none.
const FALLBACK_CWD: &str = "C:";

/// How [`LiveResponse::attach`] treats a session that is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
	/// Poll until the session turns active instead of failing immediately.
	pub wait_for_active: bool,
	pub wait_timeout: Duration,
	pub poll_interval: Duration,
}

impl Default for AttachOptions {
	fn default() -> Self {
		Self {
			wait_for_active: false,
			wait_timeout: DEFAULT_ATTACH_TIMEOUT,
			poll_interval: Duration::from_secs(1),
		}
	}
}

impl AttachOptions {
	pub fn waiting() -> Self {
		Self {
			wait_for_active: true,
			..Self::default()
		}
	}

	pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
		self.wait_timeout = timeout;
		self
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}
}

/// Local state for the currently attached session.
#[derive(Debug)]
pub struct AttachedSession {
	id: SessionId,
	cwd: String,
	drives: Vec<String>,
	supported_commands: Vec<String>,
	supervisor: Option<KeepAliveSupervisor>,
}

impl AttachedSession {
	pub fn id(&self) -> SessionId {
		self.id
	}

	/// Pseudo working directory, without a trailing separator.
	pub fn cwd(&self) -> &str {
		&self.cwd
	}

	pub fn drives(&self) -> &[String] {
		&self.drives
	}

	/// Command names as the sensor advertised them.
	pub fn supported_commands(&self) -> &[String] {
		&self.supported_commands
	}

	/// Operator verbs backed by the advertised commands, sorted and unique.
	pub fn verbs(&self) -> Vec<&'static str> {
		let mut verbs: Vec<&'static str> = self
			.supported_commands
			.iter()
			.filter_map(|name| name.parse::<CommandName>().ok())
			.map(CommandName::verb)
			.collect();
		verbs.sort_unstable();
		verbs.dedup();
		verbs
	}

	pub fn keepalive_running(&self) -> bool {
		self.supervisor.as_ref().is_some_and(KeepAliveSupervisor::is_running)
	}
}

/// Session context passed to every operation; holds no global state.
#[derive(Debug)]
pub struct LiveResponse {
	transport: Transport,
	registry: SessionRegistry,
	dispatcher: CommandDispatcher,
	sensors: SensorDirectory,
	idle: IdleCounter,
	keepalive: KeepAliveConfig,
	attached: Option<AttachedSession>,
}

impl LiveResponse {
	/// Builds the transport and scans for stale sessions.
	pub async fn connect(config: TransportConfig) -> Result<Self> {
		let transport = Transport::new(config)?;
		Self::with_transport(transport).await
	}

	pub async fn with_transport(transport: Transport) -> Result<Self> {
		let registry = SessionRegistry::new(transport.clone()).await?;
		let idle = IdleCounter::new();
		Ok(Self {
			dispatcher: CommandDispatcher::new(transport.clone(), idle.clone()),
			sensors: SensorDirectory::new(transport.clone()),
			transport,
			registry,
			idle,
			keepalive: KeepAliveConfig::default(),
			attached: None,
		})
	}

	/// Overrides keep-alive timing for subsequent attaches.
	pub fn with_keepalive(mut self, config: KeepAliveConfig) -> Self {
		self.keepalive = config;
		self
	}

	pub fn transport(&self) -> &Transport {
		&self.transport
	}

	pub fn registry(&self) -> &SessionRegistry {
		&self.registry
	}

	pub fn sensors(&self) -> &SensorDirectory {
		&self.sensors
	}

	pub fn attached(&self) -> Option<&AttachedSession> {
		self.attached.as_ref()
	}

	pub fn session_id(&self) -> Option<SessionId> {
		self.attached.as_ref().map(AttachedSession::id)
	}

	pub fn is_attached(&self) -> bool {
		self.attached.is_some()
	}

	pub async fn list_sessions(&self, include_stale: bool) -> Result<Vec<Session>> {
		self.registry.list_sessions(include_stale).await
	}

	pub async fn create_session(&self, sensor_id: u64, timeout_secs: Option<u64>) -> Result<Session> {
		self.registry.create_session(sensor_id, timeout_secs).await
	}

	pub async fn close_session(&self, id: SessionId) -> Result<()> {
		self.registry.close_session(id).await
	}

	/// Attaches to `id` and starts the keep-alive task.
	///
	/// A session absent from the listing fails at once with
	/// [`Error::SessionNotFound`]. A pending session fails with
	/// [`Error::SessionNotActive`], immediately or, when waiting, once the
	/// wait budget has elapsed.
	pub async fn attach(&mut self, id: SessionId, options: AttachOptions) -> Result<&AttachedSession> {
		if let Some(current) = &self.attached {
			return Err(Error::AlreadyAttached(current.id));
		}

		let started = Instant::now();
		let session = loop {
			let sessions = self.registry.list_sessions(true).await?;
			let mut pending = false;
			let mut active = None;
			for session in sessions.into_iter().filter(|s| s.id == id) {
				match session.status {
					SessionStatus::Active => {
						active = Some(session);
						break;
					}
					SessionStatus::Pending => pending = true,
					_ => {}
				}
			}

			if let Some(session) = active {
				break session;
			}
			if !pending {
				return Err(Error::SessionNotFound(id));
			}
			if !options.wait_for_active || started.elapsed() >= options.wait_timeout {
				return Err(Error::SessionNotActive(id));
			}

			debug!(target: "cblr.session", session = id, elapsed_ms = started.elapsed().as_millis() as u64, "session pending; waiting");
			tokio::time::sleep(options.poll_interval).await;
		};

		let cwd = session
			.current_working_directory
			.as_deref()
			.or(session.drives.first().map(String::as_str))
			.map(path::trim_trailing_separator)
			.unwrap_or(FALLBACK_CWD)
			.to_string();

		let supervisor = KeepAliveSupervisor::spawn(self.transport.clone(), id, self.idle.clone(), self.keepalive);
		info!(target: "cblr.session", session = id, cwd = %cwd, "attached");

		let attached = AttachedSession {
			id,
			cwd,
			drives: session.drives,
			supported_commands: session.supported_commands,
			supervisor: Some(supervisor),
		};
		Ok(&*self.attached.insert(attached))
	}

	/// Stops the keep-alive task, waits for it, then clears session state.
	pub async fn detach(&mut self) -> Result<SessionId> {
		let attached = self.attached.as_mut().ok_or(Error::NotAttached)?;
		if let Some(supervisor) = attached.supervisor.take() {
			supervisor.stop().await;
		}

		let id = attached.id;
		self.attached = None;
		info!(target: "cblr.session", session = id, "detached");
		Ok(id)
	}

	/// Pseudo working directory for display (`C:` shows as `C:\`).
	pub fn pwd(&self) -> Result<String> {
		Ok(path::display(self.require_attached()?.cwd()))
	}

	/// Resolves a user path against the pseudo working directory.
	pub fn resolve(&self, user_path: &str) -> Result<String> {
		Ok(path::resolve(self.require_attached()?.cwd(), user_path))
	}

	/// Changes the pseudo working directory after checking the target is a
	/// directory on the sensor. Returns the new directory.
	///
	/// Any outcome other than an existing directory leaves the working
	/// directory unchanged and fails with [`Error::PathNotFound`].
	pub async fn change_directory(&mut self, user_path: &str, cancel: &CancellationToken) -> Result<String> {
		let target = path::normalize(&self.resolve(user_path)?);

		match self.stat_resolved(&target, cancel).await {
			Ok(PathStat::Directory) => {}
			Ok(_) => return Err(Error::PathNotFound(target)),
			Err(err) if err.is_cancellation() => return Err(err),
			Err(err) => {
				debug!(target: "cblr.session", path = %target, error = %err, "directory probe failed");
				return Err(Error::PathNotFound(target));
			}
		}

		let cwd = path::trim_trailing_separator(&target).to_string();
		let attached = self.attached.as_mut().ok_or(Error::NotAttached)?;
		attached.cwd = cwd;
		Ok(path::display(&attached.cwd))
	}

	/// Classifies a user path on the sensor.
	pub async fn stat(&self, user_path: &str, cancel: &CancellationToken) -> Result<PathStat> {
		let target = self.resolve(user_path)?;
		self.stat_resolved(&target, cancel).await
	}

	/// Submits any command to the attached session and waits for it.
	pub async fn execute(&self, request: CommandRequest, cancel: &CancellationToken) -> Result<CommandResult> {
		let id = self.require_attached()?.id;
		self.dispatcher.submit_and_await(id, request, cancel).await
	}

	async fn stat_resolved(&self, target: &str, cancel: &CancellationToken) -> Result<PathStat> {
		let id = self.require_attached()?.id;
		self.dispatcher.stat(id, target, cancel).await
	}

	fn require_attached(&self) -> Result<&AttachedSession> {
		self.attached.as_ref().ok_or(Error::NotAttached)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attached(commands: &[&str]) -> AttachedSession {
		AttachedSession {
			id: 1,
			cwd: "C:\\Windows".to_string(),
			drives: vec!["C:\\".to_string()],
			supported_commands: commands.iter().map(|c| c.to_string()).collect(),
			supervisor: None,
		}
	}

	#[test]
	fn verbs_collapse_registry_commands_and_skip_unknown_names() {
		let session = attached(&["reg enum key", "reg set value", "process list", "directory list", "teleport"]);
		assert_eq!(session.verbs(), vec!["dir", "ps", "reg"]);
	}

	#[test]
	fn session_without_supervisor_reports_keepalive_stopped() {
		assert!(!attached(&[]).keepalive_running());
	}

	#[test]
	fn waiting_options_keep_default_budget() {
		let options = AttachOptions::waiting();
		assert!(options.wait_for_active);
		assert_eq!(options.wait_timeout, DEFAULT_ATTACH_TIMEOUT);
		assert_eq!(options.poll_interval, Duration::from_secs(1));
	}
}
