//! Session discovery with stale-session suppression.
//!
//! Sessions that were already closed or timed out when the registry was
//! built are remembered and hidden from filtered listings for the rest of the
//! process. The set is never extended afterwards, so a session closed during
//! this run stays visible with its final status.

use std::collections::HashSet;

use cblr_protocol::{CreateSessionRequest, Session, SessionId, SessionStatusUpdate, routes};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::transport::Transport;

#[derive(Debug)]
pub struct SessionRegistry {
	transport: Transport,
	stale: HashSet<SessionId>,
}

impl SessionRegistry {
	/// Builds the registry, recording every session already dead at startup.
	pub async fn new(transport: Transport) -> Result<Self> {
		let mut registry = Self {
			transport,
			stale: HashSet::new(),
		};
		let sessions = registry.fetch().await?;
		registry.stale = stale_ids(&sessions);
		debug!(target: "cblr.registry", stale = registry.stale.len(), total = sessions.len(), "captured stale sessions");
		Ok(registry)
	}

	/// Ids hidden from filtered listings.
	pub fn stale_sessions(&self) -> &HashSet<SessionId> {
		&self.stale
	}

	pub fn is_stale(&self, id: SessionId) -> bool {
		self.stale.contains(&id)
	}

	/// Lists sessions known to the control plane.
	///
	/// With `include_stale == false`, sessions dead at startup are dropped.
	pub async fn list_sessions(&self, include_stale: bool) -> Result<Vec<Session>> {
		let sessions = self.fetch().await?;
		if include_stale {
			Ok(sessions)
		} else {
			Ok(without_stale(sessions, &self.stale))
		}
	}

	/// Requests a new session on `sensor_id`; the session starts `pending`.
	pub async fn create_session(&self, sensor_id: u64, timeout_secs: Option<u64>) -> Result<Session> {
		let request = CreateSessionRequest {
			sensor_id,
			session_timeout: timeout_secs,
		};
		let session: Session = self.transport.post_json(routes::SESSIONS, &request).await?;
		info!(target: "cblr.registry", session = session.id, sensor_id, "session created");
		Ok(session)
	}

	/// Asks the control plane to close `id`. Does not wait for the transition.
	pub async fn close_session(&self, id: SessionId) -> Result<()> {
		let _: Value = self.transport.put_json(&routes::session(id), &SessionStatusUpdate::close(id)).await?;
		info!(target: "cblr.registry", session = id, "session close requested");
		Ok(())
	}

	async fn fetch(&self) -> Result<Vec<Session>> {
		self.transport.get_json(routes::SESSIONS, &[]).await
	}
}

fn stale_ids(sessions: &[Session]) -> HashSet<SessionId> {
	sessions.iter().filter(|s| s.status.is_dead()).map(|s| s.id).collect()
}

fn without_stale(sessions: Vec<Session>, stale: &HashSet<SessionId>) -> Vec<Session> {
	sessions.into_iter().filter(|s| !stale.contains(&s.id)).collect()
}
