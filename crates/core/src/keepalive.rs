//! Background keep-alive for an attached session.
//!
//! The control plane expires sessions that see no traffic. While attached, a
//! task counts idle ticks and pings the session's keep-alive endpoint each
//! time the counter reaches the threshold. Command submissions reset the
//! counter through a shared [`IdleCounter`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cblr_protocol::{SessionId, routes};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::transport::Transport;

/// Timing of the keep-alive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveConfig {
	/// Wait between idle-counter increments; also bounds stop latency.
	pub tick: Duration,
	/// Idle ticks between pings.
	pub ticks_per_ping: u32,
}

impl Default for KeepAliveConfig {
	fn default() -> Self {
		Self {
			tick: Duration::from_secs(1),
			ticks_per_ping: 60,
		}
	}
}

/// Idle tick count shared between the foreground and the keep-alive task.
#[derive(Debug, Clone, Default)]
pub struct IdleCounter(Arc<AtomicU32>);

impl IdleCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks activity on the session.
	pub fn reset(&self) {
		self.0.store(0, Ordering::SeqCst);
	}

	pub fn get(&self) -> u32 {
		self.0.load(Ordering::SeqCst)
	}

	fn tick(&self) -> u32 {
		self.0.fetch_add(1, Ordering::SeqCst) + 1
	}
}

/// Handle to a running keep-alive task.
///
/// [`stop`](Self::stop) signals the task and waits for it to exit. Dropping
/// the handle only signals.
#[derive(Debug)]
pub struct KeepAliveSupervisor {
	session_id: SessionId,
	stop: CancellationToken,
	handle: Option<JoinHandle<()>>,
}

impl KeepAliveSupervisor {
	/// Starts pinging `session_id`. Must be called within a Tokio runtime.
	pub fn spawn(transport: Transport, session_id: SessionId, idle: IdleCounter, config: KeepAliveConfig) -> Self {
		idle.reset();
		let stop = CancellationToken::new();
		let handle = tokio::spawn(keepalive_loop(transport, session_id, idle, config, stop.clone()));
		debug!(target: "cblr.keepalive", session = session_id, "keep-alive started");
		Self {
			session_id,
			stop,
			handle: Some(handle),
		}
	}

	pub fn session_id(&self) -> SessionId {
		self.session_id
	}

	pub fn is_running(&self) -> bool {
		self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
	}

	/// Signals the task and waits until it has exited.
	pub async fn stop(mut self) {
		self.stop.cancel();
		if let Some(handle) = self.handle.take() {
			if let Err(err) = handle.await {
				warn!(target: "cblr.keepalive", session = self.session_id, error = %err, "keep-alive task ended abnormally");
			}
		}
		debug!(target: "cblr.keepalive", session = self.session_id, "keep-alive stopped");
	}
}

impl Drop for KeepAliveSupervisor {
	fn drop(&mut self) {
		self.stop.cancel();
	}
}

async fn keepalive_loop(transport: Transport, session_id: SessionId, idle: IdleCounter, config: KeepAliveConfig, stop: CancellationToken) {
	let path = routes::keepalive(session_id);
	let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + config.tick, config.tick);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			biased;
			_ = stop.cancelled() => break,
			_ = ticker.tick() => {}
		}

		if idle.tick() < config.ticks_per_ping {
			continue;
		}
		idle.reset();

		// A slow ping must not delay shutdown.
		tokio::select! {
			biased;
			_ = stop.cancelled() => break,
			result = transport.get_json::<Value>(&path, &[]) => match result {
				Ok(_) => trace!(target: "cblr.keepalive", session = session_id, "keep-alive sent"),
				// The foreground surfaces a really expired session on its next command.
				Err(err) => debug!(target: "cblr.keepalive", session = session_id, error = %err, "keep-alive failed"),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn idle_counter_is_shared_between_clones() {
		let counter = IdleCounter::new();
		let clone = counter.clone();
		assert_eq!(clone.tick(), 1);
		assert_eq!(clone.tick(), 2);
		assert_eq!(counter.get(), 2);
		counter.reset();
		assert_eq!(clone.get(), 0);
	}

	#[test]
	fn default_pings_once_a_minute() {
		let config = KeepAliveConfig::default();
		assert_eq!(config.tick * config.ticks_per_ping, Duration::from_secs(60));
	}
}
