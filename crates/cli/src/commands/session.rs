use std::time::Duration;

use cblr::{AttachOptions, Error, LiveResponse, SensorQuery};
use tracing::info;

use super::{AttachArgs, SensorArgs, SessionArgs};
use crate::error::{CliError, Result};
use crate::output;

pub(super) async fn session(lr: &LiveResponse, args: SessionArgs) -> Result<()> {
	if let Some(id) = args.quit {
		lr.close_session(id).await?;
		info!(target: "cblr.console", session = id, "close requested");
		for session in lr.list_sessions(false).await?.iter().filter(|s| s.id == id) {
			println!("Session: {}\n  status: {}", session.id, session.status);
		}
		return Ok(());
	}

	if let Some(sensor_id) = args.create {
		let created = lr.create_session(sensor_id, args.timeout).await?;
		println!("New Session: {}", created.id);
		return Ok(());
	}

	let sessions = lr.list_sessions(args.all).await?;
	if sessions.is_empty() {
		println!("No sessions");
	}
	for session in &sessions {
		println!("{}", output::session(session));
	}
	Ok(())
}

pub(super) async fn sensor(lr: &LiveResponse, args: SensorArgs) -> Result<()> {
	if args.search {
		let sensors = lr.sensors().search(&args.query).await?;
		if sensors.is_empty() {
			return Err(CliError::SensorNotFound(args.query));
		}
		println!("{}", output::sensor_table(&sensors));
		return Ok(());
	}

	let sensors = match lr.sensors().lookup(&SensorQuery::parse(&args.query)).await {
		Ok(sensors) if !sensors.is_empty() => sensors,
		Ok(_) | Err(Error::RemoteRequest { .. }) => return Err(CliError::SensorNotFound(args.query)),
		Err(err) => return Err(err.into()),
	};
	for sensor in &sensors {
		println!("{}\n", output::sensor(sensor));
	}
	Ok(())
}

pub(super) async fn attach(lr: &mut LiveResponse, args: AttachArgs) -> Result<()> {
	let options = AttachOptions {
		wait_for_active: args.wait,
		wait_timeout: Duration::from_secs(args.timeout),
		..AttachOptions::default()
	};
	let attached = lr.attach(args.id, options).await?;
	println!("{}", output::attached(attached));
	Ok(())
}

pub(super) async fn detach(lr: &mut LiveResponse) -> Result<()> {
	let id = lr.detach().await?;
	println!("Detached from session {id}");
	Ok(())
}
