//! Endpoint paths relative to the control plane base URL.

use crate::session::SessionId;

pub const SESSIONS: &str = "/api/v1/cblr/session";
pub const SENSORS: &str = "/api/v1/sensor";

pub fn session(id: SessionId) -> String {
	format!("{SESSIONS}/{id}")
}

pub fn keepalive(id: SessionId) -> String {
	format!("{SESSIONS}/{id}/keepalive")
}

pub fn commands(id: SessionId) -> String {
	format!("{SESSIONS}/{id}/command")
}

pub fn command(id: SessionId, command_id: u64) -> String {
	format!("{SESSIONS}/{id}/command/{command_id}")
}

pub fn files(id: SessionId) -> String {
	format!("{SESSIONS}/{id}/file")
}

pub fn file_content(id: SessionId, file_id: u64) -> String {
	format!("{SESSIONS}/{id}/file/{file_id}/content")
}

pub fn archive(id: SessionId) -> String {
	format!("{SESSIONS}/{id}/archive")
}

pub fn sensor(id: u64) -> String {
	format!("{SENSORS}/{id}")
}
