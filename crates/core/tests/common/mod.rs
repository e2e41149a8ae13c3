//! Control plane fixtures shared by the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use cblr::{KeepAliveConfig, LiveResponse, Transport, TransportConfig};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const SESSION_ID: u64 = 42;

pub fn transport(server: &MockServer) -> Transport {
	Transport::new(TransportConfig::new(server.uri(), TOKEN)).unwrap()
}

pub fn session(id: u64, status: &str) -> Value {
	json!({
		"id": id,
		"status": status,
		"sensor_id": 7,
		"session_timeout": 900,
		"current_working_directory": "C:\\Windows\\",
		"drives": ["C:\\", "D:\\"],
		"supported_commands": ["directory list", "get file", "put file", "create process", "process list", "reg enum key"],
		"hostname": "WS-01"
	})
}

pub async fn mount_sessions(server: &MockServer, sessions: Value) {
	Mock::given(method("GET"))
		.and(path("/api/v1/cblr/session"))
		.respond_with(ResponseTemplate::new(200).set_body_json(sessions))
		.mount(server)
		.await;
}

/// Accepts a command whose `object` matches and resolves it with `result`.
pub async fn mount_command(server: &MockServer, object: &str, command_id: u64, result: Value) {
	Mock::given(method("POST"))
		.and(path(format!("/api/v1/cblr/session/{SESSION_ID}/command")))
		.and(body_partial_json(json!({ "object": object })))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": command_id, "status": "pending" })))
		.mount(server)
		.await;

	let mut result = result;
	result["id"] = json!(command_id);
	Mock::given(method("GET"))
		.and(path(format!("/api/v1/cblr/session/{SESSION_ID}/command/{command_id}")))
		.and(query_param("wait", "true"))
		.respond_with(ResponseTemplate::new(200).set_body_json(result))
		.mount(server)
		.await;
}

pub fn directory(name: &str) -> Value {
	json!({ "result_code": 0, "files": [{ "filename": name, "attributes": ["DIRECTORY"], "size": 0, "create_time": 0 }] })
}

pub fn file(name: &str) -> Value {
	json!({ "result_code": 0, "files": [{ "filename": name, "attributes": ["ARCHIVE"], "size": 12, "create_time": 0 }] })
}

/// Keep-alive timing slow enough to stay out of request counts.
pub fn quiet_keepalive() -> KeepAliveConfig {
	KeepAliveConfig {
		tick: Duration::from_secs(3600),
		ticks_per_ping: 60,
	}
}

/// Engine attached to an active [`SESSION_ID`].
pub async fn attached(server: &MockServer) -> LiveResponse {
	mount_sessions(server, json!([session(SESSION_ID, "active")])).await;
	let mut lr = LiveResponse::with_transport(transport(server)).await.unwrap().with_keepalive(quiet_keepalive());
	lr.attach(SESSION_ID, Default::default()).await.unwrap();
	lr
}

pub async fn requests_to(server: &MockServer, http_method: &str, endpoint: &str) -> usize {
	server
		.received_requests()
		.await
		.unwrap_or_default()
		.iter()
		.filter(|request| request.method.as_str() == http_method && request.url.path() == endpoint)
		.count()
}
