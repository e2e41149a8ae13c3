mod common;

use std::time::Duration;

use cblr::{Error, Transport, TransportConfig};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TOKEN;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn requests_carry_the_api_token() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/v1/cblr/session"))
		.and(header("X-Auth-Token", TOKEN))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.expect(1)
		.mount(&server)
		.await;

	let sessions: Value = common::transport(&server).get_json("/api/v1/cblr/session", &[]).await.unwrap();
	assert_eq!(sessions, json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_200_status_reports_status_and_body() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/v1/cblr/session/9"))
		.respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
		.mount(&server)
		.await;

	let err = common::transport(&server).get_json::<Value>("/api/v1/cblr/session/9", &[]).await.unwrap_err();
	match err {
		Error::RemoteRequest { url, status, body } => {
			assert!(url.ends_with("/api/v1/cblr/session/9"));
			assert_eq!(status, 404);
			assert_eq!(body, "no such session");
		}
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn created_status_is_still_an_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
		.mount(&server)
		.await;

	let err = common::transport(&server).post_json::<_, Value>("/api/v1/cblr/session", &json!({})).await.unwrap_err();
	assert_eq!(err.status(), Some(201));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn undecodable_body_is_malformed_response() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
		.mount(&server)
		.await;

	let err = common::transport(&server).get_json::<Value>("/api/v1/cblr/session", &[]).await.unwrap_err();
	assert!(matches!(err, Error::MalformedResponse { .. }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_reply_is_remote_timeout() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(5)))
		.mount(&server)
		.await;

	let transport = Transport::new(TransportConfig::new(server.uri(), TOKEN).with_request_timeout(Duration::from_millis(200))).unwrap();
	let err = transport.get_json::<Value>("/api/v1/cblr/session", &[]).await.unwrap_err();
	assert!(matches!(err, Error::RemoteTimeout { .. }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exchanges_are_appended_to_the_audit_log() {
	let server = MockServer::start().await;
	Mock::given(method("PUT"))
		.and(path("/api/v1/cblr/session/3"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "status": "close" })))
		.mount(&server)
		.await;

	let dir = tempfile::tempdir().unwrap();
	let log = dir.path().join("logs").join("http_cblr.log");
	let transport = Transport::new(TransportConfig::new(server.uri(), TOKEN).with_audit_log(Some(log.clone()))).unwrap();
	let _: Value = transport.put_json("/api/v1/cblr/session/3", &json!({ "id": 3, "status": "close" })).await.unwrap();

	let contents = std::fs::read_to_string(&log).unwrap();
	assert!(contents.contains("PUT (url: "), "{contents}");
	assert!(contents.contains("/api/v1/cblr/session/3"));
	assert!(contents.contains("\"status\":\"close\""));
	assert!(contents.trim_end().ends_with("^^^^^^^^^^^^^^^^^^^^^^^^^"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn trailing_slash_on_base_url_is_ignored() {
	let server = MockServer::start().await;
	let transport = Transport::new(TransportConfig::new(format!("{}/", server.uri()), TOKEN)).unwrap();
	assert_eq!(transport.url("/api/v1/sensor"), format!("{}/api/v1/sensor", server.uri()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn binary_downloads_are_returned_as_sent_with_or_without_audit_log() {
	let server = MockServer::start().await;
	let content = vec![0x4d, 0x5a, 0x90, 0x00, 0xff, 0xfe];
	Mock::given(method("GET"))
		.and(path("/api/v1/cblr/session/3/archive"))
		.respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
		.expect(2)
		.mount(&server)
		.await;

	let plain = Transport::new(TransportConfig::new(server.uri(), TOKEN)).unwrap();
	assert_eq!(plain.get_bytes("/api/v1/cblr/session/3/archive").await.unwrap(), content);

	let dir = tempfile::tempdir().unwrap();
	let log = dir.path().join("http_cblr.log");
	let audited = Transport::new(TransportConfig::new(server.uri(), TOKEN).with_audit_log(Some(log.clone()))).unwrap();
	assert_eq!(audited.get_bytes("/api/v1/cblr/session/3/archive").await.unwrap(), content);

	let contents = std::fs::read_to_string(&log).unwrap();
	assert!(contents.contains("MZ\u{FFFD}"), "{contents:?}");
}
