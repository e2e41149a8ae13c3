mod common;

use std::time::{Duration, Instant};

use cblr::{IdleCounter, KeepAliveConfig, KeepAliveSupervisor};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::SESSION_ID;

fn keepalive_path() -> String {
	format!("/api/v1/cblr/session/{SESSION_ID}/keepalive")
}

fn fast() -> KeepAliveConfig {
	KeepAliveConfig {
		tick: Duration::from_millis(20),
		ticks_per_ping: 3,
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn idle_session_is_pinged_every_threshold() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(keepalive_path()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
		.mount(&server)
		.await;

	let supervisor = KeepAliveSupervisor::spawn(common::transport(&server), SESSION_ID, IdleCounter::new(), fast());
	tokio::time::sleep(Duration::from_millis(400)).await;
	supervisor.stop().await;

	let pings = common::requests_to(&server, "GET", &keepalive_path()).await;
	assert!(pings >= 2, "expected repeated pings, saw {pings}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn busy_session_is_not_pinged() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(keepalive_path()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(0)
		.mount(&server)
		.await;

	let idle = IdleCounter::new();
	let supervisor = KeepAliveSupervisor::spawn(common::transport(&server), SESSION_ID, idle.clone(), fast());
	for _ in 0..15 {
		idle.reset();
		tokio::time::sleep(Duration::from_millis(20)).await;
	}
	supervisor.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_pings_do_not_stop_the_loop() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(keepalive_path()))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;

	let supervisor = KeepAliveSupervisor::spawn(common::transport(&server), SESSION_ID, IdleCounter::new(), fast());
	tokio::time::sleep(Duration::from_millis(400)).await;
	assert!(supervisor.is_running());
	supervisor.stop().await;

	assert!(common::requests_to(&server, "GET", &keepalive_path()).await >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_returns_promptly_during_a_slow_ping() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(keepalive_path()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})).set_delay(Duration::from_secs(30)))
		.mount(&server)
		.await;

	let config = KeepAliveConfig {
		tick: Duration::from_millis(20),
		ticks_per_ping: 1,
	};
	let supervisor = KeepAliveSupervisor::spawn(common::transport(&server), SESSION_ID, IdleCounter::new(), config);
	tokio::time::sleep(Duration::from_millis(150)).await;

	let started = Instant::now();
	supervisor.stop().await;
	assert!(started.elapsed() < Duration::from_secs(2), "stop took {:?}", started.elapsed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn no_pings_after_stop() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(keepalive_path()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	let supervisor = KeepAliveSupervisor::spawn(common::transport(&server), SESSION_ID, IdleCounter::new(), fast());
	tokio::time::sleep(Duration::from_millis(200)).await;
	supervisor.stop().await;

	let after_stop = common::requests_to(&server, "GET", &keepalive_path()).await;
	tokio::time::sleep(Duration::from_millis(200)).await;
	assert_eq!(common::requests_to(&server, "GET", &keepalive_path()).await, after_stop);
}
