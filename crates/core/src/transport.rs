//! Authenticated HTTP transport for the control plane.
//!
//! Every request carries the API token header and fails with a typed
//! [`Error`] when the control plane answers with anything but 200, when the
//! request deadline elapses, or when a JSON body cannot be decoded.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cblr_protocol::AUTH_HEADER;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::audit::AuditLog;
use crate::error::{Error, Result};

/// Default deadline for a single request, including server-side command waits.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
	/// Control plane base URL, e.g. `https://cb.example.com:8443`.
	pub base_url: String,
	/// API token sent with every request.
	pub token: String,
	pub request_timeout: Duration,
	/// Skip TLS certificate verification.
	pub accept_invalid_certs: bool,
	/// Append request/response records to this file.
	pub audit_log: Option<PathBuf>,
}

impl TransportConfig {
	pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			token: token.into(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			accept_invalid_certs: false,
			audit_log: None,
		}
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
		self.accept_invalid_certs = accept;
		self
	}

	pub fn with_audit_log(mut self, path: Option<PathBuf>) -> Self {
		self.audit_log = path;
		self
	}
}

/// Cheaply cloneable handle; clones share one connection pool and audit log.
#[derive(Clone)]
pub struct Transport {
	inner: Arc<Inner>,
}

struct Inner {
	client: Client,
	base_url: String,
	token: String,
	audit: AuditLog,
}

impl std::fmt::Debug for Transport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Transport")
			.field("base_url", &self.inner.base_url)
			.field("audit_log", &self.inner.audit.path())
			.finish_non_exhaustive()
	}
}

impl Transport {
	pub fn new(config: TransportConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(config.request_timeout)
			.danger_accept_invalid_certs(config.accept_invalid_certs)
			.build()
			.map_err(Error::Http)?;

		let audit = match &config.audit_log {
			Some(path) => AuditLog::open(path),
			None => AuditLog::disabled(),
		};

		Ok(Self {
			inner: Arc::new(Inner {
				client,
				base_url: config.base_url.trim_end_matches('/').to_string(),
				token: config.token,
				audit,
			}),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.inner.base_url
	}

	/// Absolute URL for an endpoint path.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.inner.base_url, path)
	}

	/// `GET` and decode a JSON body.
	pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
		let url = self.url(path);
		let request = self.request(Method::GET, &url).query(query);
		let body = self.send("GET", &url, request, None).await?;
		decode(&url, &body)
	}

	/// `GET` raw bytes (file content, archives).
	pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
		let url = self.url(path);
		let request = self.request(Method::GET, &url);
		self.send("GET", &url, request, None).await
	}

	/// `PUT` a JSON body and decode the JSON reply.
	pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let url = self.url(path);
		let data = encode(body);
		let request = self.request(Method::PUT, &url).json(body);
		let reply = self.send("PUT", &url, request, Some(&data)).await?;
		decode(&url, &reply)
	}

	/// `POST` a JSON body and decode the JSON reply.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let url = self.url(path);
		let data = encode(body);
		let request = self.request(Method::POST, &url).json(body);
		let reply = self.send("POST", &url, request, Some(&data)).await?;
		decode(&url, &reply)
	}

	/// `POST` a multipart upload with a single `file` part.
	pub async fn post_file<T: DeserializeOwned>(&self, path: &str, file_name: &str, content: Vec<u8>) -> Result<T> {
		let url = self.url(path);
		let data = format!("file: {file_name} ({} bytes)", content.len());
		let form = Form::new().part("file", Part::bytes(content).file_name(file_name.to_string()));
		let request = self.request(Method::POST, &url).multipart(form);
		let reply = self.send("POST", &url, request, Some(&data)).await?;
		decode(&url, &reply)
	}

	fn request(&self, method: Method, url: &str) -> RequestBuilder {
		self.inner.client.request(method, url).header(AUTH_HEADER, &self.inner.token)
	}

	async fn send(&self, method: &str, url: &str, request: RequestBuilder, data: Option<&str>) -> Result<Vec<u8>> {
		debug!(target: "cblr.transport", method, url, "sending request");
		let result = execute(url, request).await;

		if self.inner.audit.is_enabled() {
			let outcome = match &result {
				Ok(body) => String::from_utf8_lossy(body),
				Err(err) => format!("ERROR: {err}").into(),
			};
			self.inner.audit.exchange(method, url, data, &outcome);
		}

		match &result {
			Ok(body) => debug!(target: "cblr.transport", method, url, bytes = body.len(), "request succeeded"),
			Err(err) => debug!(target: "cblr.transport", method, url, error = %err, "request failed"),
		}
		result
	}
}

async fn execute(url: &str, request: RequestBuilder) -> Result<Vec<u8>> {
	let response = request.send().await.map_err(|err| classify(url, err))?;
	let status = response.status();
	let body = response.bytes().await.map_err(|err| classify(url, err))?;

	if status != StatusCode::OK {
		return Err(Error::RemoteRequest {
			url: url.to_string(),
			status: status.as_u16(),
			body: String::from_utf8_lossy(&body).into_owned(),
		});
	}

	Ok(body.to_vec())
}

fn classify(url: &str, err: reqwest::Error) -> Error {
	if err.is_timeout() {
		Error::RemoteTimeout { url: url.to_string() }
	} else {
		Error::Http(err)
	}
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T> {
	serde_json::from_slice(body).map_err(|source| Error::MalformedResponse {
		url: url.to_string(),
		source,
	})
}

fn encode<B: Serialize + ?Sized>(body: &B) -> String {
	serde_json::to_string(body).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}
