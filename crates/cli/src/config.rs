//! Startup configuration: flags, environment and the JSON config file merged
//! into one [`Settings`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cblr::{DEFAULT_REQUEST_TIMEOUT, TransportConfig};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::Cli;

pub const CONFIG_FILE: &str = "config.json";
pub const HTTP_LOG_FILE: &str = "http_cblr.log";

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
	pub url: Option<String>,
	pub token: Option<String>,
	pub http_log: Option<HttpLog>,
	pub insecure: Option<bool>,
	pub timeout_secs: Option<u64>,
}

/// `"http_log": false`, `true` (default location) or a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpLog {
	Enabled(bool),
	Path(PathBuf),
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	pub base_url: String,
	pub token: String,
	pub http_log: Option<PathBuf>,
	pub insecure: bool,
	pub timeout: Duration,
}

impl Settings {
	pub fn resolve(cli: &Cli) -> Result<Self> {
		let dir = config_dir();
		let file = match &cli.config {
			Some(path) => load(path)?,
			None => match dir.as_ref().map(|d| d.join(CONFIG_FILE)) {
				Some(path) if path.exists() => load(&path)?,
				_ => FileConfig::default(),
			},
		};
		Self::merge(cli, file, dir.as_deref())
	}

	/// Applies flag/env values from `cli` over `file`. `dir` hosts the default
	/// HTTP log.
	pub fn merge(cli: &Cli, file: FileConfig, dir: Option<&Path>) -> Result<Self> {
		let Some(url) = cli.url.clone().or(file.url) else {
			bail!("no control plane URL; pass --url, set CBLR_URL or add \"url\" to the config file");
		};
		let Some(token) = cli.token.clone().or(file.token) else {
			bail!("no API token; pass --token, set CBLR_TOKEN or add \"token\" to the config file");
		};

		let http_log = if cli.no_http_log {
			None
		} else if let Some(path) = &cli.http_log {
			Some(path.clone())
		} else {
			match file.http_log {
				Some(HttpLog::Enabled(false)) => None,
				Some(HttpLog::Path(path)) => Some(path),
				Some(HttpLog::Enabled(true)) | None => dir.map(|d| d.join(HTTP_LOG_FILE)),
			}
		};

		let timeout = cli
			.timeout
			.or(file.timeout_secs)
			.map(Duration::from_secs)
			.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
		if timeout.is_zero() {
			bail!("request timeout must be at least one second");
		}

		Ok(Self {
			base_url: normalize_base_url(&url)?,
			token,
			http_log,
			insecure: cli.insecure || file.insecure.unwrap_or(false),
			timeout,
		})
	}

	pub fn transport_config(&self) -> TransportConfig {
		TransportConfig::new(&self.base_url, &self.token)
			.with_request_timeout(self.timeout)
			.with_accept_invalid_certs(self.insecure)
			.with_audit_log(self.http_log.clone())
	}
}

/// `<config dir>/cblr`, if the platform has a config directory.
pub fn config_dir() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("cblr"))
}

fn load(path: &Path) -> Result<FileConfig> {
	let content = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Validates a control plane address. A bare `host[:port]` is taken as HTTPS.
pub fn normalize_base_url(input: &str) -> Result<String> {
	let input = input.trim();
	let candidate = if input.contains("://") { input.to_string() } else { format!("https://{input}") };

	let url = Url::parse(&candidate).with_context(|| format!("invalid control plane URL {input:?}"))?;
	if !matches!(url.scheme(), "http" | "https") {
		bail!("unsupported URL scheme {:?}", url.scheme());
	}
	if url.host_str().is_none_or(str::is_empty) {
		bail!("control plane URL {input:?} has no host");
	}
	Ok(url.as_str().trim_end_matches('/').to_string())
}
