use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directives for a `-v` count.
///
/// Keep-alive pings fire every idle minute for the whole attach, so they
/// stay out of `-v` and `-vv` and only show at `-vvv`.
pub fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "warn,cblr.console=info,cblr.session=info,cblr.registry=info,cblr.keepalive=warn",
		2 => "debug,cblr.keepalive=info,reqwest=info,hyper=info,hyper_util=info,rustls=info",
		_ => "trace,hyper=debug,hyper_util=debug,rustls=debug",
	}
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(verbosity > 0)
		.compact()
		.init();
}
