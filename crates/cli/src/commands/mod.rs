//! Console verbs: argument parsing and dispatch to the handlers.

mod fs;
mod process;
mod reg;
mod session;

use std::path::PathBuf;

use cblr::{CancellationToken, LiveResponse};
use clap::{Args, Parser, Subcommand};

pub use self::reg::{RegAction, RegArgs};
use crate::cli::cli_styles;
use crate::error::Result;

/// One console line after lexing.
#[derive(Parser, Debug, PartialEq)]
#[command(no_binary_name = true, disable_version_flag = true, styles = cli_styles())]
#[command(override_usage = "<VERB> [ARGS]...")]
pub struct VerbLine {
	#[command(subcommand)]
	pub verb: Verb,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Verb {
	/// List sessions, or create/close one
	Session(SessionArgs),
	/// Look up a sensor by id or hostname
	Sensor(SensorArgs),
	/// Attach to a session
	Attach(AttachArgs),
	/// Detach from the current session
	Detach,
	/// Print the working directory
	Pwd,
	/// Change the working directory
	Cd { path: String },
	/// List a directory (default: working directory)
	Dir { path: Option<String> },
	/// Create a directory
	Mkdir { path: String },
	/// Delete a file
	Del { path: String },
	/// Copy a file from the sensor
	Get(GetArgs),
	/// Copy a local file to the sensor
	Put { local: PathBuf, remote: String },
	/// List files staged for this session
	Files,
	/// Download the session archive
	Archive {
		out: PathBuf,
		/// Session to archive when not attached
		session: Option<u64>,
	},
	/// List processes
	Ps(PsArgs),
	/// Start a process
	Exec(ExecArgs),
	/// Terminate a process
	Kill { pid: u64 },
	/// Edit or query the registry
	Reg(RegArgs),
	/// Write a full memory dump on the sensor
	Memdump { path: String },
	/// Detach and leave the console
	#[command(alias = "quit")]
	Exit,
}

#[derive(Args, Debug, PartialEq)]
pub struct SessionArgs {
	/// Close the given session
	#[arg(short = 'q', long = "quit", value_name = "ID", conflicts_with = "create")]
	pub quit: Option<u64>,
	/// Create a session on the given sensor
	#[arg(short = 'c', long, value_name = "SENSOR_ID")]
	pub create: Option<u64>,
	/// Session timeout for --create
	#[arg(short = 't', long, value_name = "SECS", requires = "create")]
	pub timeout: Option<u64>,
	/// Include sessions that were already closed at startup
	#[arg(short = 'a', long)]
	pub all: bool,
}

#[derive(Args, Debug, PartialEq)]
pub struct SensorArgs {
	/// Search by hostname instead of resolving one sensor
	#[arg(short = 's', long)]
	pub search: bool,
	/// Sensor id or hostname
	pub query: String,
}

#[derive(Args, Debug, PartialEq)]
pub struct AttachArgs {
	/// Wait for a pending session to become active
	#[arg(short = 'w', long)]
	pub wait: bool,
	/// Wait budget in seconds
	#[arg(long, value_name = "SECS", default_value_t = 300)]
	pub timeout: u64,
	pub id: u64,
}

#[derive(Args, Debug, PartialEq)]
pub struct GetArgs {
	pub remote: String,
	pub local: PathBuf,
	/// Start reading at this byte offset
	#[arg(long, value_name = "N", default_value_t = 0)]
	pub offset: u64,
	/// Read at most N bytes
	#[arg(long = "bytes", value_name = "N")]
	pub count: Option<u64>,
}

#[derive(Args, Debug, PartialEq)]
pub struct PsArgs {
	/// Show every field
	#[arg(short = 'v', long)]
	pub verbose: bool,
	/// Only this pid
	#[arg(short = 'p', long)]
	pub pid: Option<u64>,
}

#[derive(Args, Debug, PartialEq)]
pub struct ExecArgs {
	/// Sensor-side file receiving the process output
	#[arg(short = 'o', long = "output", value_name = "FILE")]
	pub output: Option<String>,
	/// Working directory (default: current)
	#[arg(short = 'd', long = "dir", value_name = "DIR")]
	pub working_dir: Option<String>,
	/// Wait for the process to exit
	#[arg(short = 'w', long)]
	pub wait: bool,
	/// Executable followed by its arguments
	#[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
	pub command: Vec<String>,
}

/// Whether the console keeps reading after a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Exit,
}

/// Runs one verb. `cancel` interrupts an outstanding sensor command.
pub async fn execute(verb: Verb, lr: &mut LiveResponse, cancel: &CancellationToken) -> Result<Flow> {
	match verb {
		Verb::Session(args) => session::session(lr, args).await?,
		Verb::Sensor(args) => session::sensor(lr, args).await?,
		Verb::Attach(args) => session::attach(lr, args).await?,
		Verb::Detach => session::detach(lr).await?,
		Verb::Pwd => fs::pwd(lr)?,
		Verb::Cd { path } => fs::cd(lr, &path, cancel).await?,
		Verb::Dir { path } => fs::dir(lr, path.as_deref(), cancel).await?,
		Verb::Mkdir { path } => fs::mkdir(lr, &path, cancel).await?,
		Verb::Del { path } => fs::del(lr, &path, cancel).await?,
		Verb::Get(args) => fs::get(lr, args, cancel).await?,
		Verb::Put { local, remote } => fs::put(lr, &local, &remote, cancel).await?,
		Verb::Files => fs::files(lr).await?,
		Verb::Archive { out, session } => fs::archive(lr, &out, session).await?,
		Verb::Memdump { path } => fs::memdump(lr, &path, cancel).await?,
		Verb::Ps(args) => process::ps(lr, args, cancel).await?,
		Verb::Exec(args) => process::exec(lr, args, cancel).await?,
		Verb::Kill { pid } => process::kill(lr, pid, cancel).await?,
		Verb::Reg(args) => reg::reg(lr, args.action, cancel).await?,
		Verb::Exit => return Ok(Flow::Exit),
	}
	Ok(Flow::Continue)
}
