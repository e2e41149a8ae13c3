use cblr::{CancellationToken, ExecRequest, LiveResponse};

use super::{ExecArgs, PsArgs};
use crate::error::{CliError, Result};
use crate::output;

pub(super) async fn ps(lr: &LiveResponse, args: PsArgs, cancel: &CancellationToken) -> Result<()> {
	let mut processes = lr.process_list(cancel).await?;
	if let Some(pid) = args.pid {
		processes.retain(|process| process.pid == pid);
		if processes.is_empty() {
			return Err(CliError::usage(format!("no process with pid {pid}")));
		}
	}
	println!("{}", output::processes(&processes, args.verbose));
	Ok(())
}

pub(super) async fn exec(lr: &LiveResponse, args: ExecArgs, cancel: &CancellationToken) -> Result<()> {
	let mut command = args.command.into_iter();
	let executable = command.next().ok_or_else(|| CliError::usage("exec needs a command line"))?;

	let request = ExecRequest {
		executable,
		arguments: command.collect(),
		output_file: args.output,
		working_directory: args.working_dir,
		wait: args.wait,
	};
	let outcome = lr.exec(request, cancel).await?;
	println!("{}", output::exec(&outcome));
	Ok(())
}

pub(super) async fn kill(lr: &LiveResponse, pid: u64, cancel: &CancellationToken) -> Result<()> {
	lr.kill(pid, cancel).await?;
	println!("Killed {pid}");
	Ok(())
}
