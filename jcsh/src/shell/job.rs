use crate::errors::is_fatal;
use crate::process::{Job, ReapState, try_reap};
use crate::shell::Shell;
use anyhow::Result;
use jcsh_types::{Context, ExitStatus, Termination};
use nix::unistd::Pid;
use tracing::{debug, error, warn};

/// Launches `job`, then runs one reap sweep whether or not the launch
/// succeeded. A fatal launch error skips the sweep; the shell is going down.
pub fn launch_job(shell: &mut Shell, ctx: &Context, mut job: Job) -> Result<ExitStatus> {
    let result = job.launch(ctx, shell);
    if result.as_ref().is_err_and(is_fatal) {
        return result;
    }

    if let Err(e) = reap_one(shell, ctx) {
        error!("reap sweep failed: {}", e);
    }
    result
}

/// One non-blocking pass over the tracked background jobs, oldest first.
/// Reports and untracks at most one finished job.
pub fn reap_one(shell: &mut Shell, ctx: &Context) -> Result<Option<(Pid, Termination)>> {
    let tracked: Vec<Pid> = shell.jobs.iter().copied().collect();
    debug!("reap sweep over {} jobs", tracked.len());

    for pid in tracked {
        match try_reap(pid) {
            ReapState::Alive => continue,
            ReapState::Vanished => {
                warn!("dropping vanished background pid {}", pid);
                shell.jobs.remove(pid);
            }
            ReapState::Terminated(termination) => {
                shell.jobs.remove(pid);
                ctx.write_stdout(&format!("backround pid {pid} is done: {termination}"))?;
                return Ok(Some((pid, termination)));
            }
        }
    }
    Ok(None)
}
