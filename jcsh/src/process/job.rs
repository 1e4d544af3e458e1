use anyhow::Result;
use jcsh_types::{Context, ExitStatus, JcshError, JcshResult};
use nix::sys::signal::Signal;
use tracing::{debug, warn};

use super::fork::fork_process;
use super::process::Process;
use super::redirect::Redirect;
use super::signal::{print_notices, send_signal};
use super::wait::wait_foreground;
use crate::shell::Shell;

pub const BACKGROUND_MARKER: &str = "&";

/// A classified command, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub cmd: String,
    pub process: Process,
    pub foreground: bool,
    /// A trailing `&` was present, whether or not it was honored.
    pub background_requested: bool,
}

impl Job {
    /// Decides foreground/background and extracts redirections.
    ///
    /// A trailing `&` is always stripped; it only makes the job background
    /// when foreground-only mode is off.
    pub fn classify(mut argv: Vec<String>, foreground_only: bool) -> JcshResult<Job> {
        let cmd = argv.join(" ");
        let background_requested = argv.last().is_some_and(|t| t == BACKGROUND_MARKER);
        if background_requested {
            argv.pop();
        }
        let foreground = !background_requested || foreground_only;

        let (argv, redirects) = Redirect::parse(argv, !foreground);
        if argv.is_empty() {
            return Err(JcshError::Parse(format!("missing command: {cmd}")));
        }

        debug!(
            "classified '{}' foreground:{} background_requested:{} foreground_only:{}",
            cmd, foreground, background_requested, foreground_only
        );
        Ok(Job {
            cmd,
            process: Process::new(argv, redirects, foreground),
            foreground,
            background_requested,
        })
    }

    /// Spawns the job. Foreground jobs are waited for and their result is
    /// stored on the shell; background jobs are registered in its job table.
    pub fn launch(&mut self, ctx: &Context, shell: &mut Shell) -> Result<ExitStatus> {
        if !self.foreground && shell.jobs.is_full() {
            warn!("refusing background launch of '{}': job table full", self.cmd);
            return Err(JcshError::JobTableFull {
                capacity: shell.jobs.capacity(),
            }
            .into());
        }

        let pid = fork_process(&self.process)?;
        self.process.pid = Some(pid);

        if self.foreground {
            let flags = shell.signals.clone();
            let termination = wait_foreground(pid, || print_notices(&flags))?;
            print_notices(&flags);
            debug!("foreground '{}' ended: {}", self.cmd, termination);
            shell.last_foreground = termination;
            return Ok(ExitStatus::ExitedWith(termination.code()));
        }

        if let Err(err) = shell.jobs.add(pid) {
            // never leave an untracked child behind
            warn!("could not track pid {}: {}; killing it", pid, err);
            let _ = send_signal(pid, Signal::SIGKILL);
            let _ = wait_foreground(pid, || {});
            return Err(err.into());
        }
        ctx.write_stdout(&format!("background pid is {pid}"))?;
        Ok(ExitStatus::Running(pid))
    }
}
