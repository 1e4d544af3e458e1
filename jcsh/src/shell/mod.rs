pub mod eval;
pub mod job;

use crate::process::{JobTable, SignalFlags, signal};
use anyhow::Result;
use jcsh_types::{Context, ExitStatus, Termination};
use nix::unistd::{Pid, getpid};
use std::sync::Arc;
use tracing::{debug, warn};

pub const APP_NAME: &str = "jcsh";

pub struct Shell {
    pub exited: Option<ExitStatus>,
    pub pid: Pid,
    pub(crate) jobs: JobTable,
    pub(crate) last_foreground: Termination,
    pub signals: Arc<SignalFlags>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("pid", &self.pid)
            .field("jobs", &self.jobs)
            .field("last_foreground", &self.last_foreground)
            .finish()
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.kill_wait_jobs();
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Shell {
            exited: None,
            pid: getpid(),
            jobs: JobTable::new(),
            last_foreground: Termination::default(),
            signals: SignalFlags::new(),
        }
    }

    pub fn set_signals(&mut self) {
        if let Err(e) = signal::install_handlers(&self.signals) {
            warn!("Failed to install signal handlers: {}", e);
        }
        debug!("Signal handlers setup completed");
    }

    pub fn eval_str(&mut self, ctx: &mut Context, input: &str) -> Result<ExitStatus> {
        eval::eval_str(self, ctx, input)
    }

    pub fn exit(&mut self) {
        self.exited = Some(ExitStatus::ExitedWith(0));
    }

    /// Kills every tracked background job; used when the shell goes away.
    pub fn kill_wait_jobs(&mut self) -> usize {
        if self.jobs.is_empty() {
            return 0;
        }
        let killed = self.jobs.drain_and_kill();
        debug!("killed {} background jobs", killed);
        killed
    }

    pub fn last_foreground(&self) -> Termination {
        self.last_foreground
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Prints mode-toggle and interrupt notices raised since the last call.
    pub fn print_notices(&self) {
        signal::print_notices(&self.signals);
    }
}
