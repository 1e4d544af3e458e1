use jcsh_types::{JcshError, JcshResult};
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tracing::debug;

use super::signal::send_signal;

pub const MAX_BACKGROUND_JOBS: usize = 32;

/// Background processes the shell is tracking, oldest first.
///
/// Bounded at [`MAX_BACKGROUND_JOBS`]; a full table rejects new entries
/// instead of overwriting old ones. Removal shifts later entries down so the
/// table never has gaps.
#[derive(Debug)]
pub struct JobTable {
    pids: Vec<Pid>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        JobTable {
            pids: Vec::with_capacity(MAX_BACKGROUND_JOBS),
        }
    }

    pub fn add(&mut self, pid: Pid) -> JcshResult<()> {
        if self.is_full() {
            return Err(JcshError::JobTableFull {
                capacity: MAX_BACKGROUND_JOBS,
            });
        }
        if self.contains(pid) {
            return Err(JcshError::DuplicateJob(pid));
        }
        self.pids.push(pid);
        debug!("tracking background pid {} ({} jobs)", pid, self.pids.len());
        Ok(())
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Pid> {
        let index = self.pids.iter().position(|p| *p == pid)?;
        let removed = self.pids.remove(index);
        debug!("untracked background pid {} ({} jobs)", pid, self.pids.len());
        Some(removed)
    }

    /// Sends SIGKILL to every tracked pid and forgets them. Does not wait.
    pub fn drain_and_kill(&mut self) -> usize {
        let mut killed = 0;
        for pid in self.pids.drain(..) {
            if send_signal(pid, Signal::SIGKILL).is_ok() {
                killed += 1;
            }
        }
        killed
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pid> {
        self.pids.iter()
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pids.len() >= MAX_BACKGROUND_JOBS
    }

    pub fn capacity(&self) -> usize {
        MAX_BACKGROUND_JOBS
    }
}
