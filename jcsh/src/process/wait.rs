use jcsh_types::{JcshError, JcshResult, Termination};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, error, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReapState {
    Alive,
    Terminated(Termination),
    /// The pid is no longer our child; nothing left to report.
    Vanished,
}

/// Blocks until `pid` terminates. `EINTR` never escapes: `on_interrupt` runs
/// and the wait resumes.
pub fn wait_foreground(pid: Pid, mut on_interrupt: impl FnMut()) -> JcshResult<Termination> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                debug!("foreground pid {} finished: {:?}", pid, status);
                return Termination::try_from(status);
            }
            Err(Errno::EINTR) => {
                debug!("wait for pid {} interrupted, resuming", pid);
                on_interrupt();
            }
            Err(source) => {
                error!("waitpid({}) failed: {}", pid, source);
                return Err(JcshError::Wait { pid, source });
            }
        }
    }
}

/// One non-blocking check on `pid`.
pub fn try_reap(pid: Pid) -> ReapState {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) => ReapState::Alive,
        Ok(status) => match Termination::try_from(status) {
            Ok(termination) => {
                debug!("background pid {} finished: {}", pid, termination);
                ReapState::Terminated(termination)
            }
            Err(e) => {
                warn!("ignoring status for pid {}: {}", pid, e);
                ReapState::Alive
            }
        },
        Err(Errno::EINTR) => ReapState::Alive,
        Err(Errno::ECHILD) => {
            warn!("pid {} is not a child of this shell", pid);
            ReapState::Vanished
        }
        Err(e) => {
            error!("waitpid({}, WNOHANG) failed: {}", pid, e);
            ReapState::Alive
        }
    }
}
