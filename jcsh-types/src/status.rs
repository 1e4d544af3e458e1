use crate::JcshError;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use std::fmt;

/// How a child process ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    Exited(i32),
    Signaled(Signal),
}

impl Termination {
    /// Shell-style exit code: the exit value, or 128 + signal number.
    pub fn code(&self) -> i32 {
        match self {
            Termination::Exited(code) => *code,
            Termination::Signaled(signal) => 128 + *signal as i32,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Exited(0)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit value {code}"),
            Termination::Signaled(signal) => write!(f, "terminated by signal {}", *signal as i32),
        }
    }
}

impl TryFrom<WaitStatus> for Termination {
    type Error = JcshError;

    fn try_from(status: WaitStatus) -> Result<Self, Self::Error> {
        match status {
            WaitStatus::Exited(_, code) => Ok(Termination::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Ok(Termination::Signaled(signal)),
            other => Err(JcshError::UnexpectedWaitStatus(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    #[test]
    fn renders_exit_value() {
        assert_eq!(Termination::Exited(0).to_string(), "exit value 0");
        assert_eq!(Termination::Exited(1).to_string(), "exit value 1");
    }

    #[test]
    fn renders_signal() {
        assert_eq!(
            Termination::Signaled(Signal::SIGINT).to_string(),
            "terminated by signal 2"
        );
        assert_eq!(
            Termination::Signaled(Signal::SIGKILL).to_string(),
            "terminated by signal 9"
        );
    }

    #[test]
    fn decodes_wait_status() {
        let pid = Pid::from_raw(100);
        let exited = Termination::try_from(WaitStatus::Exited(pid, 7)).unwrap();
        assert_eq!(exited, Termination::Exited(7));
        assert_eq!(exited.code(), 7);

        let signaled =
            Termination::try_from(WaitStatus::Signaled(pid, Signal::SIGTERM, false)).unwrap();
        assert_eq!(signaled, Termination::Signaled(Signal::SIGTERM));
        assert_eq!(signaled.code(), 143);
    }

    #[test]
    fn rejects_non_terminal_status() {
        let pid = Pid::from_raw(100);
        assert!(Termination::try_from(WaitStatus::StillAlive).is_err());
        assert!(Termination::try_from(WaitStatus::Stopped(pid, Signal::SIGSTOP)).is_err());
    }

    #[test]
    fn default_reads_as_success() {
        assert!(Termination::default().success());
        assert_eq!(Termination::default().to_string(), "exit value 0");
    }
}
