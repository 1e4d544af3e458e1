use anyhow::Result;
use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::unistd::{isatty, Pid};
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::os::unix::io::FromRawFd;
use std::os::unix::io::RawFd;
use thiserror::Error;
use tracing::warn;

pub mod status;
pub use status::Termination;

/// jcsh specific error types
#[derive(Error, Debug)]
pub enum JcshError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create process: {0}")]
    Fork(Errno),

    #[error("cannot open {path} for {direction}: {}", .source.desc())]
    Redirect {
        path: String,
        direction: &'static str,
        source: Errno,
    },

    #[error("missing file name after '{0}'")]
    MissingOperand(&'static str),

    #[error("{cmd}: {}", .source.desc())]
    Exec { cmd: String, source: Errno },

    #[error("too many background processes (max {capacity})")]
    JobTableFull { capacity: usize },

    #[error("background pid {0} is already tracked")]
    DuplicateJob(Pid),

    #[error("wait for pid {pid} failed: {source}")]
    Wait { pid: Pid, source: Errno },

    #[error("unexpected wait status: {0}")]
    UnexpectedWaitStatus(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type JcshResult<T> = std::result::Result<T, JcshError>;

#[derive(Clone)]
pub struct Context {
    pub shell_pid: Pid,
    pub foreground: bool,
    pub interactive: bool,
    pub infile: RawFd,
    pub outfile: RawFd,
    pub errfile: RawFd,
}

impl Context {
    pub fn new(shell_pid: Pid, foreground: bool) -> Self {
        let interactive = match isatty(STDIN_FILENO) {
            Ok(tty) => tty,
            Err(err) => {
                warn!("isatty on stdin failed: {}", err);
                false
            }
        };

        Context {
            shell_pid,
            foreground,
            interactive,
            infile: STDIN_FILENO,
            outfile: STDOUT_FILENO,
            errfile: STDERR_FILENO,
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("Context")
            .field("shell_pid", &self.shell_pid)
            .field("foreground", &self.foreground)
            .field("interactive", &self.interactive)
            .field("infile", &self.infile)
            .field("outfile", &self.outfile)
            .field("errfile", &self.errfile)
            .finish()
    }
}

impl Context {
    pub fn write_stdout(&self, msg: &str) -> Result<()> {
        let mut file = unsafe { File::from_raw_fd(self.outfile) };
        let res = writeln!(&mut file, "{msg}").and_then(|_| file.flush());
        mem::forget(file);
        res?;
        Ok(())
    }

    pub fn write_stderr(&self, msg: &str) -> Result<()> {
        let mut file = unsafe { File::from_raw_fd(self.errfile) };
        let res = writeln!(&mut file, "{msg}");
        mem::forget(file);
        res?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.foreground = true;
        self.infile = STDIN_FILENO;
        self.outfile = STDOUT_FILENO;
        self.errfile = STDERR_FILENO;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    ExitedWith(i32),
    Running(Pid),
}

impl ExitStatus {
    /// Exit code reported to callers of `jcsh -c`; a background launch counts as success.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::ExitedWith(code) => *code,
            ExitStatus::Running(_) => 0,
        }
    }
}
