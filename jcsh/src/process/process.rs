use jcsh_types::{JcshError, JcshResult};
use nix::unistd::{Pid, execvp};
use std::ffi::CString;
use tracing::debug;

use super::redirect::Redirect;
use super::signal::{ignore_interrupt, ignore_stop, restore_default_interrupt};

/// One external program: its argument vector (program name first) with
/// redirections already extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub(crate) argv: Vec<String>,
    pub(crate) redirects: Vec<Redirect>,
    pub(crate) foreground: bool,
    pub(crate) pid: Option<Pid>,
}

impl Process {
    pub fn new(argv: Vec<String>, redirects: Vec<Redirect>, foreground: bool) -> Self {
        Process {
            argv,
            redirects,
            foreground,
            pid: None,
        }
    }

    pub fn cmd(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Converts the argument vector before forking so the child does no
    /// allocation-heavy work.
    pub(crate) fn c_argv(&self) -> JcshResult<Vec<CString>> {
        self.argv
            .iter()
            .map(|a| {
                CString::new(a.as_str())
                    .map_err(|e| JcshError::Parse(format!("invalid argument {a:?}: {e}")))
            })
            .collect()
    }

    fn set_signals(&self) -> anyhow::Result<()> {
        if self.foreground {
            restore_default_interrupt()?;
        } else {
            ignore_interrupt()?;
        }
        ignore_stop()
    }

    /// Child side of the launch: signal dispositions, redirections, then the
    /// program image. Returns only on failure.
    pub(crate) fn launch(&self, argv: &[CString]) -> anyhow::Error {
        if let Err(e) = self.set_signals() {
            return e;
        }
        for redirect in &self.redirects {
            if let Err(e) = redirect.apply() {
                return e.into();
            }
        }

        debug!("launch: execvp argv:{:?} foreground:{}", argv, self.foreground);
        let Some(program) = argv.first() else {
            return JcshError::Parse("missing command".to_string()).into();
        };
        match execvp(program, argv) {
            Ok(never) => match never {},
            Err(source) => JcshError::Exec {
                cmd: self.cmd().to_string(),
                source,
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_arguments() {
        let process = Process::new(
            vec!["echo".to_string(), "hello world".to_string()],
            vec![],
            true,
        );
        assert_eq!(process.cmd(), "echo");
        let argv = process.c_argv().unwrap();
        assert_eq!(argv[1].to_str().unwrap(), "hello world");
    }

    #[test]
    fn rejects_interior_nul() {
        let process = Process::new(vec!["ec\0ho".to_string()], vec![], true);
        assert!(matches!(process.c_argv(), Err(JcshError::Parse(_))));
    }
}
