use jcsh_types::{JcshError, JcshResult};
use nix::unistd::{ForkResult, Pid, fork, getpid};
use std::io::Write;
use tracing::{debug, error};

use super::process::Process;

/// Forks and launches `process` in the child. Returns the child's pid in the
/// parent. The child never returns: it either becomes the program or exits 1.
pub(crate) fn fork_process(process: &Process) -> JcshResult<Pid> {
    let argv = process.c_argv()?;

    // anything still buffered would otherwise be written twice
    std::io::stdout().flush()?;
    std::io::stderr().flush()?;

    debug!(
        "fork: cmd:{} foreground:{} redirects:{:?}",
        process.cmd(),
        process.foreground,
        process.redirects
    );
    let pid = unsafe { fork() }.map_err(JcshError::Fork)?;

    match pid {
        ForkResult::Parent { child } => {
            debug!("fork: parent continues, child pid {}", child);
            Ok(child)
        }
        ForkResult::Child => {
            let err = process.launch(&argv);
            error!("child {} failed to launch {}: {}", getpid(), process.cmd(), err);
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
