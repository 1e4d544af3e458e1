//! Signal handling for the shell and its children.
//!
//! The shell catches SIGINT and SIGTSTP. Both handlers only touch atomics in a
//! [`SignalFlags`] value; the notices they imply are printed later by the main
//! loop through [`print_notices`].

use anyhow::{Result, anyhow};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, kill, sigaction};
use nix::unistd::Pid;
use once_cell::sync::OnceCell;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error};

pub const INTERRUPT_NOTICE: &str = "terminated by signal 2";
pub const ENTER_FOREGROUND_ONLY_NOTICE: &str = "\nEntering foreground-only mode (& is now ignored)";
pub const EXIT_FOREGROUND_ONLY_NOTICE: &str = "\nExiting foreground-only mode";

static HANDLER_FLAGS: OnceCell<Arc<SignalFlags>> = OnceCell::new();

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Notice {
    Interrupted,
    EnteredForegroundOnly,
    ExitedForegroundOnly,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Notice::Interrupted => INTERRUPT_NOTICE,
            Notice::EnteredForegroundOnly => ENTER_FOREGROUND_ONLY_NOTICE,
            Notice::ExitedForegroundOnly => EXIT_FOREGROUND_ONLY_NOTICE,
        };
        f.write_str(msg)
    }
}

/// Process-wide state written from signal context.
///
/// `toggles` counts every mode-toggle delivery; its low bit is the
/// foreground-only flag, so a toggle is one `fetch_add`. `reported_toggles`
/// is only touched by the main loop.
#[derive(Debug, Default)]
pub struct SignalFlags {
    toggles: AtomicUsize,
    reported_toggles: AtomicUsize,
    pending_interrupts: AtomicUsize,
}

impl SignalFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(SignalFlags::default())
    }

    pub fn is_foreground_only(&self) -> bool {
        self.toggles.load(Ordering::SeqCst) & 1 == 1
    }

    pub fn toggle_foreground_only(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_interrupt(&self) {
        self.pending_interrupts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn has_pending(&self) -> bool {
        self.pending_interrupts.load(Ordering::SeqCst) > 0
            || self.toggles.load(Ordering::SeqCst) != self.reported_toggles.load(Ordering::SeqCst)
    }

    /// Takes every notice recorded since the last call, interrupts first and
    /// mode changes in the order they happened.
    pub fn take_notices(&self) -> Vec<Notice> {
        let interrupts = self.pending_interrupts.swap(0, Ordering::SeqCst);
        let mut notices = vec![Notice::Interrupted; interrupts];

        let total = self.toggles.load(Ordering::SeqCst);
        let mut reported = self.reported_toggles.load(Ordering::SeqCst);
        while reported != total {
            reported = reported.wrapping_add(1);
            if reported & 1 == 1 {
                notices.push(Notice::EnteredForegroundOnly);
            } else {
                notices.push(Notice::ExitedForegroundOnly);
            }
        }
        self.reported_toggles.store(total, Ordering::SeqCst);
        notices
    }
}

/// Writes pending notices to stdout. Called from the main loop only.
pub fn print_notices(flags: &SignalFlags) {
    if !flags.has_pending() {
        return;
    }
    let notices = flags.take_notices();
    let mut out = std::io::stdout().lock();
    for notice in notices {
        debug!("notice: {:?}", notice);
        if let Err(e) = writeln!(out, "{notice}") {
            error!("failed to write notice {:?}: {}", notice, e);
        }
    }
    let _ = out.flush();
}

extern "C" fn handle_sigint(_: i32) {
    if let Some(flags) = HANDLER_FLAGS.get() {
        flags.record_interrupt();
    }
}

extern "C" fn handle_sigtstp(_: i32) {
    if let Some(flags) = HANDLER_FLAGS.get() {
        flags.toggle_foreground_only();
    }
}

/// Installs the SIGINT and SIGTSTP handlers, bound to `flags`.
///
/// Handlers are installed without `SA_RESTART` so blocking reads and waits
/// return `EINTR` and the caller gets a chance to print notices.
pub(crate) fn install_handlers(flags: &Arc<SignalFlags>) -> Result<()> {
    let bound = HANDLER_FLAGS.get_or_init(|| Arc::clone(flags));
    if !Arc::ptr_eq(bound, flags) {
        return Err(anyhow!("signal handlers are already bound to another shell"));
    }

    tracing::info!("installing SIGINT and SIGTSTP handlers");
    let sigint = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::empty(),
        SigSet::all(),
    );
    let sigtstp = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::empty(),
        SigSet::all(),
    );
    unsafe {
        sigaction(Signal::SIGINT, &sigint)
            .map_err(|e| anyhow!("failed to set SIGINT handler: {}", e))?;
        sigaction(Signal::SIGTSTP, &sigtstp)
            .map_err(|e| anyhow!("failed to set SIGTSTP handler: {}", e))?;
    }
    unblock(&[Signal::SIGINT, Signal::SIGTSTP])?;
    Ok(())
}

fn unblock(signals: &[Signal]) -> Result<()> {
    let mut set = SigSet::empty();
    for signal in signals {
        set.add(*signal);
    }
    nix::sys::signal::sigprocmask(nix::sys::signal::SigmaskHow::SIG_UNBLOCK, Some(&set), None)?;
    Ok(())
}

fn set_disposition(signal: Signal, handler: SigHandler) -> Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
    unsafe {
        sigaction(signal, &action)
            .map_err(|e| anyhow!("failed to set {:?} disposition: {}", signal, e))?;
    }
    Ok(())
}

/// Child side: a foreground program dies from SIGINT like it would without the shell.
pub(crate) fn restore_default_interrupt() -> Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigDfl)
}

/// Child side: background programs are not affected by SIGINT.
pub(crate) fn ignore_interrupt() -> Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigIgn)
}

/// Child side: SIGTSTP only toggles the shell's mode, it never stops children.
pub(crate) fn ignore_stop() -> Result<()> {
    set_disposition(Signal::SIGTSTP, SigHandler::SigIgn)
}

pub(crate) fn send_signal(pid: Pid, signal: Signal) -> Result<()> {
    debug!("sending signal {:?} to pid {}", signal, pid);
    match kill(pid, signal) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("failed to send signal {:?} to pid {}: {}", signal, pid, e);
            Err(e.into())
        }
    }
}
