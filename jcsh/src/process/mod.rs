#![allow(clippy::module_inception)]

pub mod fork;
pub mod job;
pub mod job_table;
pub mod process;
pub mod redirect;
pub mod signal;
pub mod wait;

pub use job::Job;
pub use job_table::{JobTable, MAX_BACKGROUND_JOBS};
pub use process::Process;
pub use redirect::Redirect;
pub use signal::{Notice, SignalFlags};
pub use wait::{ReapState, try_reap, wait_foreground};
