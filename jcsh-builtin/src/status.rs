use super::ShellProxy;
use jcsh_types::{Context, ExitStatus};

/// Prints how the last foreground command ended.
pub fn command(ctx: &Context, _argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    let last = proxy.last_foreground_status();
    match ctx.write_stdout(&last.to_string()) {
        Ok(_) => ExitStatus::ExitedWith(0),
        Err(e) => {
            ctx.write_stderr(&format!("status: {e}")).ok();
            ExitStatus::ExitedWith(1)
        }
    }
}
