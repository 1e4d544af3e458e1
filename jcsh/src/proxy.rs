use crate::shell::Shell;
use anyhow::Result;
use jcsh_builtin::ShellProxy;
use jcsh_types::Termination;
use tracing::debug;

impl ShellProxy for Shell {
    fn exit_shell(&mut self) {
        self.exit();
    }

    fn changepwd(&mut self, path: &str) -> Result<()> {
        std::env::set_current_dir(path)?;
        debug!("changed directory to {}", path);
        Ok(())
    }

    fn last_foreground_status(&self) -> Termination {
        self.last_foreground()
    }
}
