use jcsh_types::JcshError;
use tracing::{debug, error};

/// Display error in a user-friendly format without stack traces.
pub fn display_user_error(err: &anyhow::Error) {
    if is_fatal(err) {
        error!("fatal: {:?}", err);
    } else {
        debug!("command failed: {:?}", err);
    }
    eprintln!("jcsh: {err}");
}

/// Errors the shell cannot continue after. Only a failed fork qualifies;
/// everything else is reported and the loop goes on.
pub fn is_fatal(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<JcshError>(), Some(JcshError::Fork(_)))
}
