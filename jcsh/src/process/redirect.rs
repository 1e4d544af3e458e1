use jcsh_types::{JcshError, JcshResult};
use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::fcntl::{FcntlArg, FdFlag, OFlag, fcntl, open};
use nix::sys::stat::Mode;
use nix::unistd::dup2;
use std::os::unix::io::RawFd;
use tracing::debug;

pub const NULL_DEVICE: &str = "/dev/null";
const INPUT_OPERATOR: &str = "<";
const OUTPUT_OPERATOR: &str = ">";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Input(String),
    Output(String),
    /// An operator with no file name in a foreground command.
    Missing(&'static str),
}

fn operator(token: &str) -> Option<&'static str> {
    match token {
        INPUT_OPERATOR => Some(INPUT_OPERATOR),
        OUTPUT_OPERATOR => Some(OUTPUT_OPERATOR),
        _ => None,
    }
}

impl Redirect {
    /// Splits `argv` into the program's arguments and its redirections.
    ///
    /// Each operator and its operand are removed wherever they appear. An
    /// operator without an operand reads from / writes to the null device for
    /// background commands and is an error for foreground ones.
    pub fn parse(argv: Vec<String>, background: bool) -> (Vec<String>, Vec<Redirect>) {
        let mut args = Vec::with_capacity(argv.len());
        let mut redirects = Vec::new();
        let mut tokens = argv.into_iter().peekable();

        while let Some(token) = tokens.next() {
            let Some(op) = operator(&token) else {
                args.push(token);
                continue;
            };

            let operand = match tokens.peek() {
                Some(next) if operator(next).is_none() => tokens.next(),
                _ => None,
            };
            let target = match (operand, background) {
                (Some(path), _) => Some(path),
                (None, true) => Some(NULL_DEVICE.to_string()),
                (None, false) => None,
            };
            let redirect = match (op, target) {
                (INPUT_OPERATOR, Some(path)) => Redirect::Input(path),
                (_, Some(path)) => Redirect::Output(path),
                (op, None) => Redirect::Missing(op),
            };
            redirects.push(redirect);
        }

        debug!("parsed args:{:?} redirects:{:?}", args, redirects);
        (args, redirects)
    }

    /// Rewires stdin/stdout of the current process. Only ever called in a
    /// freshly forked child.
    pub(crate) fn apply(&self) -> JcshResult<()> {
        match self {
            Redirect::Input(path) => open_onto(path, OFlag::O_RDONLY, STDIN_FILENO, "input"),
            Redirect::Output(path) => open_onto(
                path,
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
                STDOUT_FILENO,
                "output",
            ),
            Redirect::Missing(op) => Err(JcshError::MissingOperand(op)),
        }
    }
}

fn open_onto(path: &str, flags: OFlag, target: RawFd, direction: &'static str) -> JcshResult<()> {
    let redirect_error = |source| JcshError::Redirect {
        path: path.to_string(),
        direction,
        source,
    };

    // the opened descriptor is close-on-exec; only the duplicate on `target`
    // survives into the program
    let fd = open(
        path,
        flags | OFlag::O_CLOEXEC,
        Mode::from_bits_truncate(0o644),
    )
    .map_err(redirect_error)?;

    if fd == target {
        fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty())).map_err(redirect_error)?;
    } else {
        dup2(fd, target).map_err(redirect_error)?;
    }
    Ok(())
}
