use jcsh_types::{JcshError, JcshResult};
use nix::unistd::Pid;
use tracing::debug;

pub const MAX_LINE_LENGTH: usize = 2048;
pub const MAX_ARGS: usize = 512;
const PID_VARIABLE: &str = "$$";
const COMMENT_PREFIX: char = '#';

/// Replaces every `$$` with the shell's pid.
pub fn expand_pid(line: &str, pid: Pid) -> String {
    line.replace(PID_VARIABLE, &pid.to_string())
}

/// Turns one input line into a command vector.
///
/// Returns `None` for blank lines and comments. Lines over
/// [`MAX_LINE_LENGTH`] characters or [`MAX_ARGS`] arguments are rejected
/// rather than truncated.
pub fn parse_line(line: &str, pid: Pid) -> JcshResult<Option<Vec<String>>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.chars().count() > MAX_LINE_LENGTH {
        return Err(JcshError::Parse(format!(
            "line too long (max {MAX_LINE_LENGTH} characters)"
        )));
    }

    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let expanded = expand_pid(line, pid);
    let argv: Vec<String> = expanded
        .split_ascii_whitespace()
        .map(String::from)
        .collect();
    if argv.len() > MAX_ARGS {
        return Err(JcshError::Parse(format!(
            "too many arguments (max {MAX_ARGS})"
        )));
    }

    debug!("parsed line into {:?}", argv);
    Ok(Some(argv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> Pid {
        Pid::from_raw(4242)
    }

    #[test]
    fn splits_on_whitespace() {
        let argv = parse_line("ls   -la\t/tmp\n", pid()).unwrap().unwrap();
        assert_eq!(argv, vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(parse_line("", pid()).unwrap(), None);
        assert_eq!(parse_line("   \n", pid()).unwrap(), None);
        assert_eq!(parse_line("# ls -la", pid()).unwrap(), None);
        assert_eq!(parse_line("  #indented", pid()).unwrap(), None);
        // only a leading '#' starts a comment
        assert_eq!(
            parse_line("echo #not", pid()).unwrap().unwrap(),
            vec!["echo", "#not"]
        );
    }

    #[test]
    fn expands_every_pid_variable() {
        assert_eq!(expand_pid("a$$b $$", pid()), "a4242b 4242");
        assert_eq!(
            parse_line("mkdir dir.$$", pid()).unwrap().unwrap(),
            vec!["mkdir", "dir.4242"]
        );
        assert_eq!(expand_pid("$ $", pid()), "$ $");
    }

    #[test]
    fn rejects_long_lines() {
        let line = "a".repeat(MAX_LINE_LENGTH);
        assert!(parse_line(&line, pid()).is_ok());
        let line = "a".repeat(MAX_LINE_LENGTH + 1);
        assert!(matches!(parse_line(&line, pid()), Err(JcshError::Parse(_))));
    }

    #[test]
    fn rejects_too_many_arguments() {
        let line = vec!["x"; MAX_ARGS].join(" ");
        assert_eq!(parse_line(&line, pid()).unwrap().unwrap().len(), MAX_ARGS);
        let line = vec!["x"; MAX_ARGS + 1].join(" ");
        assert!(matches!(parse_line(&line, pid()), Err(JcshError::Parse(_))));
    }
}
