use crate::parser::parse_line;
use crate::process::job::BACKGROUND_MARKER;
use crate::process::{Job, Redirect};
use crate::shell::{Shell, job::launch_job};
use anyhow::Result;
use jcsh_types::{Context, ExitStatus};
use tracing::debug;

pub fn eval_str(shell: &mut Shell, ctx: &mut Context, input: &str) -> Result<ExitStatus> {
    let Some(mut argv) = parse_line(input, shell.pid)? else {
        debug!("skip blank or comment line");
        return Ok(ExitStatus::ExitedWith(0));
    };

    if let Some(builtin) = jcsh_builtin::get_command(&argv[0]) {
        // builtins always run inside the shell, without redirection
        if argv.len() > 1 && argv.last().is_some_and(|t| t == BACKGROUND_MARKER) {
            argv.pop();
        }
        let (argv, ignored) = Redirect::parse(argv, true);
        debug!("builtin {:?} ignoring redirects {:?}", argv, ignored);
        return Ok(builtin(ctx, argv, shell));
    }

    let job = Job::classify(argv, shell.signals.is_foreground_only())?;
    ctx.foreground = job.foreground;
    debug!(
        "start job '{}' foreground:{} redirects:{:?}",
        job.cmd, job.foreground, job.process.redirects
    );
    launch_job(shell, ctx, job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jcsh_types::Termination;
    use std::fs;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};
    use std::os::unix::io::AsRawFd;

    fn capture(ctx: &mut Context) -> File {
        let file = tempfile::tempfile().unwrap();
        ctx.outfile = file.as_raw_fd();
        file
    }

    fn contents(file: &mut File) -> String {
        let mut s = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn comments_and_blank_lines_do_nothing() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let mut out = capture(&mut ctx);

        assert_eq!(
            eval_str(&mut shell, &mut ctx, "# echo hi").unwrap(),
            ExitStatus::ExitedWith(0)
        );
        assert_eq!(
            eval_str(&mut shell, &mut ctx, "   ").unwrap(),
            ExitStatus::ExitedWith(0)
        );
        assert_eq!(contents(&mut out), "");
    }

    #[test]
    fn status_reports_last_foreground_command() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let mut out = capture(&mut ctx);

        eval_str(&mut shell, &mut ctx, "status").unwrap();
        eval_str(&mut shell, &mut ctx, "false").unwrap();
        eval_str(&mut shell, &mut ctx, "status").unwrap();
        assert_eq!(contents(&mut out), "exit value 0\nexit value 1\n");
    }

    #[test]
    fn background_commands_do_not_change_status() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let _out = capture(&mut ctx);

        eval_str(&mut shell, &mut ctx, "false").unwrap();
        eval_str(&mut shell, &mut ctx, "sleep 0 &").unwrap();
        assert_eq!(shell.last_foreground(), Termination::Exited(1));
    }

    #[test]
    fn exit_marks_the_shell() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);

        eval_str(&mut shell, &mut ctx, "exit").unwrap();
        assert_eq!(shell.exited, Some(ExitStatus::ExitedWith(0)));
    }

    #[test]
    fn builtins_ignore_the_background_marker() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let mut out = capture(&mut ctx);

        assert_eq!(
            eval_str(&mut shell, &mut ctx, "status &").unwrap(),
            ExitStatus::ExitedWith(0)
        );
        assert_eq!(contents(&mut out), "exit value 0\n");
        assert!(shell.jobs().is_empty());
    }

    #[test]
    fn builtins_ignore_redirection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let mut out = capture(&mut ctx);

        let line = format!("status > {}", path.display());
        eval_str(&mut shell, &mut ctx, &line).unwrap();
        assert_eq!(contents(&mut out), "exit value 0\n");
        assert!(!path.exists());
    }

    #[test]
    fn foreground_only_mode_round_trip() {
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);
        let mut out = capture(&mut ctx);

        shell.signals.toggle_foreground_only();
        let status = eval_str(&mut shell, &mut ctx, "true &").unwrap();
        assert_eq!(status, ExitStatus::ExitedWith(0));
        assert!(!contents(&mut out).contains("background pid is"));

        shell.signals.toggle_foreground_only();
        let status = eval_str(&mut shell, &mut ctx, "sleep 1 &").unwrap();
        assert!(matches!(status, ExitStatus::Running(_)));
        assert!(contents(&mut out).contains("background pid is"));
        assert_eq!(shell.jobs().len(), 1);
    }

    #[test]
    fn pid_expansion_reaches_the_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pid.txt");
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);

        let line = format!("echo $$ > {}", path.display());
        eval_str(&mut shell, &mut ctx, &line).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{}\n", shell.pid)
        );
    }

    #[test]
    fn redirect_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        let mut shell = Shell::new();
        let mut ctx = Context::new(shell.pid, true);

        eval_str(&mut shell, &mut ctx, &format!("ls -a / > {}", first.display())).unwrap();
        eval_str(
            &mut shell,
            &mut ctx,
            &format!("cat < {} > {}", first.display(), second.display()),
        )
        .unwrap();

        let a = fs::read(&first).unwrap();
        let b = fs::read(&second).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
