use crate::errors::{display_user_error, is_fatal};
use crate::input::{LineReader, ReadEvent};
use crate::shell::Shell;
use anyhow::Result;
use jcsh_types::Context;
use libc::STDIN_FILENO;
use std::io::Write;
use tracing::{debug, info};

pub const DEFAULT_PROMPT: &str = ": ";

pub struct Repl<'a> {
    pub shell: &'a mut Shell,
    prompt: String,
    reader: LineReader,
}

impl<'a> Repl<'a> {
    pub fn new(shell: &'a mut Shell, prompt: String) -> Self {
        Repl {
            shell,
            prompt,
            reader: LineReader::new(STDIN_FILENO),
        }
    }

    #[cfg(test)]
    fn with_reader(shell: &'a mut Shell, prompt: String, reader: LineReader) -> Self {
        Repl {
            shell,
            prompt,
            reader,
        }
    }

    fn print_prompt(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(self.prompt.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Reads and evaluates lines until `exit` or end of input, then kills
    /// whatever background jobs remain. Only a fatal error ends the loop early.
    pub fn run(&mut self, ctx: &mut Context) -> Result<()> {
        info!("repl started, pid {}", self.shell.pid);
        let result = self.read_eval_loop(ctx);
        let killed = self.shell.kill_wait_jobs();
        info!("repl finished, killed {} background jobs", killed);
        result
    }

    fn read_eval_loop(&mut self, ctx: &mut Context) -> Result<()> {
        loop {
            self.shell.print_notices();
            if self.shell.exited.is_some() {
                debug!("exit requested");
                return Ok(());
            }

            self.print_prompt()?;
            let line = match self.reader.read_line()? {
                ReadEvent::Line(line) => line,
                ReadEvent::Interrupted => {
                    debug!("read interrupted by signal");
                    continue;
                }
                ReadEvent::Eof => {
                    debug!("end of input");
                    return Ok(());
                }
            };

            ctx.reset();
            if let Err(err) = self.shell.eval_str(ctx, &line) {
                display_user_error(&err);
                if is_fatal(&err) {
                    return Err(err);
                }
            }
        }
    }
}
