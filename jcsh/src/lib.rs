use crate::config::{CONFIG_FILE, Config};
use crate::errors::display_user_error;
use crate::repl::Repl;
use crate::shell::Shell;
use anyhow::Result;
use clap::Parser;
use jcsh_types::{Context, ExitStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod errors;
pub mod input;
pub mod parser;
pub mod process;
pub mod proxy;
pub mod repl;
pub mod shell;

pub const LOG_ENV: &str = "JCSH_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run a single command line and exit with its status
    #[arg(short, long)]
    pub command: Option<String>,

    /// Write diagnostics to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Prompt printed before each line
    #[arg(long)]
    pub prompt: Option<String>,
}

pub fn lib_main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = Config::from_file(CONFIG_FILE);
    if let Some(prompt) = cli.prompt.clone() {
        config.prompt = prompt;
    }
    let explicit_log = cli.log_file.is_some();
    if let Some(log_file) = cli.log_file.clone() {
        config.log_file = Some(log_file);
    }

    if let Err(err) = init_tracing(&config) {
        if explicit_log {
            eprintln!("Failed to initialize tracing: {err:#}");
            return ExitCode::FAILURE;
        }
        // no subscriber; the shell works without diagnostics
    }

    setup_panic_handler();
    run_shell(&cli, &config)
}

pub fn run_shell(cli: &Cli, config: &Config) -> ExitCode {
    let mut shell = Shell::new();
    let mut ctx = create_context(&shell);
    shell.set_signals();

    if let Some(command) = cli.command.as_deref() {
        execute_command(&mut shell, &mut ctx, command)
    } else {
        run_interactive(&mut shell, &mut ctx, config)
    }
}

pub fn init_tracing(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let log_file = std::sync::Arc::new(std::fs::File::create(&path)?);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    debug!("logging to {}", path.display());
    Ok(())
}

pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        let location = if let Some(location) = panic_info.location() {
            format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )
        } else {
            "Unknown location".to_string()
        };

        let backtrace = std::backtrace::Backtrace::capture();
        let backtrace_str = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => format!("\nBacktrace:\n{}", backtrace),
            _ => String::new(),
        };

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC");
        error!(
            "PANIC at {}: {} ({}){}",
            location, payload, timestamp, backtrace_str
        );
        eprintln!("jcsh panicked at {}: {}", location, payload);
    }));
}

pub fn create_context(shell: &Shell) -> Context {
    Context::new(shell.pid, true)
}

fn exit_byte(status: ExitStatus) -> u8 {
    u8::try_from(status.code()).unwrap_or(1)
}

fn execute_command(shell: &mut Shell, ctx: &mut Context, command: &str) -> ExitCode {
    debug!("run command mode {:?}", command);
    let result = shell.eval_str(ctx, command);
    shell.print_notices();
    let killed = shell.kill_wait_jobs();
    debug!("command mode done, killed {} background jobs", killed);

    match result {
        Ok(status) => {
            debug!("command {:?} finished: {:?}", command, status);
            ExitCode::from(exit_byte(status))
        }
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(shell: &mut Shell, ctx: &mut Context, config: &Config) -> ExitCode {
    debug!("start shell interactive:{}", ctx.interactive);
    let mut repl = Repl::new(shell, config.prompt.clone());
    match repl.run(ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("shell stopped: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
