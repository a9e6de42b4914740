//! minish - a minimal command interpreter
//!
//! Usage:
//!   minish              Read commands from standard input
//!   minish -c "cmd"     Execute a single command
//!   minish script       Execute a script file

mod cli;

use cli::{execute_command, execute_script, parse_args, print_help, print_version, run_stdin};
use std::env;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; MINISH_LOG overrides the default level
fn init_tracing(trace: bool) {
    let default = if trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_env("MINISH_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args);

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.trace);

    if let Some(cmd) = cli.command {
        return execute_command(&cmd);
    }

    if let Some(script) = cli.script {
        return execute_script(&script);
    }

    run_stdin()
}
