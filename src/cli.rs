use minish::builtins::Flow;
use minish::repl::{BoundedLines, Interactive, LineSource};
use minish::signals::setup_signal_handlers;
use minish::terminal::TerminalGuard;
use minish::{Shell, ShellConfig};
use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
    pub(crate) trace: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs {
        command: None,
        script: None,
        help: false,
        version: false,
        trace: false,
    };

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "--trace" => {
                cli.trace = true;
            }
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            path => {
                if !path.starts_with('-') && cli.script.is_none() {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"minish {} - a minimal command interpreter

USAGE:
    minish                  Read commands from standard input
    minish <script>         Read commands from a file
    minish -c <command>     Execute a single command
    minish --trace          Log every pipeline step to stderr
    minish --help           Show this help message
    minish --version        Show version

SYNTAX:
    program arg ...         Run a program found on PATH (or by path)
    "a b" 'c d'             Quoted words keep their spaces
    prog > file             Send standard output to file (truncates)
    prog < file             Read standard input from file

BUILT-INS:
    ? / help                Show the built-in commands
    exit                    Exit the interpreter
    pwd                     Print the current working directory
    cd <directory>          Change the current working directory

ENVIRONMENT:
    PATH                    Directories searched for programs
    MINISH_LOG              Log filter (default: warn)
    HOME                    Location of ~/.minish_history"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("minish {}", VERSION);
}

/// Process exit statuses are a single byte
fn status_byte(status: i32) -> u8 {
    (status & 0xff) as u8
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(status_byte(status))
}

/// Run lines from `source` to completion
fn drive<S: LineSource>(config: ShellConfig, source: &mut S) -> ExitCode {
    let mut shell = Shell::new(config, io::stdout());
    match shell.run(source) {
        Ok(status) => exit_code(status),
        Err(e) => {
            eprintln!("minish: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute a single command line
pub(crate) fn execute_command(cmd: &str) -> ExitCode {
    let config = ShellConfig {
        interactive: false,
        ..ShellConfig::from_env()
    };
    let mut shell = Shell::new(config, io::stdout());
    match shell.execute_line(cmd) {
        Flow::Exit(code) => exit_code(code),
        Flow::Continue => exit_code(shell.last_status()),
    }
}

/// Execute a script file, one command per line
pub(crate) fn execute_script(path: &str) -> ExitCode {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("minish: {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let config = ShellConfig {
        interactive: false,
        ..ShellConfig::from_env()
    };
    let mut source = BoundedLines::new(BufReader::new(file), config.max_line_len);
    drive(config, &mut source)
}

/// Read commands from standard input, interactively when it is a terminal
pub(crate) fn run_stdin() -> ExitCode {
    let config = ShellConfig::from_env();
    if !config.interactive {
        let mut source = BoundedLines::new(io::stdin().lock(), config.max_line_len);
        return drive(config, &mut source);
    }

    let _terminal = match TerminalGuard::acquire() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("minish: cannot take control of the terminal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    setup_signal_handlers();

    let mut source = match Interactive::new(config.max_line_len) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("minish: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!("interactive session");
    drive(config, &mut source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        std::iter::once("minish")
            .chain(words.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_arguments() {
        let cli = parse_args(&args(&[]));
        assert!(cli.command.is_none());
        assert!(cli.script.is_none());
        assert!(!cli.help && !cli.version && !cli.trace);
    }

    #[test]
    fn test_command_takes_rest() {
        let cli = parse_args(&args(&["--trace", "-c", "ls", "-l", "--help"]));
        assert_eq!(cli.command.as_deref(), Some("ls -l --help"));
        assert!(cli.trace);
        assert!(!cli.help);
    }

    #[test]
    fn test_script_and_flags() {
        let cli = parse_args(&args(&["-V", "run.sh", "other.sh"]));
        assert!(cli.version);
        assert_eq!(cli.script.as_deref(), Some("run.sh"));
    }

    #[test]
    fn test_dangling_dash_c_ignored() {
        let cli = parse_args(&args(&["-c"]));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_status_byte_wraps() {
        assert_eq!(status_byte(0), 0);
        assert_eq!(status_byte(127), 127);
        assert_eq!(status_byte(256 + 3), 3);
    }
}
