//! Shell - the central coordinator for minish
//!
//! The Shell owns the per-session state and runs each line through the
//! pipeline:
//! 1. Tokenize (lexer)
//! 2. Dispatch to a built-in (builtins), or
//! 3. Resolve the executable (resolver)
//! 4. Build argv and extract a redirection (argv)
//! 5. Fork, redirect, exec and wait (executor)

use crate::argv::{self, ArgvError};
use crate::builtins::{self, BuiltinError, Flow};
use crate::executor::{self, ExitOutcome, LaunchError, NOT_FOUND_STATUS};
use crate::lexer::{lex, LexError};
use crate::repl::{InputError, LineSource, MAX_LINE_LEN};
use crate::resolver::{PathResolver, ResolveError};
use crate::signals;

use std::env;
use std::io::{self, IsTerminal, Write};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Argv(#[from] ArgvError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status recorded for a command that failed this way
    pub fn status(&self) -> i32 {
        match self {
            ShellError::Resolve(_) => NOT_FOUND_STATUS,
            ShellError::Launch(e) => e.status(),
            ShellError::Lex(_) | ShellError::Argv(ArgvError::MissingTarget(_)) => 2,
            ShellError::Builtin(BuiltinError::Usage(_)) => 2,
            _ => 1,
        }
    }
}

/// Session settings
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Print `<n>: ` prompts
    pub interactive: bool,
    /// Raw `PATH` value used for command search
    pub path_env: Option<String>,
    pub max_line_len: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            interactive: false,
            path_env: None,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

impl ShellConfig {
    /// Settings from the process environment: `PATH`, and whether standard
    /// input is a terminal
    pub fn from_env() -> Self {
        ShellConfig {
            interactive: io::stdin().is_terminal(),
            path_env: env::var("PATH").ok(),
            max_line_len: MAX_LINE_LEN,
        }
    }
}

/// A command interpreter writing built-in output to `out`
pub struct Shell<W: Write> {
    config: ShellConfig,
    resolver: PathResolver,
    out: W,
    line_number: usize,
    last_status: i32,
}

impl<W: Write> Shell<W> {
    pub fn new(config: ShellConfig, out: W) -> Self {
        let resolver = PathResolver::new(config.path_env.as_deref());
        Shell {
            config,
            resolver,
            out,
            line_number: 0,
            last_status: 0,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Status of the most recent command
    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    /// Number of lines processed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn prompt(&self) -> String {
        if self.config.interactive {
            format!("{}: ", self.line_number)
        } else {
            String::new()
        }
    }

    /// Read and run lines until end of input or `exit`. Returns the
    /// interpreter's exit status.
    pub fn run<S: LineSource>(&mut self, source: &mut S) -> Result<i32, ShellError> {
        loop {
            let prompt = self.prompt();
            if !prompt.is_empty() && !source.renders_prompt() {
                write!(self.out, "{}", prompt)?;
                self.out.flush()?;
            }

            let line = match source.read_line(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.is_recoverable() => {
                    eprintln!("minish: {}", e);
                    self.line_number += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let flow = self.execute_line(&line);
            self.line_number += 1;
            if let Flow::Exit(code) = flow {
                return Ok(code);
            }
        }
        self.out.flush()?;
        Ok(0)
    }

    /// Run one line, reporting any error on stderr
    pub fn execute_line(&mut self, line: &str) -> Flow {
        match self.try_execute_line(line) {
            Ok(flow) => flow,
            Err(e) => {
                eprintln!("minish: {}", e);
                self.last_status = e.status();
                Flow::Continue
            }
        }
    }

    /// Run one line, returning errors to the caller
    pub fn try_execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let tokens = lex(line)?;
        trace!(?tokens, "lexed");

        let Some(name) = tokens.first() else {
            return Ok(Flow::Continue);
        };

        if let Some(index) = builtins::lookup(name) {
            let result = builtins::invoke(index, &tokens, &mut self.out);
            self.out.flush()?;
            let flow = result?;
            self.last_status = 0;
            return Ok(flow);
        }

        let outcome = self.run_external(&tokens)?;
        self.last_status = outcome.code();
        Ok(Flow::Continue)
    }

    /// Resolve, build and launch an external command
    fn run_external(&mut self, tokens: &[String]) -> Result<ExitOutcome, ShellError> {
        let name = tokens.first().map(String::as_str).unwrap_or_default();
        let path = self.resolver.resolve(name)?;
        let invocation = argv::build(&path, tokens)?;
        debug!(
            argv = ?invocation.argv.to_strings(),
            redirection = ?invocation.redirection,
            "launching"
        );

        // Anything still buffered would otherwise interleave with the child
        self.out.flush()?;
        io::stdout().flush()?;

        if !self.config.interactive {
            return Ok(executor::execute(
                &invocation.argv,
                invocation.redirection.as_ref(),
            )?);
        }

        signals::take_interrupt();
        let outcome = executor::execute(&invocation.argv, invocation.redirection.as_ref())?;
        // An interrupted child leaves the cursor mid-line
        if signals::take_interrupt() {
            writeln!(self.out)?;
            self.out.flush()?;
        }
        Ok(outcome)
    }
}
