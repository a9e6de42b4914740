//! minish - a minimal command interpreter
//!
//! # Overview
//!
//! minish reads one command per line, splits it into words, and either runs
//! a built-in (`?`, `help`, `exit`, `pwd`, `cd`) or launches an external
//! program as a child process and waits for it.
//!
//! ```text
//! 0: ls -l /tmp
//! 1: sort < names.txt
//! 2: echo > out.txt hello world
//! 3: exit
//! ```
//!
//! A line may carry one redirection. Its marker ends the argument list and
//! the next word names the file: `<` feeds standard input from it, `>`
//! truncates it and sends standard output there.
//!
//! # Pipeline
//!
//! 1. [`lexer`] turns a line into words
//! 2. [`builtins`] runs a matching built-in, otherwise
//! 3. [`resolver`] finds the executable on `PATH`
//! 4. [`argv`] builds the argument vector and extracts the redirection
//! 5. [`executor`] forks, applies the [`redirect`] in the child, execs and
//!    waits
//!
//! # Example
//!
//! ```rust
//! use minish::{Flow, Shell, ShellConfig};
//!
//! let mut shell = Shell::new(ShellConfig::default(), Vec::new());
//! assert_eq!(shell.execute_line("help"), Flow::Continue);
//! assert!(String::from_utf8_lossy(shell.output()).contains("pwd"));
//! ```

pub mod argv;
pub mod builtins;
pub mod executor;
pub mod lexer;
pub mod redirect;
pub mod repl;
pub mod resolver;
pub mod shell;
pub mod signals;
pub mod terminal;

// Re-export commonly used items
pub use argv::{ArgumentVector, ArgvError, Invocation};
pub use builtins::{BuiltinError, Flow};
pub use executor::{execute, ExitOutcome, LaunchError};
pub use lexer::{lex, LexError};
pub use redirect::{Redirection, RedirectError, Stream};
pub use resolver::{PathResolver, ResolveError};
pub use shell::{Shell, ShellConfig, ShellError};
