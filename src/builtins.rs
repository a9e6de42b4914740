//! Built-in commands
//!
//! A fixed table of commands that run inside the interpreter process. The
//! dispatcher checks each entry's minimum argument count before calling the
//! handler, so handlers may index their required arguments directly.

use std::env;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

/// What the command loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

#[derive(Error, Debug)]
pub enum BuiltinError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("cd: {dir}: {source}")]
    ChangeDirectory { dir: String, source: io::Error },
    #[error("pwd: {0}")]
    WorkingDirectory(io::Error),
    #[error("unknown built-in index {0}")]
    UnknownIndex(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Built-in handler: receives the full token list (index 0 is the name)
pub type Handler = fn(&[String], &mut dyn Write) -> Result<Flow, BuiltinError>;

/// One entry of the built-in table
pub struct Builtin {
    pub name: &'static str,
    pub run: Handler,
    pub doc: &'static str,
    /// Arguments required after the command name
    pub min_args: usize,
    pub usage: &'static str,
}

pub static COMMANDS: &[Builtin] = &[
    Builtin {
        name: "?",
        run: builtin_help,
        doc: "show this help menu",
        min_args: 0,
        usage: "?",
    },
    Builtin {
        name: "help",
        run: builtin_help,
        doc: "show this help menu",
        min_args: 0,
        usage: "help",
    },
    Builtin {
        name: "exit",
        run: builtin_exit,
        doc: "exit the command shell",
        min_args: 0,
        usage: "exit",
    },
    Builtin {
        name: "pwd",
        run: builtin_pwd,
        doc: "print the current working directory",
        min_args: 0,
        usage: "pwd",
    },
    Builtin {
        name: "cd",
        run: builtin_cd,
        doc: "change the current working directory to the given directory",
        min_args: 1,
        usage: "cd <directory>",
    },
];

/// Index of the built-in called `name`, if any
pub fn lookup(name: &str) -> Option<usize> {
    COMMANDS.iter().position(|builtin| builtin.name == name)
}

/// Run the built-in at `index` with the line's tokens
pub fn invoke(index: usize, tokens: &[String], out: &mut dyn Write) -> Result<Flow, BuiltinError> {
    let builtin = COMMANDS.get(index).ok_or(BuiltinError::UnknownIndex(index))?;
    if tokens.len().saturating_sub(1) < builtin.min_args {
        return Err(BuiltinError::Usage(builtin.usage));
    }
    debug!(name = builtin.name, args = tokens.len().saturating_sub(1), "builtin");
    (builtin.run)(tokens, out)
}

fn builtin_help(_tokens: &[String], out: &mut dyn Write) -> Result<Flow, BuiltinError> {
    for builtin in COMMANDS {
        writeln!(out, "{} - {}", builtin.name, builtin.doc)?;
    }
    Ok(Flow::Continue)
}

fn builtin_exit(_tokens: &[String], _out: &mut dyn Write) -> Result<Flow, BuiltinError> {
    Ok(Flow::Exit(0))
}

fn builtin_pwd(_tokens: &[String], out: &mut dyn Write) -> Result<Flow, BuiltinError> {
    let cwd = env::current_dir().map_err(BuiltinError::WorkingDirectory)?;
    writeln!(out, "{}", cwd.display())?;
    Ok(Flow::Continue)
}

fn builtin_cd(tokens: &[String], _out: &mut dyn Write) -> Result<Flow, BuiltinError> {
    let dir = &tokens[1];
    env::set_current_dir(dir).map_err(|source| BuiltinError::ChangeDirectory {
        dir: dir.clone(),
        source,
    })?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_lookup_finds_every_entry() {
        for (i, builtin) in COMMANDS.iter().enumerate() {
            assert_eq!(lookup(builtin.name), Some(i));
        }
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(lookup("ls"), None);
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("CD"), None);
    }

    #[test]
    fn test_help_lists_all_commands() {
        let mut out = Vec::new();
        let flow = invoke(lookup("help").unwrap(), &tokens(&["help"]), &mut out).unwrap();
        assert_eq!(flow, Flow::Continue);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), COMMANDS.len());
        assert!(text.contains("cd - change the current working directory"));
        assert!(text.contains("exit - exit the command shell"));
    }

    #[test]
    fn test_exit_requests_termination() {
        let mut out = Vec::new();
        let flow = invoke(lookup("exit").unwrap(), &tokens(&["exit", "5"]), &mut out).unwrap();
        assert_eq!(flow, Flow::Exit(0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_cd_without_argument_is_usage_error() {
        let mut out = Vec::new();
        let err = invoke(lookup("cd").unwrap(), &tokens(&["cd"]), &mut out).unwrap_err();
        assert!(matches!(err, BuiltinError::Usage("cd <directory>")));
        assert_eq!(err.to_string(), "usage: cd <directory>");
    }

    #[test]
    fn test_unknown_index() {
        let mut out = Vec::new();
        let err = invoke(COMMANDS.len(), &tokens(&["x"]), &mut out).unwrap_err();
        assert!(matches!(err, BuiltinError::UnknownIndex(_)));
    }
}
