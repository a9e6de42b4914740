//! Line input for the command loop
//!
//! [`BoundedLines`] reads newline-terminated lines from any `BufRead` and
//! refuses lines longer than the configured limit. [`Interactive`] wraps a
//! rustyline editor with history for terminal sessions.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Longest accepted input line, in bytes, not counting the newline
pub const MAX_LINE_LEN: usize = 4096;

const HISTORY_FILE: &str = ".minish_history";

#[derive(Error, Debug)]
pub enum InputError {
    #[error("input line longer than {limit} bytes ignored")]
    TooLong { limit: usize },
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
}

impl InputError {
    /// Whether the loop can keep reading after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, InputError::TooLong { .. })
    }
}

/// A source of command lines
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, InputError>;

    /// Whether `read_line` displays the prompt itself
    fn renders_prompt(&self) -> bool {
        false
    }
}

/// Line reader with a hard length limit
pub struct BoundedLines<R> {
    reader: R,
    max_len: usize,
}

impl<R: BufRead> BoundedLines<R> {
    pub fn new(reader: R, max_len: usize) -> Self {
        BoundedLines { reader, max_len }
    }

    /// Skip the rest of an over-long line
    fn discard_line(&mut self) -> io::Result<()> {
        loop {
            let (done, used) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    return Ok(());
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };
            self.reader.consume(used);
            if done {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> LineSource for BoundedLines<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, InputError> {
        let mut buf = Vec::new();
        // Room for the limit plus a CRLF terminator
        let limit = self.max_len as u64 + 2;
        let n = (&mut self.reader).take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }

        let terminated = buf.last() == Some(&b'\n');
        if terminated {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        if buf.len() > self.max_len {
            if !terminated {
                self.discard_line()?;
            }
            return Err(InputError::TooLong {
                limit: self.max_len,
            });
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Get home directory
pub(crate) fn dirs_home() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Terminal line editor with persistent history
pub struct Interactive {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    max_len: usize,
}

impl Interactive {
    pub fn new(max_len: usize) -> Result<Self, InputError> {
        let mut editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Interactive {
            editor,
            history_path,
            max_len,
        })
    }
}

impl LineSource for Interactive {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, InputError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if line.len() > self.max_len {
                    return Err(InputError::TooLong {
                        limit: self.max_len,
                    });
                }
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C discards the current line
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn renders_prompt(&self) -> bool {
        true
    }
}

impl Drop for Interactive {
    fn drop(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                warn!(path = %path.display(), error = %e, "cannot save history");
            } else {
                debug!(path = %path.display(), "saved history");
            }
        }
    }
}
