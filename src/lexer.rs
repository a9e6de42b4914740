//! Tokenization for minish
//!
//! Splits one input line into an ordered list of owned token strings.
//! Words are whitespace delimited; single and double quotes group
//! characters (including whitespace) into one word, and quoted parts that
//! touch a bare part are joined into the same word. `>` and `<` are always
//! tokens of their own.

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{anychar, char, multispace0, one_of},
    combinator::{map, opt},
    multi::{fold_many0, fold_many1, many0},
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unterminated quote")]
    UnterminatedQuote,
}

/// Parse a redirection marker: > or <
fn redirect_marker(input: &str) -> IResult<&str, String> {
    map(one_of("<>"), String::from)(input)
}

/// Parse a run of ordinary characters
fn bare(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>')),
        String::from,
    )(input)
}

/// Parse a double-quoted string; backslash escapes the next character
fn double_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(is_not("\"\\"), String::from),
                map(preceded(char('\\'), anychar), String::from),
            )),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char('"'),
    )(input)
}

/// Parse a single-quoted string (no escapes)
fn single_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(opt(is_not("'")), |s: Option<&str>| s.unwrap_or("").to_string()),
        char('\''),
    )(input)
}

/// Parse a word made of adjacent bare and quoted parts
fn word(input: &str) -> IResult<&str, String> {
    fold_many1(
        alt((bare, double_quoted, single_quoted)),
        String::new,
        |mut acc, piece| {
            acc.push_str(&piece);
            acc
        },
    )(input)
}

/// Parse any single token
fn token(input: &str) -> IResult<&str, String> {
    preceded(multispace0, alt((redirect_marker, word)))(input)
}

/// Tokenize one input line
///
/// Every character except a quote can start a token, so the only input
/// left over after the token loop is an opening quote with no partner.
pub fn lex(input: &str) -> Result<Vec<String>, LexError> {
    let (remaining, tokens) = many0(token)(input).map_err(|_| LexError::UnterminatedQuote)?;

    if remaining.trim_start().is_empty() {
        Ok(tokens)
    } else {
        Err(LexError::UnterminatedQuote)
    }
}
