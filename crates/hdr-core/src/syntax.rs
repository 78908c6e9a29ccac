// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Character-level grammar shared by every header family.
//!
//! This module owns the three primitives everything else is built on:
//!
//! - character classes for RFC 7230 tokens, quoted text and optional
//!   whitespace,
//! - a position-tracking [`Cursor`] over a single header field value,
//! - the `(...)` comment stripper and the quoted-string codec.
//!
//! All offsets reported in errors are 0-based byte positions into the text
//! the operation was given. No primitive ever repairs malformed input; the
//! caller receives a [`ParseError`] and decides what to do with the field.

use std::fmt;

use smol_str::SmolStr;

/// Grammar-level rejection raised while scanning or rendering header text.
///
/// Every variant is terminal: parsing stops at the first violation and no
/// partial value is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character that the grammar does not permit at this position.
    InvalidCharacter { position: usize, found: char },
    /// A mandatory value was absent. `label` names what was expected,
    /// e.g. `"Accept-Encoding value"`.
    MissingValue { label: SmolStr, position: usize },
    /// A `(` comment was opened but never closed.
    UnterminatedComment,
    /// A `"` quoted string was opened but never closed.
    MissingClosingQuote,
    /// A `;` was not followed by a parameter name.
    MissingParameterName { position: usize },
    /// A parameter name was not followed by `=` and a value.
    MissingParameterValue { position: usize },
    /// A parameter with the same name appeared twice on one element.
    DuplicateParameter { name: SmolStr, position: usize },
    /// A `q` parameter that is not a valid weight in `[0, 1]`.
    InvalidQValue { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidCharacter { position, found } => {
                write!(f, "invalid character {:?} at offset {}", found, position)
            }
            ParseError::MissingValue { label, position } => {
                write!(f, "missing {} at offset {}", label, position)
            }
            ParseError::UnterminatedComment => write!(f, "unterminated comment"),
            ParseError::MissingClosingQuote => write!(f, "missing closing quote"),
            ParseError::MissingParameterName { position } => {
                write!(f, "missing parameter name at offset {}", position)
            }
            ParseError::MissingParameterValue { position } => {
                write!(f, "missing parameter value at offset {}", position)
            }
            ParseError::DuplicateParameter { name, position } => {
                write!(f, "duplicate parameter {} at offset {}", name, position)
            }
            ParseError::InvalidQValue { position } => {
                write!(f, "invalid q value at offset {}", position)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Returns true for RFC 7230 `tchar` characters.
///
/// Tokens exclude the separators `()<>@,;:\"/[]?={}`, whitespace and all
/// control characters.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|'
                | '~'
        )
}

/// Returns true for characters permitted inside a quoted string without
/// escaping (`qdtext`, ASCII only).
pub fn is_quoted_text_char(c: char) -> bool {
    c == '\t' || (c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\')
}

/// Returns true for optional whitespace (SP / HTAB).
pub fn is_ows_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Returns true when the whole string is a non-empty run of token chars.
pub fn is_token(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_token_char)
}

/// Position-tracking scanner over one header field value.
///
/// The cursor advances in byte offsets; header grammars are ASCII, so byte
/// offsets and character offsets agree for every valid input, and errors on
/// invalid input still point at the first byte of the offending character.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current 0-based byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos;
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Looks at the next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Consumes and returns the next character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips optional whitespace (SP / HTAB).
    pub fn skip_ows(&mut self) {
        while matches!(self.peek(), Some(c) if is_ows_char(c)) {
            self.pos += 1;
        }
    }

    /// Reads a maximal non-empty run of token characters, or returns `None`
    /// without consuming anything.
    pub fn read_token(&mut self) -> Option<&'a str> {
        self.read_token_with(&[])
    }

    /// Reads a token, additionally accepting the given characters inside it.
    ///
    /// Header types with separator exceptions (the `/` of a media type)
    /// widen the token alphabet this way instead of owning a private
    /// scanner.
    pub fn read_token_with(&mut self, extra: &[char]) -> Option<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_token_char(c) || extra.contains(&c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            None
        } else {
            Some(&self.input[start..self.pos])
        }
    }

    /// Decodes a quoted string starting at the current position.
    ///
    /// The opening `"` must be the next character. With `escaping` enabled,
    /// `\x` decodes to the literal `x`; with it disabled a bare backslash is
    /// rejected at its own position. Control characters and non-ASCII text
    /// are rejected either way.
    pub fn read_quoted(&mut self, escaping: bool) -> Result<SmolStr, ParseError> {
        match self.peek() {
            Some('"') => {
                self.pos += 1;
            }
            Some(c) => {
                return Err(ParseError::InvalidCharacter {
                    position: self.pos,
                    found: c,
                })
            }
            None => return Err(ParseError::MissingClosingQuote),
        }
        let mut out = String::new();
        loop {
            let at = self.pos;
            match self.bump() {
                None => return Err(ParseError::MissingClosingQuote),
                Some('"') => return Ok(SmolStr::new(out)),
                Some('\\') if escaping => match self.bump() {
                    None => return Err(ParseError::MissingClosingQuote),
                    Some(c) if c.is_ascii() && !c.is_ascii_control() => out.push(c),
                    Some(c) => {
                        return Err(ParseError::InvalidCharacter {
                            position: self.pos - c.len_utf8(),
                            found: c,
                        })
                    }
                },
                Some(c) if is_quoted_text_char(c) => out.push(c),
                Some(c) => {
                    return Err(ParseError::InvalidCharacter {
                        position: at,
                        found: c,
                    })
                }
            }
        }
    }

    /// Rejects anything but end-of-input at the current position.
    pub fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(ParseError::InvalidCharacter {
                position: self.pos,
                found: c,
            }),
        }
    }
}

/// Removes every well-formed `(...)` comment from `input`.
///
/// Comments nest, may contain `\x` escapes, and may sit anywhere outside a
/// quoted string. Quoted strings are scanned positionally so a `(` inside
/// one is ordinary text, and parentheses inside a comment never terminate a
/// quoted string that started outside it. All non-comment characters are
/// preserved byte for byte, which makes the operation idempotent.
pub fn strip_comments(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    loop {
        let Some(c) = chars.next() else {
            return Ok(out);
        };
        match c {
            '(' => {
                let mut depth = 1usize;
                while depth > 0 {
                    match chars.next() {
                        None => return Err(ParseError::UnterminatedComment),
                        Some('(') => depth += 1,
                        Some(')') => depth -= 1,
                        Some('\\') => {
                            if chars.next().is_none() {
                                return Err(ParseError::UnterminatedComment);
                            }
                        }
                        Some(_) => {}
                    }
                }
            }
            '"' => {
                out.push('"');
                loop {
                    match chars.next() {
                        None => return Err(ParseError::MissingClosingQuote),
                        Some('\\') => {
                            out.push('\\');
                            match chars.next() {
                                None => return Err(ParseError::MissingClosingQuote),
                                Some(e) => out.push(e),
                            }
                        }
                        Some('"') => {
                            out.push('"');
                            break;
                        }
                        Some(q) => out.push(q),
                    }
                }
            }
            other => out.push(other),
        }
    }
}

/// Writes `value` as a quoted string.
///
/// With `escaping` enabled, `"` and `\` are prefixed with a backslash;
/// without it the value is wrapped verbatim. The caller picks the mode per
/// header type; the codec never decides on its own.
pub fn write_quoted(out: &mut String, value: &str, escaping: bool) {
    out.push('"');
    for c in value.chars() {
        if escaping && (c == '"' || c == '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Writes a parameter value, bare when it is a token and quoted otherwise.
///
/// An empty value still produces `""` so the parameter round-trips.
pub fn write_param_value(out: &mut String, value: &str, escaping: bool) {
    if is_token(value) {
        out.push_str(value);
    } else {
        write_quoted(out, value, escaping);
    }
}
