// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Cache-Control` directives.
//!
//! A directive is a lowercase token with an optional argument
//! (`no-cache`, `max-age=60`, `private="set-cookie"`). Directives do not
//! use `;` parameters or q weights; the field is a plain comma list kept
//! in field order.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::syntax::{is_token_char, write_param_value, Cursor, ParseError};
use crate::value::{parse_list_with, render_list, Syntax};

static NO_CACHE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("no-cache"));
static NO_STORE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("no-store"));
static MAX_AGE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("max-age"));
static PRIVATE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("private"));
static PUBLIC: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("public"));
static MUST_REVALIDATE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("must-revalidate"));

fn canonical(lower: &str) -> SmolStr {
    match lower {
        "no-cache" => NO_CACHE.clone(),
        "no-store" => NO_STORE.clone(),
        "max-age" => MAX_AGE.clone(),
        "private" => PRIVATE.clone(),
        "public" => PUBLIC.clone(),
        "must-revalidate" => MUST_REVALIDATE.clone(),
        other => SmolStr::new(other),
    }
}

const SYNTAX: Syntax = Syntax::new("Cache-Control directive").without_parameters();

/// One cache directive: a name and an optional argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheDirective {
    name: SmolStr,
    argument: Option<SmolStr>,
}

impl CacheDirective {
    /// Builds a bare directive such as `no-store`.
    pub fn new(name: &str) -> Result<Self, ParseError> {
        validate_name(name)?;
        Ok(Self {
            name: canonical(&name.to_ascii_lowercase()),
            argument: None,
        })
    }

    /// Builds a directive with an argument such as `max-age=60`.
    pub fn with_argument(name: &str, argument: impl Into<SmolStr>) -> Result<Self, ParseError> {
        validate_name(name)?;
        Ok(Self {
            name: canonical(&name.to_ascii_lowercase()),
            argument: Some(argument.into()),
        })
    }

    pub fn no_cache() -> Self {
        Self {
            name: NO_CACHE.clone(),
            argument: None,
        }
    }

    pub fn no_store() -> Self {
        Self {
            name: NO_STORE.clone(),
            argument: None,
        }
    }

    pub fn public() -> Self {
        Self {
            name: PUBLIC.clone(),
            argument: None,
        }
    }

    pub fn private() -> Self {
        Self {
            name: PRIVATE.clone(),
            argument: None,
        }
    }

    pub fn must_revalidate() -> Self {
        Self {
            name: MUST_REVALIDATE.clone(),
            argument: None,
        }
    }

    pub fn max_age(seconds: u64) -> Self {
        Self {
            name: MAX_AGE.clone(),
            argument: Some(SmolStr::new(seconds.to_string())),
        }
    }

    fn read(cur: &mut Cursor<'_>) -> Result<Self, ParseError> {
        let start = cur.position();
        let name = match cur.read_token() {
            Some(token) => token,
            None => {
                return Err(match cur.peek() {
                    None => ParseError::MissingValue {
                        label: SmolStr::new(SYNTAX.value_label),
                        position: start,
                    },
                    Some(c) => ParseError::InvalidCharacter {
                        position: start,
                        found: c,
                    },
                })
            }
        };
        let name = canonical(&name.to_ascii_lowercase());
        if cur.peek() != Some('=') {
            return Ok(Self {
                name,
                argument: None,
            });
        }
        cur.bump();
        let value_start = cur.position();
        let argument = match cur.peek() {
            Some('"') => cur.read_quoted(true)?,
            Some(c) if is_token_char(c) => match cur.read_token() {
                Some(token) => SmolStr::new(token),
                None => {
                    return Err(ParseError::MissingParameterValue {
                        position: value_start,
                    })
                }
            },
            _ => {
                return Err(ParseError::MissingParameterValue {
                    position: value_start,
                })
            }
        };
        Ok(Self {
            name,
            argument: Some(argument),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

fn validate_name(name: &str) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::MissingValue {
            label: SmolStr::new(SYNTAX.value_label),
            position: 0,
        });
    }
    if let Some((idx, c)) = name.char_indices().find(|(_, c)| !is_token_char(*c)) {
        return Err(ParseError::InvalidCharacter {
            position: idx,
            found: c,
        });
    }
    Ok(())
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            None => f.write_str(&self.name),
            Some(argument) => {
                let mut out = String::new();
                out.push_str(&self.name);
                out.push('=');
                write_param_value(&mut out, argument, true);
                f.write_str(&out)
            }
        }
    }
}

/// The parsed `Cache-Control` header, directives in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheControl(Vec<CacheDirective>);

impl CacheControl {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let directives = parse_list_with(text, &SYNTAX, CacheDirective::read)?;
        Ok(CacheControl(directives))
    }

    pub fn from_directives(directives: Vec<CacheDirective>) -> Self {
        CacheControl(directives)
    }

    pub fn directives(&self) -> &[CacheDirective] {
        &self.0
    }

    pub fn into_directives(self) -> Vec<CacheDirective> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks a directive up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&CacheDirective> {
        self.0.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The decoded `max-age` seconds, when present and well-formed.
    pub fn max_age(&self) -> Option<u64> {
        self.get("max-age")?.argument()?.parse().ok()
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for CacheControl {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheControl::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_argument_directives() {
        let cc = CacheControl::parse("no-cache, max-age=60, private=\"set-cookie\"").unwrap();
        assert_eq!(cc.len(), 3);
        assert!(cc.contains("no-cache"));
        assert_eq!(cc.max_age(), Some(60));
        assert_eq!(cc.get("private").unwrap().argument(), Some("set-cookie"));
    }

    #[test]
    fn names_are_case_insensitive_and_canonical() {
        let cc = CacheControl::parse("No-Cache, MAX-AGE=10").unwrap();
        assert_eq!(cc.directives()[0], CacheDirective::no_cache());
        assert_eq!(cc.max_age(), Some(10));
    }

    #[test]
    fn field_order_is_preserved() {
        let cc = CacheControl::parse("public, max-age=600, must-revalidate").unwrap();
        let names: Vec<&str> = cc.directives().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["public", "max-age", "must-revalidate"]);
    }

    #[test]
    fn missing_argument_after_equals_is_rejected() {
        assert_eq!(
            CacheControl::parse("max-age="),
            Err(ParseError::MissingParameterValue { position: 8 })
        );
    }

    #[test]
    fn empty_elements_are_rejected() {
        assert!(CacheControl::parse("no-cache,,public").is_err());
        assert!(CacheControl::parse("").is_err());
    }

    #[test]
    fn round_trips_canonically() {
        let cc = CacheControl::parse("private=\"set-cookie\" , max-age=60").unwrap();
        assert_eq!(cc.to_string(), "private=\"set-cookie\", max-age=60");
        assert_eq!(CacheControl::parse(&cc.to_string()).unwrap(), cc);
    }

    #[test]
    fn max_age_constructor_renders_seconds() {
        assert_eq!(CacheDirective::max_age(31536000).to_string(), "max-age=31536000");
    }
}
