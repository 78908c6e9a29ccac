// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Language tags and the `Accept-Language` list.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::qvalue::sort_by_weight;
use crate::syntax::ParseError;
use crate::value::{parse_list, render_list, FieldValue, MatchError, Parameterized, Syntax};

/// A language range: the wildcard or a concrete tag such as `en-US`.
///
/// Tags keep the case they arrived with (`en-US` stays `en-US`) and compare
/// case-insensitively, the way language tags are defined to behave.
#[derive(Debug, Clone, Eq)]
pub enum LanguageTag {
    /// The `*` wildcard, "any language".
    Any,
    /// A concrete tag: 1–8 letter/digit subtags joined by `-`.
    Tag(SmolStr),
}

impl LanguageTag {
    pub fn new(text: &str) -> Result<Self, ParseError> {
        Self::from_token(text, 0)
    }

    pub(crate) fn from_token(token: &str, at: usize) -> Result<Self, ParseError> {
        if token == "*" {
            return Ok(LanguageTag::Any);
        }
        if token.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("language tag"),
                position: at,
            });
        }
        let mut subtag_len = 0usize;
        for (idx, c) in token.char_indices() {
            match c {
                '-' => {
                    if subtag_len == 0 {
                        return Err(ParseError::InvalidCharacter {
                            position: at + idx,
                            found: '-',
                        });
                    }
                    subtag_len = 0;
                }
                c if c.is_ascii_alphanumeric() => {
                    subtag_len += 1;
                    if subtag_len > 8 {
                        return Err(ParseError::InvalidCharacter {
                            position: at + idx,
                            found: c,
                        });
                    }
                }
                c => {
                    return Err(ParseError::InvalidCharacter {
                        position: at + idx,
                        found: c,
                    })
                }
            }
        }
        if subtag_len == 0 {
            // Trailing '-'.
            return Err(ParseError::InvalidCharacter {
                position: at + token.len() - 1,
                found: '-',
            });
        }
        Ok(LanguageTag::Tag(SmolStr::new(token)))
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageTag::Any => "*",
            LanguageTag::Tag(tag) => tag,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, LanguageTag::Any)
    }

    /// The primary subtag: `en` for `en-US`.
    pub fn primary(&self) -> Option<&str> {
        match self {
            LanguageTag::Any => None,
            LanguageTag::Tag(tag) => Some(tag.split('-').next().unwrap_or(tag)),
        }
    }

    /// Whether this range accepts `candidate`, a concrete tag.
    ///
    /// The wildcard accepts anything; a concrete range accepts its
    /// case-insensitive equal. A wildcard candidate is a contract
    /// violation.
    pub fn accepts(&self, candidate: &LanguageTag) -> Result<bool, MatchError> {
        let LanguageTag::Tag(theirs) = candidate else {
            return Err(MatchError::WildcardCandidate);
        };
        Ok(match self {
            LanguageTag::Any => true,
            LanguageTag::Tag(ours) => ours.eq_ignore_ascii_case(theirs),
        })
    }
}

impl PartialEq for LanguageTag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LanguageTag::Any, LanguageTag::Any) => true,
            (LanguageTag::Tag(a), LanguageTag::Tag(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl std::hash::Hash for LanguageTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            LanguageTag::Any => state.write_u8(0),
            LanguageTag::Tag(tag) => {
                state.write_u8(1);
                for b in tag.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
        }
    }
}

impl FieldValue for LanguageTag {
    fn is_wildcard(&self) -> bool {
        LanguageTag::is_wildcard(self)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageTag::new(s)
    }
}

const SYNTAX: Syntax = Syntax::new("Accept-Language value").with_wildcard();

/// The parsed `Accept-Language` header, ordered by descending weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptLanguage(Vec<Parameterized<LanguageTag>>);

impl AcceptLanguage {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut items = parse_list(text, &SYNTAX, LanguageTag::from_token)?;
        sort_by_weight(&mut items, Parameterized::weight);
        Ok(AcceptLanguage(items))
    }

    pub fn from_elements(mut elements: Vec<Parameterized<LanguageTag>>) -> Self {
        sort_by_weight(&mut elements, Parameterized::weight);
        AcceptLanguage(elements)
    }

    pub fn elements(&self) -> &[Parameterized<LanguageTag>] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Parameterized<LanguageTag>> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn preferred(&self) -> Option<&Parameterized<LanguageTag>> {
        self.0.first()
    }

    pub fn accepts(&self, candidate: &LanguageTag) -> Result<bool, MatchError> {
        for element in &self.0 {
            if !element.weight().is_zero() && element.value().accepts(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for AcceptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for AcceptLanguage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AcceptLanguage::parse(s)
    }
}
