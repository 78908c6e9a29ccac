//! Charset names and the `Accept-Charset` list.
//!
//! A charset name is an opaque token here; resolving it to an actual
//! decoder is the caller's business.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::qvalue::sort_by_weight;
use crate::syntax::{is_token_char, ParseError};
use crate::value::{parse_list, render_list, FieldValue, MatchError, Parameterized, Syntax};

static UTF_8: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("utf-8"));
static ISO_8859_1: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("iso-8859-1"));
static US_ASCII: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("us-ascii"));

fn canonical(lower: &str) -> Option<SmolStr> {
    match lower {
        "utf-8" => Some(UTF_8.clone()),
        "iso-8859-1" => Some(ISO_8859_1.clone()),
        "us-ascii" => Some(US_ASCII.clone()),
        _ => None,
    }
}

/// A charset: the wildcard or a concrete name in canonical lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CharsetTag {
    Any,
    Name(SmolStr),
}

impl CharsetTag {
    pub fn new(text: &str) -> Result<Self, ParseError> {
        Self::from_token(text, 0)
    }

    pub(crate) fn from_token(token: &str, at: usize) -> Result<Self, ParseError> {
        if token == "*" {
            return Ok(CharsetTag::Any);
        }
        if token.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("charset"),
                position: at,
            });
        }
        if let Some((idx, c)) = token.char_indices().find(|(_, c)| !is_token_char(*c)) {
            return Err(ParseError::InvalidCharacter {
                position: at + idx,
                found: c,
            });
        }
        let lower = token.to_ascii_lowercase();
        Ok(CharsetTag::Name(
            canonical(&lower).unwrap_or_else(|| SmolStr::new(lower)),
        ))
    }

    pub fn utf_8() -> Self {
        CharsetTag::Name(UTF_8.clone())
    }

    pub fn iso_8859_1() -> Self {
        CharsetTag::Name(ISO_8859_1.clone())
    }

    pub fn us_ascii() -> Self {
        CharsetTag::Name(US_ASCII.clone())
    }

    pub fn as_str(&self) -> &str {
        match self {
            CharsetTag::Any => "*",
            CharsetTag::Name(name) => name,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, CharsetTag::Any)
    }

    /// Wildcard accepts anything; names match case-insensitively; a
    /// wildcard candidate is a contract violation.
    pub fn accepts(&self, candidate: &CharsetTag) -> Result<bool, MatchError> {
        let CharsetTag::Name(theirs) = candidate else {
            return Err(MatchError::WildcardCandidate);
        };
        Ok(match self {
            CharsetTag::Any => true,
            CharsetTag::Name(ours) => ours.eq_ignore_ascii_case(theirs),
        })
    }
}

impl FieldValue for CharsetTag {
    fn is_wildcard(&self) -> bool {
        CharsetTag::is_wildcard(self)
    }
}

impl fmt::Display for CharsetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharsetTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharsetTag::new(s)
    }
}

const SYNTAX: Syntax = Syntax::new("Accept-Charset value").with_wildcard();

/// The parsed `Accept-Charset` header, ordered by descending weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptCharset(Vec<Parameterized<CharsetTag>>);

impl AcceptCharset {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut items = parse_list(text, &SYNTAX, CharsetTag::from_token)?;
        sort_by_weight(&mut items, Parameterized::weight);
        Ok(AcceptCharset(items))
    }

    pub fn from_elements(mut elements: Vec<Parameterized<CharsetTag>>) -> Self {
        sort_by_weight(&mut elements, Parameterized::weight);
        AcceptCharset(elements)
    }

    pub fn elements(&self) -> &[Parameterized<CharsetTag>] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Parameterized<CharsetTag>> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn preferred(&self) -> Option<&Parameterized<CharsetTag>> {
        self.0.first()
    }

    pub fn accepts(&self, candidate: &CharsetTag) -> Result<bool, MatchError> {
        for element in &self.0 {
            if !element.weight().is_zero() && element.value().accepts(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for AcceptCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for AcceptCharset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AcceptCharset::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_canonical_lowercase() {
        assert_eq!(CharsetTag::new("UTF-8").unwrap(), CharsetTag::utf_8());
        assert_eq!(CharsetTag::new("Windows-1252").unwrap().as_str(), "windows-1252");
    }

    #[test]
    fn accept_charset_sorts_and_round_trips() {
        let accept = AcceptCharset::parse("iso-8859-5, unicode-1-1;q=0.8").unwrap();
        let order: Vec<&str> = accept
            .elements()
            .iter()
            .map(|e| e.value().as_str())
            .collect();
        assert_eq!(order, ["iso-8859-5", "unicode-1-1"]);
        assert_eq!(accept.to_string(), "iso-8859-5, unicode-1-1; q=0.8");
        assert_eq!(AcceptCharset::parse(&accept.to_string()).unwrap(), accept);
    }

    #[test]
    fn wildcard_asymmetry_holds() {
        let wild = CharsetTag::Any;
        assert!(wild.accepts(&CharsetTag::utf_8()).unwrap());
        assert_eq!(
            CharsetTag::utf_8().accepts(&CharsetTag::Any),
            Err(MatchError::WildcardCandidate)
        );
    }
}
