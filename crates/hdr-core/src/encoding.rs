// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content codings and the `Accept-Encoding` list.
//!
//! A coding is either the `*` wildcard or a concrete token such as `gzip`.
//! Tokens are case-insensitive and held in canonical lowercase; the
//! well-known codings resolve to interned instances so parsing a typical
//! header allocates nothing for the coding itself.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::qvalue::sort_by_weight;
use crate::syntax::{is_token_char, ParseError};
use crate::value::{
    parse_list, parse_single, render_list, FieldValue, MatchError, Parameterized, Syntax,
};

static GZIP: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("gzip"));
static BR: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("br"));
static DEFLATE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("deflate"));
static COMPRESS: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("compress"));
static IDENTITY: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("identity"));

fn canonical(lower: &str) -> Option<SmolStr> {
    match lower {
        "gzip" => Some(GZIP.clone()),
        "br" => Some(BR.clone()),
        "deflate" => Some(DEFLATE.clone()),
        "compress" => Some(COMPRESS.clone()),
        "identity" => Some(IDENTITY.clone()),
        _ => None,
    }
}

/// A content coding: the wildcard or a concrete coding token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentCoding {
    /// The `*` wildcard, "any coding".
    Any,
    /// A concrete coding such as `gzip`, in canonical lowercase.
    Coding(SmolStr),
}

impl ContentCoding {
    /// Builds a coding from header text: `*` becomes the wildcard, any
    /// other token is validated and canonicalized.
    pub fn new(text: &str) -> Result<Self, ParseError> {
        Self::from_token(text, 0)
    }

    pub(crate) fn from_token(token: &str, at: usize) -> Result<Self, ParseError> {
        if token == "*" {
            return Ok(ContentCoding::Any);
        }
        if token.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("content coding"),
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
        Ok(ContentCoding::Coding(
            canonical(&lower).unwrap_or_else(|| SmolStr::new(lower)),
        ))
    }

    pub fn gzip() -> Self {
        ContentCoding::Coding(GZIP.clone())
    }

    pub fn brotli() -> Self {
        ContentCoding::Coding(BR.clone())
    }

    pub fn deflate() -> Self {
        ContentCoding::Coding(DEFLATE.clone())
    }

    pub fn compress() -> Self {
        ContentCoding::Coding(COMPRESS.clone())
    }

    pub fn identity() -> Self {
        ContentCoding::Coding(IDENTITY.clone())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentCoding::Any => "*",
            ContentCoding::Coding(token) => token,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ContentCoding::Any)
    }

    /// Whether this coding accepts `candidate`.
    ///
    /// The wildcard accepts every concrete coding; a concrete coding
    /// accepts exactly its case-insensitive equal. The candidate must be
    /// concrete — content is never a wildcard — so a wildcard candidate is
    /// rejected as a contract violation.
    pub fn accepts(&self, candidate: &ContentCoding) -> Result<bool, MatchError> {
        let ContentCoding::Coding(theirs) = candidate else {
            return Err(MatchError::WildcardCandidate);
        };
        Ok(match self {
            ContentCoding::Any => true,
            ContentCoding::Coding(ours) => ours.eq_ignore_ascii_case(theirs),
        })
    }
}

impl FieldValue for ContentCoding {
    fn is_wildcard(&self) -> bool {
        ContentCoding::is_wildcard(self)
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCoding {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentCoding::new(s)
    }
}

const SYNTAX: Syntax = Syntax::new("Accept-Encoding value").with_wildcard();

/// The parsed `Accept-Encoding` header: codings ordered by descending
/// weight.
///
/// Wildcard and concrete entries are interleaved purely by weight; an
/// implied `q=1` wildcard sorts ahead of an explicit `gzip;q=0.5`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptEncoding(Vec<Parameterized<ContentCoding>>);

impl AcceptEncoding {
    /// Parses the comma-separated coding list and orders it by weight.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut items = parse_list(text, &SYNTAX, ContentCoding::from_token)?;
        sort_by_weight(&mut items, Parameterized::weight);
        Ok(AcceptEncoding(items))
    }

    pub fn from_elements(mut elements: Vec<Parameterized<ContentCoding>>) -> Self {
        sort_by_weight(&mut elements, Parameterized::weight);
        AcceptEncoding(elements)
    }

    /// Elements in descending weight order.
    pub fn elements(&self) -> &[Parameterized<ContentCoding>] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Parameterized<ContentCoding>> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most preferred element, if any.
    pub fn preferred(&self) -> Option<&Parameterized<ContentCoding>> {
        self.0.first()
    }

    /// Whether any element with a non-zero weight accepts `candidate`.
    pub fn accepts(&self, candidate: &ContentCoding) -> Result<bool, MatchError> {
        for element in &self.0 {
            if !element.weight().is_zero() && element.value().accepts(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for AcceptEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for AcceptEncoding {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AcceptEncoding::parse(s)
    }
}

/// Parses a single `Content-Encoding`-style coding with no wildcard and no
/// parameters.
pub fn parse_content_coding(text: &str) -> Result<ContentCoding, ParseError> {
    const CONTENT: Syntax = Syntax::new("Content-Encoding value").without_parameters();
    parse_single(text, &CONTENT, ContentCoding::from_token).map(Parameterized::into_value)
}
