// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media types, media ranges and the `Accept` header.
//!
//! A media type is `kind/subkind` plus ordered parameters. Both levels may
//! be the `*` wildcard in a range — `*/*` and `text/*` — but `*/html` is
//! nonsense and rejected. Kind and subkind are case-insensitive and held
//! lowercase. Unlike the coding/language/charset families, a media type
//! owns its parameter set directly: the parameters are part of the value.
//!
//! # Examples
//!
//! ```
//! use hdr_core::MediaType;
//!
//! let mt = MediaType::parse("Text/HTML; charset=utf-8").unwrap();
//! assert_eq!(mt.kind(), "text");
//! assert_eq!(mt.subkind(), "html");
//! assert_eq!(mt.parameters().get_str("charset"), Some("utf-8"));
//! assert_eq!(mt.to_string(), "text/html; charset=utf-8");
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::params::Parameters;
use crate::qvalue::{sort_by_weight, QValue};
use crate::syntax::{is_token_char, Cursor, ParseError};
use crate::value::{
    parse_element, parse_list_with, parse_single, render_list, FieldValue, MatchError,
    Parameterized, Syntax,
};

static STAR: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("*"));
static TEXT: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("text"));
static PLAIN: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("plain"));
static HTML: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("html"));
static APPLICATION: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("application"));
static JSON: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("json"));
static OCTET_STREAM: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("octet-stream"));

fn atom(lower: &str) -> SmolStr {
    match lower {
        "*" => STAR.clone(),
        "text" => TEXT.clone(),
        "plain" => PLAIN.clone(),
        "html" => HTML.clone(),
        "application" => APPLICATION.clone(),
        "json" => JSON.clone(),
        "octet-stream" => OCTET_STREAM.clone(),
        other => SmolStr::new(other),
    }
}

const SINGLE: Syntax = Syntax::new("media type").with_extra_value_chars(&['/']);
const RANGE_LIST: Syntax = Syntax::new("Accept value")
    .with_wildcard()
    .with_extra_value_chars(&['/']);

/// A media type (`text/html; charset=utf-8`) or media range (`text/*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: SmolStr,
    subkind: SmolStr,
    params: Parameters,
}

impl MediaType {
    /// Builds a media type from its two levels, validating both.
    pub fn new(kind: &str, subkind: &str) -> Result<Self, ParseError> {
        let kind = validate_level(kind, 0)?;
        let subkind = validate_level(subkind, 0)?;
        if kind == "*" && subkind != "*" {
            return Err(ParseError::InvalidCharacter {
                position: 0,
                found: '*',
            });
        }
        Ok(Self {
            kind,
            subkind,
            params: Parameters::new(),
        })
    }

    /// Parses a complete `Content-Type`-style field: one media type with
    /// optional parameters, no wildcard, nothing after it.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let parsed = parse_single(text, &SINGLE, Self::from_token)?;
        if parsed.value().kind == "*" || parsed.value().subkind == "*" {
            return Err(ParseError::InvalidCharacter {
                position: 0,
                found: '*',
            });
        }
        Ok(adopt_parameters(parsed))
    }

    fn from_token(token: &str, at: usize) -> Result<Self, ParseError> {
        let Some((kind, subkind)) = token.split_once('/') else {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("media subtype"),
                position: at + token.len(),
            });
        };
        let kind = validate_level(kind, at)?;
        let subkind = validate_level(subkind, at + kind.len() + 1)?;
        if kind == "*" && subkind != "*" {
            return Err(ParseError::InvalidCharacter {
                position: at,
                found: '*',
            });
        }
        Ok(Self {
            kind,
            subkind,
            params: Parameters::new(),
        })
    }

    pub fn text_plain() -> Self {
        Self {
            kind: TEXT.clone(),
            subkind: PLAIN.clone(),
            params: Parameters::new(),
        }
    }

    pub fn text_html() -> Self {
        Self {
            kind: TEXT.clone(),
            subkind: HTML.clone(),
            params: Parameters::new(),
        }
    }

    pub fn application_json() -> Self {
        Self {
            kind: APPLICATION.clone(),
            subkind: JSON.clone(),
            params: Parameters::new(),
        }
    }

    pub fn application_octet_stream() -> Self {
        Self {
            kind: APPLICATION.clone(),
            subkind: OCTET_STREAM.clone(),
            params: Parameters::new(),
        }
    }

    /// The full range `*/*`.
    pub fn any() -> Self {
        Self {
            kind: STAR.clone(),
            subkind: STAR.clone(),
            params: Parameters::new(),
        }
    }

    /// The range `kind/*`.
    pub fn any_subkind(kind: &str) -> Result<Self, ParseError> {
        Ok(Self {
            kind: validate_level(kind, 0)?,
            subkind: STAR.clone(),
            params: Parameters::new(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subkind(&self) -> &str {
        &self.subkind
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Returns a media type carrying `params`, or `self` unchanged when
    /// the set is equal.
    pub fn set_parameters(self, params: Parameters) -> Self {
        if self.params == params {
            self
        } else {
            Self { params, ..self }
        }
    }

    /// The effective q-factor of this range inside an `Accept` list.
    pub fn weight(&self) -> QValue {
        self.params.q_value()
    }

    /// True for `*/*` and `*` shorthand ranges.
    pub fn is_wildcard(&self) -> bool {
        self.kind == "*"
    }

    /// Whether this range accepts `candidate`, a concrete media type.
    ///
    /// `*/*` accepts everything, `text/*` accepts any `text` type, and a
    /// full type accepts its case-insensitive equal. Parameters on either
    /// side never participate. A candidate with a wildcard at either level
    /// is a contract violation.
    pub fn accepts(&self, candidate: &MediaType) -> Result<bool, MatchError> {
        if candidate.kind == "*" || candidate.subkind == "*" {
            return Err(MatchError::WildcardCandidate);
        }
        if self.kind == "*" {
            return Ok(true);
        }
        if !self.kind.eq_ignore_ascii_case(&candidate.kind) {
            return Ok(false);
        }
        Ok(self.subkind == "*" || self.subkind.eq_ignore_ascii_case(&candidate.subkind))
    }
}

fn validate_level(level: &str, at: usize) -> Result<SmolStr, ParseError> {
    if level == "*" {
        return Ok(STAR.clone());
    }
    if level.is_empty() {
        return Err(ParseError::MissingValue {
            label: SmolStr::new("media type"),
            position: at,
        });
    }
    if let Some((idx, c)) = level.char_indices().find(|(_, c)| !is_token_char(*c)) {
        return Err(ParseError::InvalidCharacter {
            position: at + idx,
            found: c,
        });
    }
    Ok(atom(&level.to_ascii_lowercase()))
}

// The engine collects parameters on the Parameterized wrapper; a media
// type owns them itself, so the wrapper is unwrapped here.
fn adopt_parameters(parsed: Parameterized<MediaType>) -> MediaType {
    let params = parsed.parameters().clone();
    parsed.into_value().set_parameters(params)
}

impl FieldValue for MediaType {
    fn is_wildcard(&self) -> bool {
        MediaType::is_wildcard(self)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str(&self.kind);
        out.push('/');
        out.push_str(&self.subkind);
        self.params.write_suffix(&mut out, true);
        f.write_str(&out)
    }
}

impl FromStr for MediaType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

/// The parsed `Accept` header: media ranges ordered by descending weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Accept(Vec<MediaType>);

impl Accept {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut items = parse_list_with(text, &RANGE_LIST, Self::read_range)?;
        sort_by_weight(&mut items, MediaType::weight);
        Ok(Accept(items))
    }

    // A lone "*" is accepted as shorthand for "*/*" (RFC 7231 notes
    // senders emit it); everything else must be kind/subkind.
    fn read_range(cur: &mut Cursor<'_>) -> Result<MediaType, ParseError> {
        let element = parse_element(cur, &RANGE_LIST, &|token, at| {
            if token == "*" {
                Ok(MediaType::any())
            } else {
                MediaType::from_token(token, at)
            }
        })?;
        Ok(adopt_parameters(element))
    }

    pub fn from_elements(mut elements: Vec<MediaType>) -> Self {
        sort_by_weight(&mut elements, MediaType::weight);
        Accept(elements)
    }

    pub fn elements(&self) -> &[MediaType] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<MediaType> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn preferred(&self) -> Option<&MediaType> {
        self.0.first()
    }

    pub fn accepts(&self, candidate: &MediaType) -> Result<bool, MatchError> {
        for range in &self.0 {
            if !range.weight().is_zero() && range.accepts(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for Accept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for Accept {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Accept::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamName;

    #[test]
    fn parse_lowercases_both_levels() {
        let mt = MediaType::parse("Application/JSON").unwrap();
        assert_eq!(mt, MediaType::application_json());
    }

    #[test]
    fn parameters_are_kept_in_order() {
        let mt = MediaType::parse("multipart/form-data; boundary=xyz; charset=utf-8").unwrap();
        let names: Vec<&str> = mt.parameters().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["boundary", "charset"]);
    }

    #[test]
    fn missing_subtype_is_reported_after_the_kind() {
        assert_eq!(
            MediaType::parse("text"),
            Err(ParseError::MissingValue {
                label: SmolStr::new("media subtype"),
                position: 4
            })
        );
    }

    #[test]
    fn second_slash_is_an_invalid_character() {
        assert_eq!(
            MediaType::parse("a/b/c"),
            Err(ParseError::InvalidCharacter {
                position: 3,
                found: '/'
            })
        );
    }

    #[test]
    fn content_type_form_rejects_ranges() {
        assert!(MediaType::parse("*/*").is_err());
        assert!(MediaType::parse("text/*").is_err());
    }

    #[test]
    fn wildcard_kind_requires_wildcard_subkind() {
        assert!(MediaType::new("*", "html").is_err());
        assert!(MediaType::new("*", "*").is_ok());
    }

    #[test]
    fn range_matching_is_asymmetric() {
        let any = MediaType::any();
        let text_any = MediaType::any_subkind("text").unwrap();
        let html = MediaType::text_html();
        let json = MediaType::application_json();

        assert!(any.accepts(&html).unwrap());
        assert!(text_any.accepts(&html).unwrap());
        assert!(!text_any.accepts(&json).unwrap());
        assert!(html.accepts(&MediaType::new("TEXT", "HTML").unwrap()).unwrap());
        assert!(!html.accepts(&MediaType::text_plain()).unwrap());

        assert_eq!(html.accepts(&text_any), Err(MatchError::WildcardCandidate));
        assert_eq!(any.accepts(&any), Err(MatchError::WildcardCandidate));
    }

    #[test]
    fn parameters_never_affect_matching() {
        let with_charset = MediaType::text_plain()
            .set_parameters(Parameters::new().with(ParamName::charset(), "utf-8").unwrap());
        assert!(with_charset.accepts(&MediaType::text_plain()).unwrap());
        assert!(MediaType::text_plain().accepts(&with_charset).unwrap());
    }

    #[test]
    fn set_parameters_no_op_returns_equal_value() {
        let mt = MediaType::text_plain();
        let same = mt.clone().set_parameters(Parameters::new());
        assert_eq!(same, mt);
    }

    #[test]
    fn accept_sorts_ranges_by_weight() {
        let accept = Accept::parse("text/html;q=0.7, application/json, */*;q=0.1").unwrap();
        let order: Vec<String> = accept
            .elements()
            .iter()
            .map(|mt| format!("{}/{}", mt.kind(), mt.subkind()))
            .collect();
        assert_eq!(order, ["application/json", "text/html", "*/*"]);
    }

    #[test]
    fn lone_star_reads_as_full_range() {
        let accept = Accept::parse("text/html, *;q=0.5").unwrap();
        assert_eq!(accept.elements()[1].kind(), "*");
        assert_eq!(accept.elements()[1].subkind(), "*");
    }

    #[test]
    fn accept_round_trips_canonically() {
        let accept = Accept::parse("text/*;q=0.3 , text/html ;level=1").unwrap();
        assert_eq!(accept.to_string(), "text/html; level=1, text/*; q=0.3");
        assert_eq!(Accept::parse(&accept.to_string()).unwrap(), accept);
    }

    #[test]
    fn accept_match_honours_weights() {
        let accept = Accept::parse("text/html, text/plain;q=0").unwrap();
        assert!(accept.accepts(&MediaType::text_html()).unwrap());
        assert!(!accept.accepts(&MediaType::text_plain()).unwrap());
    }
}
