// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parameter names and the ordered parameter set attached to header values.

use std::fmt;

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::qvalue::QValue;
use crate::syntax::{is_token_char, write_param_value, ParseError};

// Well-known parameter names, interned once at first use. Lookups hand out
// the canonical instance so common names never reallocate.
static Q: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("q")));
static CHARSET: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("charset")));
static BOUNDARY: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("boundary")));
static LEVEL: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("level")));
static FILENAME: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("filename")));
static FILENAME_EXT: Lazy<ParamName> = Lazy::new(|| ParamName(SmolStr::new("filename*")));

fn well_known(lower: &str) -> Option<ParamName> {
    match lower {
        "q" => Some(Q.clone()),
        "charset" => Some(CHARSET.clone()),
        "boundary" => Some(BOUNDARY.clone()),
        "level" => Some(LEVEL.clone()),
        "filename" => Some(FILENAME.clone()),
        "filename*" => Some(FILENAME_EXT.clone()),
        _ => None,
    }
}

/// A case-insensitive parameter name, held in canonical lowercase form.
///
/// Names are validated against the token grammar at construction; a name
/// that survives construction can always be rendered back onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamName(SmolStr);

impl ParamName {
    /// Validates and interns a parameter name.
    pub fn new(name: &str) -> Result<Self, ParseError> {
        if name.is_empty() {
            return Err(ParseError::MissingParameterName { position: 0 });
        }
        if let Some((idx, c)) = name.char_indices().find(|(_, c)| !is_token_char(*c)) {
            return Err(ParseError::InvalidCharacter {
                position: idx,
                found: c,
            });
        }
        Ok(Self::from_token(name))
    }

    /// Interns a name already known to satisfy the token grammar.
    pub(crate) fn from_token(token: &str) -> Self {
        let lower = token.to_ascii_lowercase();
        well_known(&lower).unwrap_or_else(|| ParamName(SmolStr::new(lower)))
    }

    /// The `q` weight parameter.
    pub fn q() -> Self {
        Q.clone()
    }

    /// The `charset` parameter of media types.
    pub fn charset() -> Self {
        CHARSET.clone()
    }

    /// The `boundary` parameter of multipart media types.
    pub fn boundary() -> Self {
        BOUNDARY.clone()
    }

    /// The `level` parameter historically used by `Accept`.
    pub fn level() -> Self {
        LEVEL.clone()
    }

    /// The `filename` parameter of `Content-Disposition`.
    pub fn filename() -> Self {
        FILENAME.clone()
    }

    /// The RFC 5987 `filename*` parameter of `Content-Disposition`.
    pub fn filename_ext() -> Self {
        FILENAME_EXT.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_q(&self) -> bool {
        self.0 == "q"
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An insertion-ordered, unique-keyed mapping from [`ParamName`] to value.
///
/// The set is read-only once handed to a caller: accessors borrow, and the
/// builders consume `self` and return a new set. There is no way to mutate
/// a set someone else holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(ParamName, SmolStr)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a set extended (or updated in place of an existing key) with
    /// `name=value`. A `q` value is validated against the weight grammar.
    pub fn with(
        mut self,
        name: ParamName,
        value: impl Into<SmolStr>,
    ) -> Result<Self, ParseError> {
        let value = value.into();
        if name.is_q() && QValue::parse(&value).is_none() {
            return Err(ParseError::InvalidQValue { position: 0 });
        }
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
        Ok(self)
    }

    /// Returns a set carrying the given weight as its `q` parameter.
    pub fn with_weight(self, weight: QValue) -> Self {
        let mut set = self;
        let rendered = SmolStr::new(weight.to_string());
        match set.0.iter_mut().find(|(n, _)| n.is_q()) {
            Some(slot) => slot.1 = rendered,
            None => set.0.push((ParamName::q(), rendered)),
        }
        set
    }

    /// Appends a freshly parsed parameter, rejecting duplicates. `position`
    /// is the offset of the parameter name in the source text.
    pub(crate) fn push_parsed(
        &mut self,
        name: ParamName,
        value: SmolStr,
        position: usize,
    ) -> Result<(), ParseError> {
        if self.0.iter().any(|(n, _)| *n == name) {
            return Err(ParseError::DuplicateParameter {
                name: SmolStr::new(name.as_str()),
                position,
            });
        }
        self.0.push((name, value));
        Ok(())
    }

    /// Looks a parameter up by its canonical name.
    pub fn get(&self, name: &ParamName) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks a parameter up by raw text, case-insensitively.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamName, &str)> {
        self.0.iter().map(|(n, v)| (n, v.as_str()))
    }

    /// The effective weight of the element these parameters belong to:
    /// the decoded `q` parameter, or [`QValue::DEFAULT`] when absent.
    pub fn q_value(&self) -> QValue {
        match self.get(&ParamName::q()) {
            // A stored q always passed validation on the way in.
            Some(raw) => QValue::parse(raw).unwrap_or(QValue::DEFAULT),
            None => QValue::DEFAULT,
        }
    }

    /// Writes the canonical `"; name=value"` suffix for every parameter.
    pub(crate) fn write_suffix(&self, out: &mut String, escaping: bool) {
        for (name, value) in self.iter() {
            out.push_str("; ");
            out.push_str(name.as_str());
            out.push('=');
            write_param_value(out, value, escaping);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_canonical_lowercase() {
        let upper = ParamName::new("CHARSET").unwrap();
        assert_eq!(upper.as_str(), "charset");
        assert_eq!(upper, ParamName::charset());
    }

    #[test]
    fn well_known_names_reuse_the_interned_atom() {
        assert_eq!(ParamName::new("q").unwrap(), ParamName::q());
        assert_eq!(ParamName::new("Q").unwrap(), ParamName::q());
        assert_eq!(ParamName::new("filename*").unwrap(), ParamName::filename_ext());
    }

    #[test]
    fn invalid_names_are_rejected_at_the_offending_char() {
        assert_eq!(
            ParamName::new("na me"),
            Err(ParseError::InvalidCharacter {
                position: 2,
                found: ' '
            })
        );
        assert_eq!(
            ParamName::new(""),
            Err(ParseError::MissingParameterName { position: 0 })
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let params = Parameters::new()
            .with(ParamName::charset(), "utf-8")
            .unwrap()
            .with(ParamName::boundary(), "x")
            .unwrap()
            .with(ParamName::q(), "0.5")
            .unwrap();
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["charset", "boundary", "q"]);
    }

    #[test]
    fn with_updates_in_place() {
        let params = Parameters::new()
            .with(ParamName::charset(), "utf-8")
            .unwrap()
            .with(ParamName::charset(), "us-ascii")
            .unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(&ParamName::charset()), Some("us-ascii"));
    }

    #[test]
    fn parsed_duplicates_are_rejected() {
        let mut params = Parameters::new();
        params
            .push_parsed(ParamName::q(), SmolStr::new("0.5"), 5)
            .unwrap();
        assert_eq!(
            params.push_parsed(ParamName::q(), SmolStr::new("0.8"), 11),
            Err(ParseError::DuplicateParameter {
                name: SmolStr::new("q"),
                position: 11
            })
        );
    }

    #[test]
    fn q_accessor_defaults_to_one() {
        assert_eq!(Parameters::new().q_value(), QValue::DEFAULT);
        let weighted = Parameters::new().with(ParamName::q(), "0.25").unwrap();
        assert_eq!(weighted.q_value(), QValue::parse("0.25").unwrap());
    }

    #[test]
    fn invalid_q_is_rejected_by_the_builder() {
        assert_eq!(
            Parameters::new().with(ParamName::q(), "1.5"),
            Err(ParseError::InvalidQValue { position: 0 })
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let params = Parameters::new().with(ParamName::charset(), "utf-8").unwrap();
        assert_eq!(params.get_str("Charset"), Some("utf-8"));
        assert_eq!(params.get_str("CHARSET"), Some("utf-8"));
        assert_eq!(params.get_str("missing"), None);
    }

    #[test]
    fn suffix_quotes_non_token_values() {
        let params = Parameters::new()
            .with(ParamName::filename(), "report final.pdf")
            .unwrap();
        let mut out = String::new();
        params.write_suffix(&mut out, true);
        assert_eq!(out, "; filename=\"report final.pdf\"");
    }
}
