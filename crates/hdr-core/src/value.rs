// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The parameterized value model and the parsing engine shared by every
//! header family.
//!
//! A concrete header type contributes three things: a [`Syntax`] describing
//! its grammar switches, a constructor turning a raw token into its typed
//! value, and whatever matching semantics it has. Everything else — the
//! whitespace rules, the `;name=value` parameter tail, the comma list walk,
//! the canonical rendering — lives here and behaves identically for every
//! header.

use std::fmt;

use smol_str::SmolStr;

use crate::params::{ParamName, Parameters};
use crate::qvalue::QValue;
use crate::syntax::{strip_comments, Cursor, ParseError};

/// A header value that can report whether it is the `*` wildcard and render
/// itself as wire text.
pub trait FieldValue: fmt::Display {
    fn is_wildcard(&self) -> bool {
        false
    }
}

/// The contract-violation error of the wildcard/concrete matching
/// predicate.
///
/// The candidate side of a match is content an origin produced; content is
/// never a wildcard, so handing one in is a programming error, not a parse
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    WildcardCandidate,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::WildcardCandidate => {
                write!(f, "match candidate must be a concrete value, not a wildcard")
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// Grammar switches for one header family.
///
/// Built with const chaining:
///
/// ```
/// use hdr_core::Syntax;
///
/// const ACCEPT_ENCODING: Syntax = Syntax::new("Accept-Encoding value").with_wildcard();
/// assert!(ACCEPT_ENCODING.allows_wildcard);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Syntax {
    /// Whether a lone `*` is a legal value.
    pub allows_wildcard: bool,
    /// Whether `(...)` comments are removed before tokenizing.
    pub allows_comments: bool,
    /// Whether `\x` escapes are decoded inside quoted strings.
    pub allows_escaping: bool,
    /// Whether `;name=value` parameters may follow the value.
    pub allows_parameters: bool,
    /// Characters accepted inside the primary token in addition to the
    /// token alphabet (the `/` of a media range).
    pub extra_value_chars: &'static [char],
    /// What the value is called in `MissingValue` errors.
    pub value_label: &'static str,
}

impl Syntax {
    pub const fn new(value_label: &'static str) -> Self {
        Self {
            allows_wildcard: false,
            allows_comments: false,
            allows_escaping: true,
            allows_parameters: true,
            extra_value_chars: &[],
            value_label,
        }
    }

    pub const fn with_wildcard(mut self) -> Self {
        self.allows_wildcard = true;
        self
    }

    pub const fn with_comments(mut self) -> Self {
        self.allows_comments = true;
        self
    }

    pub const fn without_escaping(mut self) -> Self {
        self.allows_escaping = false;
        self
    }

    pub const fn without_parameters(mut self) -> Self {
        self.allows_parameters = false;
        self
    }

    pub const fn with_extra_value_chars(mut self, extra: &'static [char]) -> Self {
        self.extra_value_chars = extra;
        self
    }

    fn missing_value(&self, position: usize) -> ParseError {
        ParseError::MissingValue {
            label: SmolStr::new(self.value_label),
            position,
        }
    }
}

/// A primary value paired with its ordered parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameterized<V> {
    value: V,
    params: Parameters,
}

impl<V> Parameterized<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            params: Parameters::new(),
        }
    }

    pub fn with_parameters(value: V, params: Parameters) -> Self {
        Self { value, params }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Returns a value carrying `params`, or `self` unchanged when the new
    /// set equals the current one. A no-op replacement keeps the value's
    /// identity.
    pub fn set_parameters(self, params: Parameters) -> Self {
        if self.params == params {
            self
        } else {
            Self {
                value: self.value,
                params,
            }
        }
    }

    /// The effective q-factor: the `q` parameter, or 1.0 when absent.
    pub fn weight(&self) -> QValue {
        self.params.q_value()
    }
}

impl<V: fmt::Display> fmt::Display for Parameterized<V> {
    /// Canonical rendering: the value, then `"; "`-separated parameters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.params.write_suffix(&mut out, true);
        write!(f, "{}{}", self.value, out)
    }
}

impl<V: FieldValue> FieldValue for Parameterized<V> {
    fn is_wildcard(&self) -> bool {
        self.value.is_wildcard()
    }
}

/// Parses one value element (token or wildcard, plus parameter tail) at the
/// cursor, using `build` to construct the typed value.
///
/// `build` receives the raw token and its byte offset so family-specific
/// validation can point at absolute positions.
pub fn parse_element<'a, V>(
    cur: &mut Cursor<'a>,
    syntax: &Syntax,
    build: &impl Fn(&'a str, usize) -> Result<V, ParseError>,
) -> Result<Parameterized<V>, ParseError> {
    cur.skip_ows();
    let start = cur.position();
    let token = match cur.read_token_with(syntax.extra_value_chars) {
        Some(token) => token,
        None => {
            return Err(match cur.peek() {
                None => syntax.missing_value(start),
                Some(c) => ParseError::InvalidCharacter {
                    position: start,
                    found: c,
                },
            })
        }
    };
    if token == "*" && !syntax.allows_wildcard {
        return Err(ParseError::InvalidCharacter {
            position: start,
            found: '*',
        });
    }
    let value = build(token, start)?;
    let params = parse_parameter_tail(cur, syntax)?;
    Ok(Parameterized::with_parameters(value, params))
}

/// Parses the `*( OWS ";" OWS name "=" value )` tail after a value.
pub fn parse_parameter_tail(cur: &mut Cursor<'_>, syntax: &Syntax) -> Result<Parameters, ParseError> {
    let mut params = Parameters::new();
    if !syntax.allows_parameters {
        return Ok(params);
    }
    loop {
        let checkpoint = cur.position();
        cur.skip_ows();
        if cur.peek() != Some(';') {
            cur.rewind(checkpoint);
            return Ok(params);
        }
        cur.bump();
        cur.skip_ows();
        let name_start = cur.position();
        let name = match cur.read_token() {
            Some(name) => name,
            None => return Err(ParseError::MissingParameterName { position: name_start }),
        };
        let name = ParamName::from_token(name);
        cur.skip_ows();
        if cur.peek() != Some('=') {
            return Err(ParseError::MissingParameterValue {
                position: cur.position(),
            });
        }
        cur.bump();
        cur.skip_ows();
        let value_start = cur.position();
        let value = match cur.peek() {
            Some('"') => cur.read_quoted(syntax.allows_escaping)?,
            Some(c) if crate::syntax::is_token_char(c) => match cur.read_token() {
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
        if name.is_q() && QValue::parse(&value).is_none() {
            return Err(ParseError::InvalidQValue {
                position: value_start,
            });
        }
        params.push_parsed(name, value, name_start)?;
    }
}

/// Parses a complete single-valued field: one element and nothing after it.
pub fn parse_single<V>(
    text: &str,
    syntax: &Syntax,
    build: impl Fn(&str, usize) -> Result<V, ParseError>,
) -> Result<Parameterized<V>, ParseError> {
    with_comments_stripped(text, syntax, |text| {
        let mut cur = Cursor::new(text);
        let value = parse_element(&mut cur, syntax, &build)?;
        cur.skip_ows();
        cur.expect_end()?;
        Ok(value)
    })
}

/// Parses a comma-separated list of standard elements.
///
/// Empty elements — a leading, trailing or doubled comma — are rejected
/// with `MissingValue` at the separator. Families with q semantics sort the
/// result themselves; the parse order is preserved here.
pub fn parse_list<V>(
    text: &str,
    syntax: &Syntax,
    build: impl Fn(&str, usize) -> Result<V, ParseError>,
) -> Result<Vec<Parameterized<V>>, ParseError> {
    parse_list_with(text, syntax, |cur| parse_element(cur, syntax, &build))
}

/// Parses a comma-separated list whose elements are read by `element`.
///
/// This is the escape hatch for families whose element grammar does not fit
/// [`parse_element`], such as entity tags.
pub fn parse_list_with<V>(
    text: &str,
    syntax: &Syntax,
    mut element: impl FnMut(&mut Cursor<'_>) -> Result<V, ParseError>,
) -> Result<Vec<V>, ParseError> {
    with_comments_stripped(text, syntax, |text| {
        let mut cur = Cursor::new(text);
        let mut out = Vec::new();
        let mut last_sep = None;
        loop {
            cur.skip_ows();
            if cur.is_at_end() || cur.peek() == Some(',') {
                let position = match cur.peek() {
                    Some(_) => cur.position(),
                    None => last_sep.unwrap_or_else(|| cur.position()),
                };
                return Err(syntax.missing_value(position));
            }
            out.push(element(&mut cur)?);
            cur.skip_ows();
            match cur.peek() {
                None => return Ok(out),
                Some(',') => {
                    last_sep = Some(cur.position());
                    cur.bump();
                }
                Some(c) => {
                    return Err(ParseError::InvalidCharacter {
                        position: cur.position(),
                        found: c,
                    })
                }
            }
        }
    })
}

/// Renders a list back to its canonical `", "`-joined wire form.
pub fn render_list<V: fmt::Display>(items: &[V]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(&item.to_string());
    }
    out
}

fn with_comments_stripped<T>(
    text: &str,
    syntax: &Syntax,
    parse: impl FnOnce(&str) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    if syntax.allows_comments {
        let stripped = strip_comments(text)?;
        parse(&stripped)
    } else {
        parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: Syntax = Syntax::new("test value");
    const WILD: Syntax = Syntax::new("test value").with_wildcard();
    const COMMENTED: Syntax = Syntax::new("test value").with_comments();

    fn token(text: &str, _at: usize) -> Result<SmolStr, ParseError> {
        Ok(SmolStr::new(text))
    }

    #[test]
    fn single_token_with_parameters() {
        let v = parse_single("gzip ; q=0.5 ; level=1", &PLAIN, token).unwrap();
        assert_eq!(v.value(), "gzip");
        assert_eq!(v.parameters().len(), 2);
        assert_eq!(v.parameters().get_str("q"), Some("0.5"));
        assert_eq!(v.weight(), QValue::parse("0.5").unwrap());
    }

    #[test]
    fn wildcard_needs_permission() {
        assert!(parse_single("*", &WILD, token).is_ok());
        assert_eq!(
            parse_single("*", &PLAIN, token),
            Err(ParseError::InvalidCharacter {
                position: 0,
                found: '*'
            })
        );
    }

    #[test]
    fn whitespace_may_not_split_a_token() {
        assert_eq!(
            parse_single("gz ip", &PLAIN, token),
            Err(ParseError::InvalidCharacter {
                position: 3,
                found: 'i'
            })
        );
    }

    #[test]
    fn empty_input_is_a_missing_value() {
        assert_eq!(
            parse_single("", &PLAIN, token),
            Err(ParseError::MissingValue {
                label: SmolStr::new("test value"),
                position: 0
            })
        );
    }

    #[test]
    fn comment_rejected_when_not_allowed() {
        assert_eq!(
            parse_single("gzip(abc)", &PLAIN, token),
            Err(ParseError::InvalidCharacter {
                position: 4,
                found: '('
            })
        );
    }

    #[test]
    fn comment_stripped_when_allowed() {
        let v = parse_single("gzip (a comment)", &COMMENTED, token).unwrap();
        assert_eq!(v.value(), "gzip");
    }

    #[test]
    fn parameter_name_required_after_semicolon() {
        assert_eq!(
            parse_single("gzip;", &PLAIN, token),
            Err(ParseError::MissingParameterName { position: 5 })
        );
        assert_eq!(
            parse_single("gzip; =1", &PLAIN, token),
            Err(ParseError::MissingParameterName { position: 6 })
        );
    }

    #[test]
    fn parameter_value_required_after_name() {
        assert_eq!(
            parse_single("gzip;q", &PLAIN, token),
            Err(ParseError::MissingParameterValue { position: 6 })
        );
        assert_eq!(
            parse_single("gzip;q=", &PLAIN, token),
            Err(ParseError::MissingParameterValue { position: 7 })
        );
    }

    #[test]
    fn quoted_parameter_values_decode() {
        let v = parse_single("attachment; filename=\"two words\"", &PLAIN, token).unwrap();
        assert_eq!(v.parameters().get_str("filename"), Some("two words"));
    }

    #[test]
    fn invalid_q_parameter_is_rejected() {
        assert_eq!(
            parse_single("gzip;q=1.5", &PLAIN, token),
            Err(ParseError::InvalidQValue { position: 7 })
        );
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        assert_eq!(
            parse_single("gzip;q=0.5;q=0.8", &PLAIN, token),
            Err(ParseError::DuplicateParameter {
                name: SmolStr::new("q"),
                position: 11
            })
        );
    }

    #[test]
    fn list_splits_on_commas_with_optional_whitespace() {
        let items = parse_list("a, b ,c", &PLAIN, token).unwrap();
        let values: Vec<&str> = items.iter().map(|i| i.value().as_str()).collect();
        assert_eq!(values, ["a", "b", "c"]);
    }

    #[test]
    fn empty_list_elements_are_rejected_at_the_separator() {
        assert_eq!(
            parse_list(", a", &PLAIN, token),
            Err(ParseError::MissingValue {
                label: SmolStr::new("test value"),
                position: 0
            })
        );
        assert_eq!(
            parse_list("a,,b", &PLAIN, token),
            Err(ParseError::MissingValue {
                label: SmolStr::new("test value"),
                position: 2
            })
        );
        assert_eq!(
            parse_list("a, b,", &PLAIN, token),
            Err(ParseError::MissingValue {
                label: SmolStr::new("test value"),
                position: 4
            })
        );
    }

    #[test]
    fn set_parameters_is_identity_for_equal_sets() {
        let params = Parameters::new().with(ParamName::q(), "0.5").unwrap();
        let v = Parameterized::with_parameters(SmolStr::new("gzip"), params.clone());
        let same = v.clone().set_parameters(params);
        assert_eq!(same, v);

        let replaced = v
            .clone()
            .set_parameters(Parameters::new().with(ParamName::q(), "0.8").unwrap());
        assert_ne!(replaced, v);
        assert_eq!(replaced.value(), v.value());
    }

    #[test]
    fn parameters_are_read_only() {
        let v = parse_single("gzip;q=0.5", &PLAIN, token).unwrap();
        let params = v.parameters();

        // Read access works.
        assert_eq!(params.get_str("q"), Some("0.5"));
        assert_eq!(params.len(), 1);

        // These should NOT compile:
        // params.push_parsed(ParamName::q(), SmolStr::new("1"), 0);  // ← no &mut through a shared view
        // params.0.push((ParamName::q(), SmolStr::new("1")));        // ← private field
    }

    #[test]
    fn canonical_display_uses_single_spaces() {
        let v = parse_single("gzip  ;  q=0.5", &PLAIN, token).unwrap();
        assert_eq!(v.to_string(), "gzip; q=0.5");
    }

    #[test]
    fn render_list_joins_canonically() {
        let items = parse_list("a;q=0.5 ,b", &PLAIN, token).unwrap();
        assert_eq!(render_list(&items), "a; q=0.5, b");
    }
}
