// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity tags (`ETag`, `If-Match`, `If-None-Match`).
//!
//! An entity tag is either the `*` wildcard or an opaque quoted value with
//! a strong or weak validator: `"v1"` is strong, `W/"v1"` is weak, `*`
//! matches anything. The wildcard carries no validator; "any" has no
//! strength.
//!
//! # Matching
//!
//! [`EntityTag::matches`] compares opaque values only: a weak tag and a
//! strong tag with the same value match. This is the comparison conditional
//! request handling is tested against here; the validator-sensitive strong
//! comparison of RFC 7232 §2.3.2 is available separately as
//! [`EntityTag::strong_matches`] for byte-range use.
//!
//! Comparisons run in constant time to keep tag probing uninformative.
//!
//! # Examples
//!
//! ```
//! use hdr_core::EntityTag;
//!
//! let stored = EntityTag::strong("xyzzy").unwrap();
//! let weak = EntityTag::parse("W/\"xyzzy\"").unwrap();
//! assert!(weak.matches(&stored).unwrap());
//! assert!(!weak.strong_matches(&stored).unwrap());
//! assert_eq!(weak.to_string(), "W/\"xyzzy\"");
//! ```

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;
use subtle::ConstantTimeEq;

use crate::syntax::{Cursor, ParseError};
use crate::value::{parse_list_with, render_list, FieldValue, MatchError, Syntax};

/// An entity tag: the wildcard or an opaque value with its validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityTag {
    /// The `*` wildcard of `If-Match` / `If-None-Match`.
    Any,
    /// A concrete tag. `weak` is the `W/` prefix.
    Tag { weak: bool, opaque: SmolStr },
}

impl EntityTag {
    /// Builds a strong tag, validating the opaque value.
    pub fn strong(opaque: &str) -> Result<Self, ParseError> {
        validate_opaque(opaque, 0)?;
        Ok(EntityTag::Tag {
            weak: false,
            opaque: SmolStr::new(opaque),
        })
    }

    /// Builds a weak tag, validating the opaque value.
    pub fn weak(opaque: &str) -> Result<Self, ParseError> {
        validate_opaque(opaque, 0)?;
        Ok(EntityTag::Tag {
            weak: true,
            opaque: SmolStr::new(opaque),
        })
    }

    /// Parses one complete entity-tag field: `*`, `"v"` or `W/"v"`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cur = Cursor::new(text);
        cur.skip_ows();
        let tag = Self::read(&mut cur)?;
        cur.skip_ows();
        cur.expect_end()?;
        Ok(tag)
    }

    /// Reads an entity tag at the cursor, leaving trailing text in place.
    pub fn read(cur: &mut Cursor<'_>) -> Result<Self, ParseError> {
        match cur.peek() {
            Some('*') => {
                cur.bump();
                Ok(EntityTag::Any)
            }
            Some('W') | Some('w') => {
                let at = cur.position();
                cur.bump();
                match cur.peek() {
                    Some('/') => {
                        cur.bump();
                        let opaque = Self::read_opaque(cur)?;
                        Ok(EntityTag::Tag { weak: true, opaque })
                    }
                    Some(c) => Err(ParseError::InvalidCharacter {
                        position: cur.position(),
                        found: c,
                    }),
                    None => Err(ParseError::MissingValue {
                        label: SmolStr::new("entity tag"),
                        position: at + 1,
                    }),
                }
            }
            Some('"') => {
                let opaque = Self::read_opaque(cur)?;
                Ok(EntityTag::Tag {
                    weak: false,
                    opaque,
                })
            }
            Some(c) => Err(ParseError::InvalidCharacter {
                position: cur.position(),
                found: c,
            }),
            None => Err(ParseError::MissingValue {
                label: SmolStr::new("entity tag"),
                position: cur.position(),
            }),
        }
    }

    // Entity tags use the plain quoted form without backslash escaping;
    // '\' is not a legal etagc.
    fn read_opaque(cur: &mut Cursor<'_>) -> Result<SmolStr, ParseError> {
        let start = cur.position();
        let opaque = cur.read_quoted(false)?;
        validate_opaque(&opaque, start + 1)?;
        Ok(opaque)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, EntityTag::Any)
    }

    pub fn is_weak(&self) -> bool {
        matches!(self, EntityTag::Tag { weak: true, .. })
    }

    /// The opaque value, absent for the wildcard.
    pub fn opaque(&self) -> Option<&str> {
        match self {
            EntityTag::Any => None,
            EntityTag::Tag { opaque, .. } => Some(opaque),
        }
    }

    /// Whether this tag matches `candidate`, comparing opaque values only.
    ///
    /// Any weak/strong combination with an identical value matches. The
    /// wildcard matches every concrete tag; a wildcard candidate is a
    /// contract violation, since stored content always has a concrete tag.
    pub fn matches(&self, candidate: &EntityTag) -> Result<bool, MatchError> {
        let EntityTag::Tag { opaque: theirs, .. } = candidate else {
            return Err(MatchError::WildcardCandidate);
        };
        Ok(match self {
            EntityTag::Any => true,
            EntityTag::Tag { opaque: ours, .. } => ct_eq(ours, theirs),
        })
    }

    /// The RFC 7232 strong comparison: both tags strong and identical.
    pub fn strong_matches(&self, candidate: &EntityTag) -> Result<bool, MatchError> {
        let EntityTag::Tag {
            weak: their_weak,
            opaque: theirs,
        } = candidate
        else {
            return Err(MatchError::WildcardCandidate);
        };
        Ok(match self {
            EntityTag::Any => true,
            EntityTag::Tag { weak: true, .. } => false,
            EntityTag::Tag {
                weak: false,
                opaque: ours,
            } => !their_weak && ct_eq(ours, theirs),
        })
    }
}

fn ct_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// Printable ASCII without '"', ' ' or '\'; entity tags use the unescaped
// quoted form, so a backslash could never be read back.
fn validate_opaque(opaque: &str, at: usize) -> Result<(), ParseError> {
    for (idx, c) in opaque.char_indices() {
        let ok = c.is_ascii() && !c.is_ascii_control() && c != '"' && c != ' ' && c != '\\';
        if !ok {
            return Err(ParseError::InvalidCharacter {
                position: at + idx,
                found: c,
            });
        }
    }
    Ok(())
}

impl FieldValue for EntityTag {
    fn is_wildcard(&self) -> bool {
        EntityTag::is_wildcard(self)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityTag::Any => f.write_str("*"),
            EntityTag::Tag { weak, opaque } => {
                if *weak {
                    f.write_str("W/")?;
                }
                write!(f, "\"{}\"", opaque)
            }
        }
    }
}

impl FromStr for EntityTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityTag::parse(s)
    }
}

const LIST: Syntax = Syntax::new("entity tag").with_wildcard();

/// The tag list of `If-Match` / `If-None-Match`, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityTagList(Vec<EntityTag>);

impl EntityTagList {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let tags = parse_list_with(text, &LIST, EntityTag::read)?;
        Ok(EntityTagList(tags))
    }

    pub fn from_tags(tags: Vec<EntityTag>) -> Self {
        EntityTagList(tags)
    }

    pub fn tags(&self) -> &[EntityTag] {
        &self.0
    }

    pub fn into_tags(self) -> Vec<EntityTag> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any listed tag matches `candidate`.
    pub fn matches(&self, candidate: &EntityTag) -> Result<bool, MatchError> {
        for tag in &self.0 {
            if tag.matches(candidate)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for EntityTagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_list(&self.0))
    }
}

impl FromStr for EntityTagList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityTagList::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_forms() {
        assert_eq!(EntityTag::parse("*").unwrap(), EntityTag::Any);
        assert_eq!(
            EntityTag::parse("\"xyzzy\"").unwrap(),
            EntityTag::strong("xyzzy").unwrap()
        );
        assert_eq!(
            EntityTag::parse("W/\"xyzzy\"").unwrap(),
            EntityTag::weak("xyzzy").unwrap()
        );
    }

    #[test]
    fn rendering_is_the_exact_inverse() {
        for text in ["*", "\"xyzzy\"", "W/\"xyzzy\"", "\"\""] {
            assert_eq!(EntityTag::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn bare_tokens_are_rejected() {
        assert_eq!(
            EntityTag::parse("xyzzy"),
            Err(ParseError::InvalidCharacter {
                position: 0,
                found: 'x'
            })
        );
    }

    #[test]
    fn weak_prefix_requires_slash_and_quote() {
        assert!(EntityTag::parse("W\"x\"").is_err());
        assert!(EntityTag::parse("W/x").is_err());
        assert_eq!(
            EntityTag::parse("W/\"x"),
            Err(ParseError::MissingClosingQuote)
        );
    }

    #[test]
    fn opaque_rejects_quotes_and_spaces() {
        assert!(EntityTag::strong("a b").is_err());
        assert!(EntityTag::strong("a\"b").is_err());
        assert!(EntityTag::strong("a\\b").is_err());
        assert!(EntityTag::strong("a\nb").is_err());
        assert!(EntityTag::strong("").is_ok());
    }

    #[test]
    fn match_ignores_the_validator() {
        let strong = EntityTag::strong("v1").unwrap();
        let weak = EntityTag::weak("v1").unwrap();
        let other = EntityTag::strong("v2").unwrap();

        assert!(strong.matches(&strong).unwrap());
        assert!(weak.matches(&strong).unwrap());
        assert!(strong.matches(&weak).unwrap());
        assert!(weak.matches(&weak).unwrap());
        assert!(!strong.matches(&other).unwrap());
        assert!(!weak.matches(&other).unwrap());
    }

    #[test]
    fn strong_match_requires_strong_on_both_sides() {
        let strong = EntityTag::strong("v1").unwrap();
        let weak = EntityTag::weak("v1").unwrap();

        assert!(strong.strong_matches(&strong).unwrap());
        assert!(!weak.strong_matches(&strong).unwrap());
        assert!(!strong.strong_matches(&weak).unwrap());
    }

    #[test]
    fn wildcard_matches_any_concrete_tag() {
        let any = EntityTag::Any;
        assert!(any.matches(&EntityTag::strong("v1").unwrap()).unwrap());
        assert!(any.matches(&EntityTag::weak("v2").unwrap()).unwrap());
        assert_eq!(any.matches(&EntityTag::Any), Err(MatchError::WildcardCandidate));
    }

    #[test]
    fn value_comparison_is_case_sensitive() {
        let lower = EntityTag::strong("abc").unwrap();
        let upper = EntityTag::strong("ABC").unwrap();
        assert!(!lower.matches(&upper).unwrap());
    }

    #[test]
    fn list_parses_and_matches_elementwise() {
        let list = EntityTagList::parse("\"a\", W/\"b\" , \"c\"").unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.matches(&EntityTag::strong("b").unwrap()).unwrap());
        assert!(!list.matches(&EntityTag::strong("d").unwrap()).unwrap());
        assert_eq!(list.to_string(), "\"a\", W/\"b\", \"c\"");
    }

    #[test]
    fn list_rejects_empty_elements() {
        assert_eq!(
            EntityTagList::parse("\"a\",, \"b\""),
            Err(ParseError::MissingValue {
                label: SmolStr::new("entity tag"),
                position: 4
            })
        );
    }

    #[test]
    fn wildcard_list_matches_everything() {
        let list = EntityTagList::parse("*").unwrap();
        assert!(list.matches(&EntityTag::strong("anything").unwrap()).unwrap());
    }
}
