// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The converter boundary between a header-name registry and the typed
//! values of `hdr-core`.
//!
//! A registry maps a field name to a codec; this crate defines what a
//! codec is. [`FieldCodec`] is the typed face — `parse`, `encode`,
//! `check` — and [`ErasedFieldCodec`] is the object-safe face a registry
//! stores, working over `Box<dyn Any>` so it can hold codecs for
//! different value types in one table. How the registry stores or looks
//! up the mapping is its own business.
//!
//! Every error carries the [`FieldName`] it happened under, so a caller
//! logging a rejected field sees `Accept-Encoding: invalid character ';'
//! at offset 4` rather than a bare grammar error.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use hdr_core::ParseError;
use smol_str::SmolStr;

mod codecs;

pub use codecs::{
    AcceptCharsetCodec, AcceptCodec, AcceptEncodingCodec, AcceptLanguageCodec, CacheControlCodec,
    ContentDispositionCodec, ContentTypeCodec, ETagCodec, IfNoneMatchCodec,
};

/// A header field name, compared case-insensitively.
///
/// The name is kept as given (`Content-Type` stays `Content-Type`) and
/// only used here as error-message context; storage and lookup belong to
/// the registry.
#[derive(Debug, Clone)]
pub struct FieldName(SmolStr);

impl FieldName {
    /// Validates the name against the token grammar.
    pub fn new(name: &str) -> Result<Self, ParseError> {
        if name.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("field name"),
                position: 0,
            });
        }
        if let Some((idx, c)) = name
            .char_indices()
            .find(|(_, c)| !hdr_core::syntax::is_token_char(*c))
        {
            return Err(ParseError::InvalidCharacter {
                position: idx,
                found: c,
            });
        }
        Ok(FieldName(SmolStr::new(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for FieldName {}

impl Hash for FieldName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversion failure, carrying the field it happened under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field text violated its grammar.
    Syntax { field: FieldName, error: ParseError },
    /// `check` or `encode_any` received a value of the wrong runtime
    /// type.
    TypeMismatch {
        field: FieldName,
        expected: &'static str,
    },
    /// A list field with no elements was asked to render; at least one
    /// element is mandatory on the wire.
    Empty { field: FieldName },
}

impl FieldError {
    pub fn field(&self) -> &FieldName {
        match self {
            FieldError::Syntax { field, .. }
            | FieldError::TypeMismatch { field, .. }
            | FieldError::Empty { field } => field,
        }
    }

    fn syntax(field: &FieldName, error: ParseError) -> Self {
        FieldError::Syntax {
            field: field.clone(),
            error,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Syntax { field, error } => write!(f, "{}: {}", field, error),
            FieldError::TypeMismatch { field, expected } => {
                write!(f, "{}: expected a {} value", field, expected)
            }
            FieldError::Empty { field } => {
                write!(f, "{}: at least one element is required", field)
            }
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::Syntax { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A typed converter for one kind of header field.
///
/// `parse` and `encode` are exact inverses on valid values; `check`
/// validates that an untyped candidate actually is this codec's value
/// type before the registry hands it to `encode_any`.
pub trait FieldCodec {
    type Value: Any;

    /// What `check` failures call the expected type, e.g.
    /// `"AcceptEncoding"`.
    fn expected(&self) -> &'static str;

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError>;

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError>;

    fn check(&self, candidate: &dyn Any, field: &FieldName) -> Result<(), FieldError> {
        if candidate.downcast_ref::<Self::Value>().is_some() {
            Ok(())
        } else {
            Err(FieldError::TypeMismatch {
                field: field.clone(),
                expected: self.expected(),
            })
        }
    }
}

/// The object-safe face of a codec, for registries that store converters
/// for many value types in one table.
pub trait ErasedFieldCodec {
    fn parse_any(&self, text: &str, field: &FieldName) -> Result<Box<dyn Any>, FieldError>;

    fn encode_any(&self, value: &dyn Any, field: &FieldName) -> Result<String, FieldError>;

    fn check(&self, candidate: &dyn Any, field: &FieldName) -> Result<(), FieldError>;
}

impl<C: FieldCodec> ErasedFieldCodec for C {
    fn parse_any(&self, text: &str, field: &FieldName) -> Result<Box<dyn Any>, FieldError> {
        let value = self.parse(text, field)?;
        Ok(Box::new(value))
    }

    fn encode_any(&self, value: &dyn Any, field: &FieldName) -> Result<String, FieldError> {
        let value =
            value
                .downcast_ref::<C::Value>()
                .ok_or_else(|| FieldError::TypeMismatch {
                    field: field.clone(),
                    expected: self.expected(),
                })?;
        self.encode(value, field)
    }

    fn check(&self, candidate: &dyn Any, field: &FieldName) -> Result<(), FieldError> {
        FieldCodec::check(self, candidate, field)
    }
}
