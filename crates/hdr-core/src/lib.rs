// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed, immutable HTTP header field values.
//!
//! This crate converts between raw header text and typed value objects
//! with full fidelity to the wire grammar (the RFC 7230/7231/6265/5988
//! family), and back again:
//!
//! - **Grammar primitives**: [`Cursor`], the `(...)` comment stripper and
//!   the quoted-string codec in [`syntax`]
//! - **Value model**: [`Parameterized`] values with an ordered,
//!   case-insensitive [`Parameters`] set, and the [`Syntax`]-driven
//!   parsing engine shared by every header family
//! - **Weights**: [`QValue`] q-factors and stable preference ordering
//! - **Families**: [`ContentCoding`]/[`AcceptEncoding`],
//!   [`LanguageTag`]/[`AcceptLanguage`], [`CharsetTag`]/[`AcceptCharset`],
//!   [`MediaType`]/[`Accept`], [`EntityTag`]/[`EntityTagList`],
//!   [`ContentDisposition`]/[`DispositionFilename`], [`CacheControl`]
//!
//! Every value is created through a validating constructor and never
//! mutated afterwards; "setters" return a new instance. Parsing rejects,
//! it never repairs: a malformed field yields a [`ParseError`] naming the
//! offending position, and the caller decides what to do with the field.
//!
//! # Examples
//!
//! ```
//! use hdr_core::{AcceptEncoding, ContentCoding};
//!
//! let accept = AcceptEncoding::parse("gzip;q=0.8, deflate, br;q=0.9").unwrap();
//! let order: Vec<&str> = accept.elements().iter().map(|e| e.value().as_str()).collect();
//! assert_eq!(order, ["deflate", "br", "gzip"]);
//! assert!(accept.accepts(&ContentCoding::gzip()).unwrap());
//! ```

pub mod cache_control;
pub mod charset;
pub mod disposition;
pub mod encoding;
pub mod etag;
pub mod language;
pub mod media_type;
pub mod params;
pub mod qvalue;
pub mod syntax;
pub mod value;

pub use cache_control::{CacheControl, CacheDirective};
pub use charset::{AcceptCharset, CharsetTag};
pub use disposition::{ContentDisposition, DispositionFilename};
pub use encoding::{parse_content_coding, AcceptEncoding, ContentCoding};
pub use etag::{EntityTag, EntityTagList};
pub use language::{AcceptLanguage, LanguageTag};
pub use media_type::{Accept, MediaType};
pub use params::{ParamName, Parameters};
pub use qvalue::{sort_by_weight, QValue};
pub use syntax::{strip_comments, Cursor, ParseError};
pub use value::{
    parse_element, parse_list, parse_list_with, parse_single, render_list, FieldValue, MatchError,
    Parameterized, Syntax,
};
