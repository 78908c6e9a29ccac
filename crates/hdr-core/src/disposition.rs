// decant-rs - The Decant HTTP Header Toolkit
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Content-Disposition` header and its filename parameters.
//!
//! A disposition is a lowercase kind token (`inline`, `attachment`,
//! `form-data`) plus ordered parameters. The filename may arrive two ways:
//! a plain `filename` parameter, or the RFC 5987 `filename*` form
//! `charset'lang'pct-encoded` for non-ASCII names. Both decode into a
//! [`DispositionFilename`]; the extended form wins when both are present.
//!
//! The charset label of an extended filename is carried verbatim — mapping
//! it to a decoder is not this crate's business — but the percent-encoded
//! payload itself is decoded as UTF-8, the only charset RFC 5987 requires.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use smol_str::SmolStr;

use crate::params::{ParamName, Parameters};
use crate::syntax::ParseError;
use crate::value::{parse_single, Syntax};

static INLINE: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("inline"));
static ATTACHMENT: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("attachment"));
static FORM_DATA: Lazy<SmolStr> = Lazy::new(|| SmolStr::new("form-data"));

// Everything outside RFC 5987 attr-char gets percent-encoded. Non-ASCII is
// always encoded by utf8_percent_encode.
const NON_ATTR_CHAR: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'{')
    .add(b'}');

const SYNTAX: Syntax = Syntax::new("Content-Disposition value");

/// The parsed `Content-Disposition` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    kind: SmolStr,
    params: Parameters,
}

impl ContentDisposition {
    /// Builds a disposition with the given kind token and no parameters.
    pub fn new(kind: &str) -> Result<Self, ParseError> {
        if kind.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new(SYNTAX.value_label),
                position: 0,
            });
        }
        if let Some((idx, c)) = kind
            .char_indices()
            .find(|(_, c)| !crate::syntax::is_token_char(*c))
        {
            return Err(ParseError::InvalidCharacter {
                position: idx,
                found: c,
            });
        }
        let lower = kind.to_ascii_lowercase();
        let kind = match lower.as_str() {
            "inline" => INLINE.clone(),
            "attachment" => ATTACHMENT.clone(),
            "form-data" => FORM_DATA.clone(),
            _ => SmolStr::new(lower),
        };
        Ok(Self {
            kind,
            params: Parameters::new(),
        })
    }

    pub fn inline() -> Self {
        Self {
            kind: INLINE.clone(),
            params: Parameters::new(),
        }
    }

    pub fn attachment() -> Self {
        Self {
            kind: ATTACHMENT.clone(),
            params: Parameters::new(),
        }
    }

    pub fn form_data() -> Self {
        Self {
            kind: FORM_DATA.clone(),
            params: Parameters::new(),
        }
    }

    /// Parses a complete field: kind token plus parameters.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let parsed = parse_single(text, &SYNTAX, |token, at| {
            ContentDisposition::new(token).map_err(|e| offset_error(e, at))
        })?;
        let params = parsed.parameters().clone();
        Ok(parsed.into_value().set_parameters(params))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Returns a disposition carrying `params`, or `self` unchanged when
    /// the set is equal.
    pub fn set_parameters(self, params: Parameters) -> Self {
        if self.params == params {
            self
        } else {
            Self { params, ..self }
        }
    }

    /// Returns a disposition with the filename attached: plainly when the
    /// name is ASCII without quote-hostile characters, as `filename*`
    /// otherwise.
    pub fn with_filename(self, name: &DispositionFilename) -> Result<Self, ParseError> {
        let (param, rendered) = name.to_parameter();
        let params = self.params.clone().with(param, rendered)?;
        Ok(self.set_parameters(params))
    }

    /// The filename, decoded. `filename*` wins over `filename` when both
    /// are present.
    pub fn filename(&self) -> Result<Option<DispositionFilename>, ParseError> {
        if let Some(raw) = self.params.get(&ParamName::filename_ext()) {
            return DispositionFilename::decode_extended(raw).map(Some);
        }
        Ok(self
            .params
            .get(&ParamName::filename())
            .map(DispositionFilename::plain))
    }
}

fn offset_error(e: ParseError, at: usize) -> ParseError {
    match e {
        ParseError::InvalidCharacter { position, found } => ParseError::InvalidCharacter {
            position: at + position,
            found,
        },
        ParseError::MissingValue { label, position } => ParseError::MissingValue {
            label,
            position: at + position,
        },
        other => other,
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str(&self.kind);
        self.params.write_suffix(&mut out, true);
        f.write_str(&out)
    }
}

impl FromStr for ContentDisposition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentDisposition::parse(s)
    }
}

/// A decoded disposition filename.
///
/// Either not-encoded (a plain `filename` value) or RFC 5987 encoded with
/// its charset label and optional language tag. The decoded text is always
/// held here; encoding only happens on the way back to the wire.
#[derive(Debug)]
pub struct DispositionFilename {
    charset: Option<SmolStr>,
    language: Option<SmolStr>,
    value: SmolStr,
    // Memoized without_path() result for names that contain a path
    // separator. Excluded from equality, hash and clone; a lost race
    // recomputes an identical instance and drops it.
    stripped: OnceLock<Box<DispositionFilename>>,
}

impl DispositionFilename {
    /// A not-encoded filename.
    pub fn plain(value: impl AsRef<str>) -> Self {
        Self {
            charset: None,
            language: None,
            value: SmolStr::new(value.as_ref()),
            stripped: OnceLock::new(),
        }
    }

    /// An RFC 5987 encoded filename with its charset and optional
    /// language.
    pub fn extended(
        charset: impl AsRef<str>,
        language: Option<&str>,
        value: impl AsRef<str>,
    ) -> Self {
        Self {
            charset: Some(SmolStr::new(charset.as_ref())),
            language: language.map(SmolStr::new),
            value: SmolStr::new(value.as_ref()),
            stripped: OnceLock::new(),
        }
    }

    /// Decodes the `charset'lang'pct-encoded` form of a `filename*`
    /// parameter value.
    pub fn decode_extended(raw: &str) -> Result<Self, ParseError> {
        let Some((charset, rest)) = raw.split_once('\'') else {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("filename* charset"),
                position: raw.len(),
            });
        };
        let Some((language, encoded)) = rest.split_once('\'') else {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("filename* language"),
                position: raw.len(),
            });
        };
        if charset.is_empty() {
            return Err(ParseError::MissingValue {
                label: SmolStr::new("filename* charset"),
                position: 0,
            });
        }
        let decoded = percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|_| ParseError::InvalidCharacter {
                position: charset.len() + language.len() + 2,
                found: '%',
            })?;
        Ok(Self {
            charset: Some(SmolStr::new(charset)),
            language: if language.is_empty() {
                None
            } else {
                Some(SmolStr::new(language))
            },
            value: SmolStr::new(decoded.as_ref()),
            stripped: OnceLock::new(),
        })
    }

    /// True for the RFC 5987 encoded variant.
    pub fn is_extended(&self) -> bool {
        self.charset.is_some()
    }

    /// The charset label of an extended filename, verbatim.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// The language tag of an extended filename, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The decoded filename text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The filename with any path prefix removed.
    ///
    /// Returns `self` when the name holds no `/` or `\` separator — the
    /// common case pays nothing. Otherwise an instance holding the final
    /// segment is computed once per filename and reused on every call.
    pub fn without_path(&self) -> &DispositionFilename {
        let Some(cut) = self.value.rfind(['/', '\\']) else {
            return self;
        };
        self.stripped.get_or_init(|| {
            Box::new(Self {
                charset: self.charset.clone(),
                language: self.language.clone(),
                value: SmolStr::new(&self.value[cut + 1..]),
                stripped: OnceLock::new(),
            })
        })
    }

    /// The parameter this filename serializes to: `filename` with the
    /// plainly representable value, or `filename*` with the RFC 5987
    /// encoding.
    pub fn to_parameter(&self) -> (ParamName, String) {
        if self.is_extended() || !self.value.is_ascii() {
            (ParamName::filename_ext(), self.encode_extended())
        } else {
            (ParamName::filename(), self.value.to_string())
        }
    }

    fn encode_extended(&self) -> String {
        let charset = self.charset.as_deref().unwrap_or("UTF-8");
        let language = self.language.as_deref().unwrap_or("");
        format!(
            "{}'{}'{}",
            charset,
            language,
            utf8_percent_encode(&self.value, NON_ATTR_CHAR)
        )
    }
}

impl Clone for DispositionFilename {
    fn clone(&self) -> Self {
        Self {
            charset: self.charset.clone(),
            language: self.language.clone(),
            value: self.value.clone(),
            stripped: OnceLock::new(),
        }
    }
}

impl PartialEq for DispositionFilename {
    fn eq(&self, other: &Self) -> bool {
        self.charset == other.charset
            && self.language == other.language
            && self.value == other.value
    }
}

impl Eq for DispositionFilename {}

impl std::hash::Hash for DispositionFilename {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.charset.hash(state);
        self.language.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for DispositionFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_filename() {
        let cd = ContentDisposition::parse("attachment; filename=\"report.pdf\"").unwrap();
        assert_eq!(cd.kind(), "attachment");
        let name = cd.filename().unwrap().unwrap();
        assert!(!name.is_extended());
        assert_eq!(name.value(), "report.pdf");
    }

    #[test]
    fn kind_is_lowercased() {
        let cd = ContentDisposition::parse("Attachment").unwrap();
        assert_eq!(cd, ContentDisposition::attachment());
    }

    #[test]
    fn extended_filename_wins_over_plain() {
        let cd = ContentDisposition::parse(
            "attachment; filename=\"fallback.txt\"; filename*=UTF-8''na%C3%AFve.txt",
        )
        .unwrap();
        let name = cd.filename().unwrap().unwrap();
        assert!(name.is_extended());
        assert_eq!(name.charset(), Some("UTF-8"));
        assert_eq!(name.language(), None);
        assert_eq!(name.value(), "naïve.txt");
    }

    #[test]
    fn extended_decoding_carries_the_language() {
        let name = DispositionFilename::decode_extended("UTF-8'en'rate%20sheet.pdf").unwrap();
        assert_eq!(name.language(), Some("en"));
        assert_eq!(name.value(), "rate sheet.pdf");
    }

    #[test]
    fn malformed_extended_values_are_rejected() {
        assert!(DispositionFilename::decode_extended("no-apostrophes").is_err());
        assert!(DispositionFilename::decode_extended("UTF-8'only-one").is_err());
        assert!(DispositionFilename::decode_extended("''empty-charset").is_err());
        assert!(DispositionFilename::decode_extended("UTF-8''bad%ZZ%FF").is_err());
    }

    #[test]
    fn extended_round_trips_through_the_parameter_form() {
        let original = DispositionFilename::extended("UTF-8", Some("en"), "naïve plan.txt");
        let (param, rendered) = original.to_parameter();
        assert_eq!(param, ParamName::filename_ext());
        assert_eq!(rendered, "UTF-8'en'na%C3%AFve%20plan.txt");
        let decoded = DispositionFilename::decode_extended(&rendered).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn plain_ascii_names_stay_plain() {
        let name = DispositionFilename::plain("report.pdf");
        let (param, rendered) = name.to_parameter();
        assert_eq!(param, ParamName::filename());
        assert_eq!(rendered, "report.pdf");
    }

    #[test]
    fn non_ascii_plain_names_promote_to_extended() {
        let name = DispositionFilename::plain("naïve.txt");
        let (param, rendered) = name.to_parameter();
        assert_eq!(param, ParamName::filename_ext());
        assert_eq!(rendered, "UTF-8''na%C3%AFve.txt");
    }

    #[test]
    fn without_path_returns_self_when_no_separator() {
        let name = DispositionFilename::plain("plain.txt");
        assert!(std::ptr::eq(name.without_path(), &name));
    }

    #[test]
    fn without_path_is_memoized() {
        let name = DispositionFilename::plain("/var/tmp/export.csv");
        let first = name.without_path();
        let second = name.without_path();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.value(), "export.csv");
        assert!(!std::ptr::eq(first, &name));
    }

    #[test]
    fn without_path_handles_backslashes() {
        let name = DispositionFilename::plain("C:\\Users\\jf\\export.csv");
        assert_eq!(name.without_path().value(), "export.csv");
    }

    #[test]
    fn memo_cell_does_not_affect_equality() {
        let a = DispositionFilename::plain("/tmp/x.txt");
        let b = DispositionFilename::plain("/tmp/x.txt");
        let _ = a.without_path();
        assert_eq!(a, b);

        let cloned = a.clone();
        assert_eq!(cloned, a);
    }

    #[test]
    fn with_filename_builder_round_trips() {
        let cd = ContentDisposition::attachment()
            .with_filename(&DispositionFilename::plain("summary.csv"))
            .unwrap();
        assert_eq!(cd.to_string(), "attachment; filename=summary.csv");
        assert_eq!(ContentDisposition::parse(&cd.to_string()).unwrap(), cd);
    }

    #[test]
    fn display_quotes_filenames_with_spaces() {
        let cd = ContentDisposition::attachment()
            .with_filename(&DispositionFilename::plain("two words.txt"))
            .unwrap();
        assert_eq!(cd.to_string(), "attachment; filename=\"two words.txt\"");
    }

    #[test]
    fn form_data_with_name_parameter() {
        let cd = ContentDisposition::parse("form-data; name=upload").unwrap();
        assert_eq!(cd.kind(), "form-data");
        assert_eq!(cd.parameters().get_str("name"), Some("upload"));
        assert_eq!(cd.filename().unwrap(), None);
    }
}
