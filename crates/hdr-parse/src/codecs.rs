//! One codec per header family.
//!
//! Each codec is a unit struct wiring a `hdr-core` type into the
//! [`FieldCodec`] boundary: parse delegates to the family parser and wraps
//! the grammar error with the field name; encode renders the canonical
//! wire form, rejecting an empty list where at least one element is
//! mandatory.

use hdr_core::{
    Accept, AcceptCharset, AcceptEncoding, AcceptLanguage, CacheControl, ContentDisposition,
    EntityTag, EntityTagList, MediaType,
};

use crate::{FieldCodec, FieldError, FieldName};

/// `Accept-Encoding`: a weighted content-coding list.
pub struct AcceptEncodingCodec;

impl FieldCodec for AcceptEncodingCodec {
    type Value = AcceptEncoding;

    fn expected(&self) -> &'static str {
        "AcceptEncoding"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        AcceptEncoding::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

/// `Accept-Language`: a weighted language-range list.
pub struct AcceptLanguageCodec;

impl FieldCodec for AcceptLanguageCodec {
    type Value = AcceptLanguage;

    fn expected(&self) -> &'static str {
        "AcceptLanguage"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        AcceptLanguage::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

/// `Accept-Charset`: a weighted charset list.
pub struct AcceptCharsetCodec;

impl FieldCodec for AcceptCharsetCodec {
    type Value = AcceptCharset;

    fn expected(&self) -> &'static str {
        "AcceptCharset"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        AcceptCharset::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

/// `Accept`: a weighted media-range list.
pub struct AcceptCodec;

impl FieldCodec for AcceptCodec {
    type Value = Accept;

    fn expected(&self) -> &'static str {
        "Accept"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        Accept::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

/// `Content-Type`: exactly one concrete media type.
pub struct ContentTypeCodec;

impl FieldCodec for ContentTypeCodec {
    type Value = MediaType;

    fn expected(&self) -> &'static str {
        "MediaType"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        MediaType::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, _field: &FieldName) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

/// `ETag`: a single entity tag, never the wildcard.
pub struct ETagCodec;

impl FieldCodec for ETagCodec {
    type Value = EntityTag;

    fn expected(&self) -> &'static str {
        "EntityTag"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        let tag = EntityTag::parse(text).map_err(|e| FieldError::syntax(field, e))?;
        if tag.is_wildcard() {
            // An origin's own tag is always concrete; `*` only makes
            // sense in If-Match / If-None-Match.
            return Err(FieldError::syntax(
                field,
                hdr_core::ParseError::InvalidCharacter {
                    position: 0,
                    found: '*',
                },
            ));
        }
        Ok(tag)
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_wildcard() {
            return Err(FieldError::TypeMismatch {
                field: field.clone(),
                expected: "concrete EntityTag",
            });
        }
        Ok(value.to_string())
    }
}

/// `If-None-Match` / `If-Match`: a tag list, `*` allowed.
pub struct IfNoneMatchCodec;

impl FieldCodec for IfNoneMatchCodec {
    type Value = EntityTagList;

    fn expected(&self) -> &'static str {
        "EntityTagList"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        EntityTagList::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

/// `Content-Disposition`: kind token plus filename parameters.
pub struct ContentDispositionCodec;

impl FieldCodec for ContentDispositionCodec {
    type Value = ContentDisposition;

    fn expected(&self) -> &'static str {
        "ContentDisposition"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        ContentDisposition::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, _field: &FieldName) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

/// `Cache-Control`: a directive list.
pub struct CacheControlCodec;

impl FieldCodec for CacheControlCodec {
    type Value = CacheControl;

    fn expected(&self) -> &'static str {
        "CacheControl"
    }

    fn parse(&self, text: &str, field: &FieldName) -> Result<Self::Value, FieldError> {
        CacheControl::parse(text).map_err(|e| FieldError::syntax(field, e))
    }

    fn encode(&self, value: &Self::Value, field: &FieldName) -> Result<String, FieldError> {
        if value.is_empty() {
            return Err(FieldError::Empty {
                field: field.clone(),
            });
        }
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdr_core::{CacheDirective, ParseError, QValue};

    fn field(name: &str) -> FieldName {
        FieldName::new(name).unwrap()
    }

    #[test]
    fn accept_encoding_end_to_end() {
        let f = field("Accept-Encoding");
        let value = AcceptEncodingCodec.parse("gzip; q=0.5, *", &f).unwrap();

        assert_eq!(value.len(), 2);
        assert!(value.elements()[0].value().is_wildcard());
        assert_eq!(value.elements()[0].weight(), QValue::DEFAULT);
        assert_eq!(
            value.elements()[1].weight(),
            QValue::parse("0.5").unwrap()
        );

        let text = AcceptEncodingCodec.encode(&value, &f).unwrap();
        assert_eq!(text, "*, gzip; q=0.5");
        assert_eq!(AcceptEncodingCodec.parse(&text, &f).unwrap(), value);
    }

    #[test]
    fn empty_lists_do_not_encode() {
        let f = field("Accept-Encoding");
        let empty = AcceptEncoding::from_elements(Vec::new());
        assert_eq!(
            AcceptEncodingCodec.encode(&empty, &f),
            Err(FieldError::Empty { field: f.clone() })
        );
    }

    #[test]
    fn syntax_errors_keep_their_position() {
        let f = field("Accept-Encoding");
        let err = AcceptEncodingCodec.parse("gzip(abc)", &f).unwrap_err();
        assert_eq!(
            err,
            FieldError::Syntax {
                field: f,
                error: ParseError::InvalidCharacter {
                    position: 4,
                    found: '('
                }
            }
        );
    }

    #[test]
    fn etag_codec_rejects_the_wildcard_both_ways() {
        let f = field("ETag");
        assert!(ETagCodec.parse("*", &f).is_err());
        assert!(ETagCodec.encode(&EntityTag::Any, &f).is_err());
        assert_eq!(
            ETagCodec.encode(&EntityTag::strong("v1").unwrap(), &f).unwrap(),
            "\"v1\""
        );
    }

    #[test]
    fn if_none_match_accepts_the_wildcard() {
        let f = field("If-None-Match");
        let list = IfNoneMatchCodec.parse("*", &f).unwrap();
        assert!(list.tags()[0].is_wildcard());
        assert_eq!(IfNoneMatchCodec.encode(&list, &f).unwrap(), "*");
    }

    #[test]
    fn content_type_round_trips() {
        let f = field("Content-Type");
        let value = ContentTypeCodec
            .parse("Text/HTML; charset=UTF-8", &f)
            .unwrap();
        let text = ContentTypeCodec.encode(&value, &f).unwrap();
        assert_eq!(text, "text/html; charset=UTF-8");
        assert_eq!(ContentTypeCodec.parse(&text, &f).unwrap(), value);
    }

    #[test]
    fn content_disposition_round_trips() {
        let f = field("Content-Disposition");
        let value = ContentDispositionCodec
            .parse("attachment; filename=\"rate sheet.pdf\"", &f)
            .unwrap();
        let text = ContentDispositionCodec.encode(&value, &f).unwrap();
        assert_eq!(text, "attachment; filename=\"rate sheet.pdf\"");
        assert_eq!(ContentDispositionCodec.parse(&text, &f).unwrap(), value);
    }

    #[test]
    fn cache_control_round_trips() {
        let f = field("Cache-Control");
        let value = CacheControlCodec.parse("no-store, max-age=0", &f).unwrap();
        assert_eq!(value.directives()[0], CacheDirective::no_store());
        assert_eq!(CacheControlCodec.encode(&value, &f).unwrap(), "no-store, max-age=0");
    }

    #[test]
    fn accept_codec_sorts_by_weight() {
        let f = field("Accept");
        let value = AcceptCodec
            .parse("text/html;q=0.9, application/json", &f)
            .unwrap();
        assert_eq!(value.preferred().unwrap(), &MediaType::application_json());
    }
}
