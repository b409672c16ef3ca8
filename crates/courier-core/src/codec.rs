//! Content negotiation and body codecs.
//!
//! Two content types are understood, named by the exact tokens
//! `application/json` and `application/xml`. A `Content-Type` header value is
//! split on `;`, each segment is trimmed, and the first segment equal to one
//! of the tokens wins. Parameters such as `charset=utf-8` are ignored.
//!
//! Serializing a null value produces the empty string, and deserializing the
//! empty string produces the type's null value (`None`, `()`).
//!
//! Field names go on the wire exactly as serde names them. Wire types that
//! follow the `lowerCamelCase` convention used by route parameters declare
//! it with `#[serde(rename_all = "camelCase")]`; the codec itself never
//! rewrites keys, so map data passes through untouched.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Root element name used for XML documents.
pub const XML_ROOT: &str = "value";

/// A body codec failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The header named no supported content type.
    #[error("unsupported content type: {0:?}")]
    Unsupported(String),

    /// JSON encoding or decoding failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// XML encoding or decoding failed.
    #[error("xml: {0}")]
    Xml(String),
}

/// The content types the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// `application/json`
    #[default]
    Json,
    /// `application/xml`
    Xml,
}

impl ContentType {
    /// The JSON token.
    pub const JSON: &'static str = "application/json";
    /// The XML token.
    pub const XML: &'static str = "application/xml";

    /// Returns the header token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => Self::JSON,
            Self::Xml => Self::XML,
        }
    }

    /// Picks the content type named by a `Content-Type` header value.
    ///
    /// ```
    /// use courier_core::ContentType;
    ///
    /// assert_eq!(
    ///     ContentType::negotiate("charset=utf-8; application/json"),
    ///     Some(ContentType::Json)
    /// );
    /// assert_eq!(ContentType::negotiate("text/plain"), None);
    /// ```
    #[must_use]
    pub fn negotiate(header: &str) -> Option<Self> {
        header.split(';').map(str::trim).find_map(|segment| match segment {
            ContentType::JSON => Some(Self::Json),
            ContentType::XML => Some(Self::Xml),
            _ => None,
        })
    }

    /// Like [`negotiate`](Self::negotiate), treating a missing header as
    /// unsupported.
    pub fn from_header(header: Option<&str>) -> Result<Self, CodecError> {
        let header = header.unwrap_or_default();
        Self::negotiate(header).ok_or_else(|| CodecError::Unsupported(header.to_string()))
    }

    /// Encodes a value as body text.
    pub fn encode<T>(&self, value: &T) -> Result<String, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let tree = serde_json::to_value(value)?;
        if tree.is_null() {
            return Ok(String::new());
        }
        match self {
            Self::Json => Ok(serde_json::to_string(&tree)?),
            Self::Xml => quick_xml::se::to_string_with_root(XML_ROOT, value)
                .map_err(|e| CodecError::Xml(e.to_string())),
        }
    }

    /// Decodes body text into a value.
    pub fn decode<T>(&self, text: &str) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        match self {
            Self::Json => Ok(serde_json::from_str(text)?),
            Self::Xml => quick_xml::de::from_str(text).map_err(|e| CodecError::Xml(e.to_string())),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::negotiate(s).ok_or_else(|| CodecError::Unsupported(s.to_string()))
    }
}

impl serde::Serialize for ContentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ContentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
