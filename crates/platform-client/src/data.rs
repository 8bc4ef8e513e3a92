//! Typed data-element payload model
//!
//! The platform exchanges payloads as typed elements. The set of supported
//! kinds is a given external interface: scalar kinds, strings, booleans,
//! raw binary, and a handful of media kinds. Binary and media payloads are
//! carried base64-encoded, matching the wire representation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All supported element kind labels, in wire order
pub const ELEMENT_KINDS: &[&str] = &[
    "f32",
    "f64",
    "i8",
    "i16",
    "i32",
    "i64",
    "u8",
    "u16",
    "u32",
    "u64",
    "string",
    "boolean",
    "binary",
    "image/png",
    "image/jpg",
    "audio/mp3",
    "audio/wav",
    "video/mp4",
];

/// Error converting a raw payload into a typed element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The kind label is not one of [`ELEMENT_KINDS`]
    #[error("unknown element kind '{0}'")]
    UnknownKind(String),

    /// The payload does not fit the requested kind
    #[error("payload is not a valid {kind}: expected {expected}")]
    Incompatible {
        kind: &'static str,
        expected: &'static str,
    },
}

/// A single typed platform data element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DataElement {
    #[serde(rename = "f32")]
    F32(f32),
    #[serde(rename = "f64")]
    F64(f64),
    #[serde(rename = "i8")]
    I8(i8),
    #[serde(rename = "i16")]
    I16(i16),
    #[serde(rename = "i32")]
    I32(i32),
    #[serde(rename = "i64")]
    I64(i64),
    #[serde(rename = "u8")]
    U8(u8),
    #[serde(rename = "u16")]
    U16(u16),
    #[serde(rename = "u32")]
    U32(u32),
    #[serde(rename = "u64")]
    U64(u64),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "boolean")]
    Boolean(bool),
    /// Raw bytes, base64 encoded
    #[serde(rename = "binary")]
    Binary(String),
    #[serde(rename = "image/png")]
    ImagePng(String),
    #[serde(rename = "image/jpg")]
    ImageJpg(String),
    #[serde(rename = "audio/mp3")]
    AudioMp3(String),
    #[serde(rename = "audio/wav")]
    AudioWav(String),
    #[serde(rename = "video/mp4")]
    VideoMp4(String),
}

impl DataElement {
    /// The wire label of this element's kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Binary(_) => "binary",
            Self::ImagePng(_) => "image/png",
            Self::ImageJpg(_) => "image/jpg",
            Self::AudioMp3(_) => "audio/mp3",
            Self::AudioWav(_) => "audio/wav",
            Self::VideoMp4(_) => "video/mp4",
        }
    }

    /// Convert a raw JSON payload into an element of the requested kind
    pub fn from_json(kind: &str, value: &serde_json::Value) -> Result<Self, ElementError> {
        fn number(value: &serde_json::Value, kind: &'static str) -> Result<f64, ElementError> {
            value.as_f64().ok_or(ElementError::Incompatible {
                kind,
                expected: "a number",
            })
        }

        fn signed(value: &serde_json::Value, kind: &'static str) -> Result<i64, ElementError> {
            value.as_i64().ok_or(ElementError::Incompatible {
                kind,
                expected: "a signed integer",
            })
        }

        fn unsigned(value: &serde_json::Value, kind: &'static str) -> Result<u64, ElementError> {
            value.as_u64().ok_or(ElementError::Incompatible {
                kind,
                expected: "an unsigned integer",
            })
        }

        fn text(value: &serde_json::Value, kind: &'static str) -> Result<String, ElementError> {
            value
                .as_str()
                .map(|s| s.to_string())
                .ok_or(ElementError::Incompatible {
                    kind,
                    expected: "a base64 string",
                })
        }

        fn narrow<T: TryFrom<i64>>(raw: i64, kind: &'static str) -> Result<T, ElementError> {
            T::try_from(raw).map_err(|_| ElementError::Incompatible {
                kind,
                expected: "an integer in range",
            })
        }

        fn narrow_u<T: TryFrom<u64>>(raw: u64, kind: &'static str) -> Result<T, ElementError> {
            T::try_from(raw).map_err(|_| ElementError::Incompatible {
                kind,
                expected: "an integer in range",
            })
        }

        match kind {
            "f32" => Ok(Self::F32(number(value, "f32")? as f32)),
            "f64" => Ok(Self::F64(number(value, "f64")?)),
            "i8" => Ok(Self::I8(narrow(signed(value, "i8")?, "i8")?)),
            "i16" => Ok(Self::I16(narrow(signed(value, "i16")?, "i16")?)),
            "i32" => Ok(Self::I32(narrow(signed(value, "i32")?, "i32")?)),
            "i64" => Ok(Self::I64(signed(value, "i64")?)),
            "u8" => Ok(Self::U8(narrow_u(unsigned(value, "u8")?, "u8")?)),
            "u16" => Ok(Self::U16(narrow_u(unsigned(value, "u16")?, "u16")?)),
            "u32" => Ok(Self::U32(narrow_u(unsigned(value, "u32")?, "u32")?)),
            "u64" => Ok(Self::U64(unsigned(value, "u64")?)),
            "string" => Ok(Self::String(value.as_str().map(|s| s.to_string()).ok_or(
                ElementError::Incompatible {
                    kind: "string",
                    expected: "a string",
                },
            )?)),
            "boolean" => Ok(Self::Boolean(value.as_bool().ok_or(
                ElementError::Incompatible {
                    kind: "boolean",
                    expected: "a boolean",
                },
            )?)),
            "binary" => Ok(Self::Binary(text(value, "binary")?)),
            "image/png" => Ok(Self::ImagePng(text(value, "image/png")?)),
            "image/jpg" => Ok(Self::ImageJpg(text(value, "image/jpg")?)),
            "audio/mp3" => Ok(Self::AudioMp3(text(value, "audio/mp3")?)),
            "audio/wav" => Ok(Self::AudioWav(text(value, "audio/wav")?)),
            "video/mp4" => Ok(Self::VideoMp4(text(value, "video/mp4")?)),
            other => Err(ElementError::UnknownKind(other.to_string())),
        }
    }

    /// Unwrap this element into a plain JSON value (losing the kind tag)
    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            Self::F32(v) => serde_json::json!(v),
            Self::F64(v) => serde_json::json!(v),
            Self::I8(v) => serde_json::json!(v),
            Self::I16(v) => serde_json::json!(v),
            Self::I32(v) => serde_json::json!(v),
            Self::I64(v) => serde_json::json!(v),
            Self::U8(v) => serde_json::json!(v),
            Self::U16(v) => serde_json::json!(v),
            Self::U32(v) => serde_json::json!(v),
            Self::U64(v) => serde_json::json!(v),
            Self::String(v) => serde_json::json!(v),
            Self::Boolean(v) => serde_json::json!(v),
            Self::Binary(v)
            | Self::ImagePng(v)
            | Self::ImageJpg(v)
            | Self::AudioMp3(v)
            | Self::AudioWav(v)
            | Self::VideoMp4(v) => serde_json::json!(v),
        }
    }
}

/// A named, typed parameter passed to an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name, as declared by the model
    pub name: String,
    /// The parameter's value
    pub data: DataElement,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data: DataElement) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}
