//! Error types for envelope validation, parsing and version conversion.
//!
//! Uses `thiserror` for typed variants that callers can inspect. Every
//! failure is raised synchronously at the point of assignment or parsing and
//! leaves the affected field unchanged.

use serde_json::Value;
use thiserror::Error;

use super::domain::Field;

/// Broad classification of a [`TiipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The wrong category of value was presented (e.g. a number given to a
    /// string field).
    Type,
    /// The right category with unacceptable content (e.g. unparseable
    /// timestamp text, or an unknown protocol version).
    Value,
    /// The wire text itself was not valid JSON.
    Parse,
}

/// Errors raised by envelope setters, the codec and the version bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TiipError {
    /// A field setter was given a value of the wrong JSON category.
    #[error("{field} can only be {expected}, not {actual}")]
    InvalidType {
        /// The field that rejected the value.
        field: Field,
        /// Description of the accepted categories.
        expected: &'static str,
        /// The JSON category that was presented.
        actual: &'static str,
    },

    /// A legacy wire key held a value of the wrong JSON category.
    #[error("{key} can only be {expected}, not {actual}")]
    InvalidLegacyType {
        /// The legacy wire key that rejected the value.
        key: &'static str,
        /// Description of the accepted categories.
        expected: &'static str,
        /// The JSON category that was presented.
        actual: &'static str,
    },

    /// Timestamp text did not parse as an ISO-8601 date-time.
    #[error("timestamp '{0}' is not parseable as an ISO-8601 date-time")]
    UnparseableTimestamp(String),

    /// Latency text did not parse as a float.
    #[error("latency '{0}' is not parseable as a float")]
    UnparseableLatency(String),

    /// The protocol version field cannot be reassigned after construction.
    #[error("protocol version is read-only after construction")]
    ProtocolVersionReadOnly,

    /// Hydration input declared a protocol version other than the one this
    /// crate implements.
    #[error("incorrect protocol version '{actual}', expected '{expected}'")]
    VersionMismatch {
        /// The version this crate implements.
        expected: &'static str,
        /// The version declared by the input, or `missing`.
        actual: String,
    },

    /// A version string named a generation the bridge cannot handle.
    #[error("unsupported protocol version '{0}'; supported versions are tiip.2.0 and tiip.3.0")]
    UnsupportedVersion(String),

    /// A legacy-generation message omitted a field its upgrade requires.
    #[error("legacy message is missing the '{0}' field")]
    MissingLegacyField(Field),

    /// Wire text was not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// Wire text parsed as JSON but its root was not an object.
    #[error("a TIIP message must be a JSON object, not {0}")]
    NotAnObject(&'static str),
}

impl TiipError {
    /// Creates an [`InvalidType`](Self::InvalidType) error for the category
    /// of the rejected value.
    #[must_use]
    pub const fn invalid_type(field: Field, expected: &'static str, actual: &Value) -> Self {
        Self::InvalidType {
            field,
            expected,
            actual: json_type_name(actual),
        }
    }

    /// Returns the broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidType { .. }
            | Self::InvalidLegacyType { .. }
            | Self::ProtocolVersionReadOnly
            | Self::NotAnObject(_) => ErrorKind::Type,
            Self::UnparseableTimestamp(_)
            | Self::UnparseableLatency(_)
            | Self::VersionMismatch { .. }
            | Self::UnsupportedVersion(_)
            | Self::MissingLegacyField(_) => ErrorKind::Value,
            Self::MalformedJson(_) => ErrorKind::Parse,
        }
    }
}

/// Human-readable JSON category name used in type errors.
pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
