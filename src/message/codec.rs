//! Hydration of messages from wire data.
//!
//! Serialization lives on [`TiipMessage`] itself (`Serialize` and
//! `Display`); this module owns the reverse direction: JSON text or a JSON
//! object map into a validated message, under a configurable
//! protocol-version policy.

use mockable::Clock;
use serde_json::{Map, Value};

use super::domain::{Field, TiipMessage};
use super::error::{TiipError, json_type_name};
use super::versioning::{self, ProtocolVersion};

/// Protocol-version policy applied when hydrating a message from wire data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionCheck {
    /// The input must declare exactly the current protocol version.
    #[default]
    Verify,
    /// No check. Input declaring the legacy generation is upgraded on the
    /// fly; anything else is taken as-is.
    Lenient,
}

impl TiipMessage {
    /// Hydrates a message from JSON wire text.
    ///
    /// The text must parse as a JSON object; its fields are then applied as
    /// in [`TiipMessage::from_map`].
    ///
    /// # Errors
    ///
    /// Returns [`TiipError::MalformedJson`] for unparseable text,
    /// [`TiipError::NotAnObject`] for a non-object root, and any error
    /// `from_map` can produce.
    ///
    /// # Examples
    ///
    /// ```
    /// use mockable::DefaultClock;
    /// use tiip::{TiipMessage, VersionCheck};
    ///
    /// let clock = DefaultClock;
    /// let message = TiipMessage::from_json(
    ///     r#"{"pv":"tiip.3.0","ts":"2000-01-01T01:23:45.678901Z","sig":"ping"}"#,
    ///     VersionCheck::Verify,
    ///     &clock,
    /// )
    /// .expect("valid wire text");
    /// assert_eq!(message.signal(), Some("ping"));
    /// ```
    pub fn from_json(
        text: &str,
        check: VersionCheck,
        clock: &impl Clock,
    ) -> Result<Self, TiipError> {
        let document: Value =
            serde_json::from_str(text).map_err(|err| TiipError::MalformedJson(err.to_string()))?;
        match document {
            Value::Object(map) => Self::from_map(map, check, clock),
            other => Err(TiipError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Hydrates a message from a JSON object map.
    ///
    /// Each known field present in the map (presence, not value, decides) is
    /// applied through the validated setter, in canonical field order.
    /// Unknown keys are ignored. Absent fields keep their defaults: a fresh
    /// clock timestamp, the current protocol version, everything else unset.
    ///
    /// Under [`VersionCheck::Lenient`], input declaring the legacy
    /// generation is first rewritten by the version bridge.
    ///
    /// # Errors
    ///
    /// Returns [`TiipError::VersionMismatch`] when verification is on and
    /// the declared version differs from the current one (or is missing),
    /// plus any setter or bridge error.
    pub fn from_map(
        mut map: Map<String, Value>,
        check: VersionCheck,
        clock: &impl Clock,
    ) -> Result<Self, TiipError> {
        match check {
            VersionCheck::Verify => verify_version(&map)?,
            VersionCheck::Lenient => {
                if declared_version(&map) == Some(ProtocolVersion::Tiip2) {
                    versioning::bridge::upgrade_legacy(&mut map)?;
                }
            }
        }

        let mut message = Self::new(clock);
        for field in Field::ORDER {
            if field == Field::ProtocolVersion {
                continue;
            }
            if let Some(value) = map.shift_remove(field.key()) {
                message.set(field, value)?;
            }
        }
        Ok(message)
    }
}

fn declared_version(map: &Map<String, Value>) -> Option<ProtocolVersion> {
    map.get(Field::ProtocolVersion.key())
        .and_then(Value::as_str)
        .and_then(|text| text.parse().ok())
}

fn verify_version(map: &Map<String, Value>) -> Result<(), TiipError> {
    let declared = map.get(Field::ProtocolVersion.key());
    if declared.and_then(Value::as_str) == Some(ProtocolVersion::CURRENT.as_str()) {
        return Ok(());
    }
    Err(TiipError::VersionMismatch {
        expected: ProtocolVersion::CURRENT.as_str(),
        actual: declared.map_or_else(|| "missing".to_owned(), render_declared),
    })
}

fn render_declared(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_owned)
}
