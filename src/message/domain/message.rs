//! The TIIP envelope: a validated field store with a builder.
//!
//! Fields are only mutable through setters that enforce the per-field
//! contracts of the wire format, so a constructed message always holds valid
//! state regardless of which path (builder, map, JSON text) produced it.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Field, timestamp};
use crate::message::error::TiipError;
use crate::message::versioning::{self, ProtocolVersion};

/// A TIIP message envelope.
///
/// Carries protocol metadata (version, timestamp, latency), addressing
/// (source/target paths, channel), identification (message, session and
/// tenant ids) and application data (signal, arguments, payload, success
/// flag).
///
/// # Invariants
///
/// - the protocol version is fixed at construction and cannot be reassigned
/// - the timestamp is always present and parseable as an ISO-8601 date-time
/// - every optional field is either absent or satisfies its constraint
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use tiip::TiipMessage;
///
/// let clock = DefaultClock;
/// let message = TiipMessage::builder()
///     .with_signal("updateValues")
///     .with_source(vec!["plc-gateway".to_owned(), "plc1".to_owned()])
///     .build(&clock)
///     .expect("valid message");
///
/// assert_eq!(message.signal(), Some("updateValues"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiipMessage {
    /// Protocol generation. Fixed at construction.
    #[serde(rename = "pv")]
    protocol_version: ProtocolVersion,

    /// ISO-8601 timestamp. Always present.
    #[serde(rename = "ts")]
    timestamp: String,

    /// Latency in decimal seconds.
    #[serde(rename = "lat", skip_serializing_if = "Option::is_none")]
    latency: Option<String>,

    /// Message identifier.
    #[serde(rename = "mid", skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,

    /// Session identifier.
    #[serde(rename = "sid", skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,

    /// Message type discriminator.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    message_type: Option<String>,

    /// Source addressing path, outermost first.
    #[serde(rename = "src", skip_serializing_if = "Option::is_none")]
    source: Option<Vec<String>>,

    /// Target addressing path.
    #[serde(rename = "targ", skip_serializing_if = "Option::is_none")]
    target: Option<Vec<String>>,

    /// Application-level verb or event name.
    #[serde(rename = "sig", skip_serializing_if = "Option::is_none")]
    signal: Option<String>,

    /// Pub/sub channel name.
    #[serde(rename = "ch", skip_serializing_if = "Option::is_none")]
    channel: Option<String>,

    /// Structured keyword arguments.
    #[serde(rename = "arg", skip_serializing_if = "Option::is_none")]
    arguments: Option<Map<String, Value>>,

    /// Positional payload values.
    #[serde(rename = "pl", skip_serializing_if = "Option::is_none")]
    payload: Option<Vec<Value>>,

    /// Success indicator.
    #[serde(skip_serializing_if = "Option::is_none")]
    ok: Option<bool>,

    /// Multi-tenant scoping identifier.
    #[serde(rename = "ten", skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
}

impl TiipMessage {
    /// Creates an empty message with the current protocol version and a
    /// timestamp taken from the clock (local time, offset included).
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            protocol_version: ProtocolVersion::CURRENT,
            timestamp: timestamp::now(clock),
            latency: None,
            message_id: None,
            session_id: None,
            message_type: None,
            source: None,
            target: None,
            signal: None,
            channel: None,
            arguments: None,
            payload: None,
            ok: None,
            tenant: None,
        }
    }

    /// Returns a builder for constructing messages with multiple fields.
    #[must_use]
    pub const fn builder() -> TiipMessageBuilder {
        TiipMessageBuilder::new()
    }

    /// Returns the protocol generation of this message.
    #[must_use]
    pub const fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    /// Returns the ISO-8601 timestamp.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns the latency in decimal seconds, if set.
    #[must_use]
    pub fn latency(&self) -> Option<&str> {
        self.latency.as_deref()
    }

    /// Returns the message identifier, if set.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Returns the session identifier, if set.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the message type discriminator, if set.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.message_type.as_deref()
    }

    /// Returns the source addressing path, if set.
    #[must_use]
    pub fn source(&self) -> Option<&[String]> {
        self.source.as_deref()
    }

    /// Returns the target addressing path, if set.
    #[must_use]
    pub fn target(&self) -> Option<&[String]> {
        self.target.as_deref()
    }

    /// Returns the signal, if set.
    #[must_use]
    pub fn signal(&self) -> Option<&str> {
        self.signal.as_deref()
    }

    /// Returns the channel name, if set.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Returns the keyword arguments, if set.
    #[must_use]
    pub fn arguments(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_ref()
    }

    /// Returns the payload values, if set.
    #[must_use]
    pub fn payload(&self) -> Option<&[Value]> {
        self.payload.as_deref()
    }

    /// Returns the success indicator, if set.
    #[must_use]
    pub const fn ok(&self) -> Option<bool> {
        self.ok
    }

    /// Returns the tenant identifier, if set.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Assigns a field from a raw JSON value, enforcing its contract.
    ///
    /// This is the single validation choke point: the builder and both
    /// hydration paths funnel every field through it. `Value::Null` clears
    /// optional fields; the timestamp cannot be cleared and the protocol
    /// version cannot be assigned at all.
    ///
    /// # Errors
    ///
    /// Returns a `Type`-kind error for a value of the wrong JSON category,
    /// a `Value`-kind error for unparseable timestamp or latency content,
    /// and [`TiipError::ProtocolVersionReadOnly`] for the version field.
    /// On error the field keeps its previous value.
    pub fn set(&mut self, field: Field, value: Value) -> Result<(), TiipError> {
        match field {
            Field::ProtocolVersion => Err(TiipError::ProtocolVersionReadOnly),
            Field::Timestamp => self.apply_timestamp(value),
            Field::Latency => self.apply_latency(value),
            Field::MessageId => Self::assign_text(&mut self.message_id, field, value),
            Field::SessionId => Self::assign_text(&mut self.session_id, field, value),
            Field::Type => Self::assign_text(&mut self.message_type, field, value),
            Field::Source => Self::assign_path(&mut self.source, field, value),
            Field::Target => Self::assign_path(&mut self.target, field, value),
            Field::Signal => Self::assign_text(&mut self.signal, field, value),
            Field::Channel => Self::assign_text(&mut self.channel, field, value),
            Field::Arguments => Self::assign_object(&mut self.arguments, field, value),
            Field::Payload => Self::assign_array(&mut self.payload, field, value),
            Field::Ok => Self::assign_bool(&mut self.ok, field, value),
            Field::Tenant => Self::assign_text(&mut self.tenant, field, value),
        }
    }

    /// Clears an optional field.
    ///
    /// # Errors
    ///
    /// Fails for the timestamp (a message always has one) and the protocol
    /// version (read-only), with the same errors as [`TiipMessage::set`].
    pub fn clear(&mut self, field: Field) -> Result<(), TiipError> {
        self.set(field, Value::Null)
    }

    /// Sets the timestamp from ISO-8601 text, stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TiipError::UnparseableTimestamp`] if the text does not
    /// parse as a date-time.
    pub fn set_timestamp(&mut self, value: impl Into<String>) -> Result<(), TiipError> {
        let text: String = value.into();
        timestamp::parse(&text)?;
        self.timestamp = text;
        Ok(())
    }

    /// Sets the timestamp from a date-time, rendered as ISO-8601 text with
    /// its UTC offset.
    pub fn set_timestamp_datetime(&mut self, value: &DateTime<FixedOffset>) {
        self.timestamp = timestamp::format(value);
    }

    /// Sets the latency from decimal text, stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TiipError::UnparseableLatency`] if the text does not parse
    /// as a float.
    pub fn set_latency(&mut self, value: impl Into<String>) -> Result<(), TiipError> {
        let text: String = value.into();
        if text.trim().parse::<f64>().is_err() {
            return Err(TiipError::UnparseableLatency(text));
        }
        self.latency = Some(text);
        Ok(())
    }

    /// Sets the latency from a seconds value, rounded to 6 decimal places
    /// and rendered as the shortest round-trippable decimal string.
    pub fn set_latency_seconds(&mut self, seconds: f64) {
        self.latency = Some(timestamp::render_latency(seconds));
    }

    /// Sets the message identifier.
    pub fn set_message_id(&mut self, value: impl Into<String>) {
        self.message_id = Some(value.into());
    }

    /// Sets the session identifier.
    pub fn set_session_id(&mut self, value: impl Into<String>) {
        self.session_id = Some(value.into());
    }

    /// Sets the message type discriminator.
    pub fn set_message_type(&mut self, value: impl Into<String>) {
        self.message_type = Some(value.into());
    }

    /// Sets the source addressing path.
    pub fn set_source(&mut self, value: Vec<String>) {
        self.source = Some(value);
    }

    /// Sets the target addressing path.
    pub fn set_target(&mut self, value: Vec<String>) {
        self.target = Some(value);
    }

    /// Sets the signal.
    pub fn set_signal(&mut self, value: impl Into<String>) {
        self.signal = Some(value.into());
    }

    /// Sets the channel name.
    pub fn set_channel(&mut self, value: impl Into<String>) {
        self.channel = Some(value.into());
    }

    /// Sets the keyword arguments.
    pub fn set_arguments(&mut self, value: Map<String, Value>) {
        self.arguments = Some(value);
    }

    /// Sets the payload values.
    pub fn set_payload(&mut self, value: Vec<Value>) {
        self.payload = Some(value);
    }

    /// Sets the success indicator.
    pub const fn set_ok(&mut self, value: bool) {
        self.ok = Some(value);
    }

    /// Sets the tenant identifier.
    pub fn set_tenant(&mut self, value: impl Into<String>) {
        self.tenant = Some(value.into());
    }

    /// Renders this message in the wire form of the requested generation.
    ///
    /// The current version returns the canonical serialized form unchanged;
    /// the legacy generation is produced by the version bridge, which
    /// re-encodes the timestamp and latency as two absolute epoch-seconds
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`TiipError::UnsupportedVersion`] for any other version
    /// string.
    pub fn as_version(&self, version: &str) -> Result<String, TiipError> {
        match version.parse::<ProtocolVersion>()? {
            ProtocolVersion::Tiip3 => Ok(self.to_string()),
            ProtocolVersion::Tiip2 => versioning::bridge::downgrade(self),
        }
    }

    fn apply_timestamp(&mut self, value: Value) -> Result<(), TiipError> {
        match value {
            Value::String(text) => self.set_timestamp(text),
            other => Err(TiipError::invalid_type(
                Field::Timestamp,
                "an ISO-8601 string or a date-time",
                &other,
            )),
        }
    }

    fn apply_latency(&mut self, value: Value) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                self.latency = None;
                Ok(())
            }
            Value::String(text) => self.set_latency(text),
            Value::Number(number) => {
                let seconds = number
                    .as_f64()
                    .ok_or_else(|| TiipError::UnparseableLatency(number.to_string()))?;
                self.set_latency_seconds(seconds);
                Ok(())
            }
            other => Err(TiipError::invalid_type(
                Field::Latency,
                "a float, a float string or null",
                &other,
            )),
        }
    }

    fn assign_text(
        slot: &mut Option<String>,
        field: Field,
        value: Value,
    ) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                *slot = None;
                Ok(())
            }
            Value::String(text) => {
                *slot = Some(text);
                Ok(())
            }
            other => Err(TiipError::invalid_type(field, "a string or null", &other)),
        }
    }

    fn assign_path(
        slot: &mut Option<Vec<String>>,
        field: Field,
        value: Value,
    ) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                *slot = None;
                Ok(())
            }
            Value::Array(items) => {
                let mut path = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(text) => path.push(text),
                        other => {
                            return Err(TiipError::invalid_type(
                                field,
                                "an array of strings or null",
                                &other,
                            ));
                        }
                    }
                }
                *slot = Some(path);
                Ok(())
            }
            other => Err(TiipError::invalid_type(
                field,
                "an array of strings or null",
                &other,
            )),
        }
    }

    fn assign_object(
        slot: &mut Option<Map<String, Value>>,
        field: Field,
        value: Value,
    ) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                *slot = None;
                Ok(())
            }
            Value::Object(map) => {
                *slot = Some(map);
                Ok(())
            }
            other => Err(TiipError::invalid_type(field, "an object or null", &other)),
        }
    }

    fn assign_array(
        slot: &mut Option<Vec<Value>>,
        field: Field,
        value: Value,
    ) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                *slot = None;
                Ok(())
            }
            Value::Array(items) => {
                *slot = Some(items);
                Ok(())
            }
            other => Err(TiipError::invalid_type(field, "an array or null", &other)),
        }
    }

    fn assign_bool(
        slot: &mut Option<bool>,
        field: Field,
        value: Value,
    ) -> Result<(), TiipError> {
        match value {
            Value::Null => {
                *slot = None;
                Ok(())
            }
            Value::Bool(flag) => {
                *slot = Some(flag);
                Ok(())
            }
            other => Err(TiipError::invalid_type(field, "a boolean or null", &other)),
        }
    }
}

impl fmt::Display for TiipMessage {
    /// Renders the canonical JSON wire form: `pv` and `ts` first, then every
    /// set field in canonical order; absent fields are omitted entirely.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Builder for constructing messages with multiple fields at once.
///
/// Every field goes through the same validated setter as direct assignment,
/// so `build` fails if any staged value violates its field contract.
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use serde_json::json;
/// use tiip::TiipMessage;
///
/// let clock = DefaultClock;
/// let message = TiipMessage::builder()
///     .with_message_id("m-17")
///     .with_signal("readValues")
///     .with_payload(vec![json!(21.5), json!(true)])
///     .build(&clock)
///     .expect("valid message");
/// assert_eq!(message.message_id(), Some("m-17"));
/// ```
#[derive(Debug, Default)]
pub struct TiipMessageBuilder {
    fields: Vec<(Field, Value)>,
}

impl TiipMessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Stages a timestamp from ISO-8601 text, validated at build time.
    #[must_use]
    pub fn with_timestamp(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Timestamp, Value::String(value.into())));
        self
    }

    /// Stages a timestamp from a date-time value.
    #[must_use]
    pub fn with_timestamp_datetime(mut self, value: &DateTime<FixedOffset>) -> Self {
        self.fields
            .push((Field::Timestamp, Value::String(timestamp::format(value))));
        self
    }

    /// Stages a latency from decimal text, validated at build time.
    #[must_use]
    pub fn with_latency(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Latency, Value::String(value.into())));
        self
    }

    /// Stages a latency from a seconds value, rounded to 6 decimal places.
    #[must_use]
    pub fn with_latency_seconds(mut self, seconds: f64) -> Self {
        self.fields
            .push((Field::Latency, Value::String(timestamp::render_latency(seconds))));
        self
    }

    /// Stages the message identifier.
    #[must_use]
    pub fn with_message_id(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::MessageId, Value::String(value.into())));
        self
    }

    /// Stages the session identifier.
    #[must_use]
    pub fn with_session_id(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::SessionId, Value::String(value.into())));
        self
    }

    /// Stages the message type discriminator.
    #[must_use]
    pub fn with_message_type(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Type, Value::String(value.into())));
        self
    }

    /// Stages the source addressing path.
    #[must_use]
    pub fn with_source(mut self, value: Vec<String>) -> Self {
        self.fields.push((
            Field::Source,
            Value::Array(value.into_iter().map(Value::String).collect()),
        ));
        self
    }

    /// Stages the target addressing path.
    #[must_use]
    pub fn with_target(mut self, value: Vec<String>) -> Self {
        self.fields.push((
            Field::Target,
            Value::Array(value.into_iter().map(Value::String).collect()),
        ));
        self
    }

    /// Stages the signal.
    #[must_use]
    pub fn with_signal(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Signal, Value::String(value.into())));
        self
    }

    /// Stages the channel name.
    #[must_use]
    pub fn with_channel(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Channel, Value::String(value.into())));
        self
    }

    /// Stages the keyword arguments.
    #[must_use]
    pub fn with_arguments(mut self, value: Map<String, Value>) -> Self {
        self.fields.push((Field::Arguments, Value::Object(value)));
        self
    }

    /// Stages the payload values.
    #[must_use]
    pub fn with_payload(mut self, value: Vec<Value>) -> Self {
        self.fields.push((Field::Payload, Value::Array(value)));
        self
    }

    /// Stages the success indicator.
    #[must_use]
    pub fn with_ok(mut self, value: bool) -> Self {
        self.fields.push((Field::Ok, Value::Bool(value)));
        self
    }

    /// Stages the tenant identifier.
    #[must_use]
    pub fn with_tenant(mut self, value: impl Into<String>) -> Self {
        self.fields.push((Field::Tenant, Value::String(value.into())));
        self
    }

    /// Builds the message, applying staged fields in order through the
    /// validated setter.
    ///
    /// # Errors
    ///
    /// Returns the first setter error encountered; see [`TiipMessage::set`].
    pub fn build(self, clock: &impl Clock) -> Result<TiipMessage, TiipError> {
        let mut message = TiipMessage::new(clock);
        for (field, value) in self.fields {
            message.set(field, value)?;
        }
        Ok(message)
    }
}
