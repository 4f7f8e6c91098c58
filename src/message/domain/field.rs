//! Field identifiers and the canonical wire ordering of the envelope.

use std::fmt;

/// Identifies one field of a [`TiipMessage`](super::TiipMessage).
///
/// Each field carries the short key used in the serialized JSON form. The
/// canonical key order of the wire format is [`Field::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Protocol version (`pv`). Read-only after construction.
    ProtocolVersion,
    /// ISO-8601 timestamp (`ts`). Always present.
    Timestamp,
    /// Latency in decimal seconds (`lat`).
    Latency,
    /// Message identifier (`mid`).
    MessageId,
    /// Session identifier (`sid`).
    SessionId,
    /// Message type discriminator (`type`).
    Type,
    /// Source addressing path (`src`), outermost first.
    Source,
    /// Target addressing path (`targ`).
    Target,
    /// Application-level verb or event name (`sig`).
    Signal,
    /// Pub/sub channel name (`ch`).
    Channel,
    /// Structured keyword arguments (`arg`).
    Arguments,
    /// Positional payload values (`pl`).
    Payload,
    /// Success indicator (`ok`).
    Ok,
    /// Multi-tenant scoping identifier (`ten`).
    Tenant,
}

impl Field {
    /// Canonical field order used for serialization and hydration.
    pub const ORDER: [Self; 14] = [
        Self::ProtocolVersion,
        Self::Timestamp,
        Self::Latency,
        Self::MessageId,
        Self::SessionId,
        Self::Type,
        Self::Source,
        Self::Target,
        Self::Signal,
        Self::Channel,
        Self::Arguments,
        Self::Payload,
        Self::Ok,
        Self::Tenant,
    ];

    /// Returns the short wire key for this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ProtocolVersion => "pv",
            Self::Timestamp => "ts",
            Self::Latency => "lat",
            Self::MessageId => "mid",
            Self::SessionId => "sid",
            Self::Type => "type",
            Self::Source => "src",
            Self::Target => "targ",
            Self::Signal => "sig",
            Self::Channel => "ch",
            Self::Arguments => "arg",
            Self::Payload => "pl",
            Self::Ok => "ok",
            Self::Tenant => "ten",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
