//! Protocol generations and the bridge between them.
//!
//! The envelope schema is versioned; this crate implements the current
//! generation and can translate to and from the immediately preceding one.
//! Translation is deliberately asymmetric: legacy input is upgraded
//! automatically during lenient hydration, while downgrading is an explicit
//! request on egress (see [`TiipMessage::as_version`]).
//!
//! [`TiipMessage::as_version`]: crate::message::domain::TiipMessage::as_version

pub(crate) mod bridge;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::TiipError;

/// The protocol version implemented by this crate, as its wire string.
pub const PROTOCOL_VERSION: &str = ProtocolVersion::CURRENT.as_str();

/// A TIIP protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProtocolVersion {
    /// The legacy generation: two absolute epoch-seconds timestamps, no
    /// latency field.
    #[serde(rename = "tiip.2.0")]
    Tiip2,
    /// The current generation: ISO-8601 timestamp plus optional relative
    /// latency.
    #[serde(rename = "tiip.3.0")]
    Tiip3,
}

impl ProtocolVersion {
    /// The generation implemented by this crate.
    pub const CURRENT: Self = Self::Tiip3;

    /// Returns the wire string for this generation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiip2 => "tiip.2.0",
            Self::Tiip3 => "tiip.3.0",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = TiipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiip.2.0" => Ok(Self::Tiip2),
            "tiip.3.0" => Ok(Self::Tiip3),
            other => Err(TiipError::UnsupportedVersion(other.to_owned())),
        }
    }
}
