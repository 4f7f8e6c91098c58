//! The TIIP message envelope and its wire codec.
//!
//! # Architecture
//!
//! - **Domain**: the validated field store ([`domain::TiipMessage`],
//!   [`domain::Field`]) whose setters are the single validation choke point
//! - **Codec**: JSON text/map hydration and canonical serialization
//!   ([`codec::VersionCheck`], the `Serialize`/`Display` impls)
//! - **Versioning**: protocol generations and the bridge between them
//!   ([`versioning::ProtocolVersion`], [`TiipMessage::as_version`])
//!
//! Every construction path (builder, map, JSON text) funnels each field
//! through the same validated setter, so no invalid message state is
//! reachable.
//!
//! [`TiipMessage::as_version`]: domain::TiipMessage::as_version

pub mod codec;
pub mod domain;
pub mod error;
pub mod versioning;

#[cfg(test)]
mod tests;
