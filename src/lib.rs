//! TIIP (Thin Industrial Internet Protocol) message envelope.
//!
//! This crate implements the TIIP envelope as a pure data/validation/codec
//! unit: a field-validating value object, a canonical JSON wire codec, and a
//! compatibility bridge between the current protocol generation (`tiip.3.0`)
//! and the preceding one (`tiip.2.0`).
//!
//! Transport and persistence are out of scope; callers hand wire text in and
//! take wire text out.
//!
//! # Example
//!
//! ```
//! use mockable::DefaultClock;
//! use tiip::{PROTOCOL_VERSION, TiipMessage, VersionCheck};
//!
//! let clock = DefaultClock;
//! let message = TiipMessage::builder()
//!     .with_signal("startProcess")
//!     .with_ok(true)
//!     .build(&clock)
//!     .expect("valid message");
//! assert_eq!(message.protocol_version().as_str(), PROTOCOL_VERSION);
//!
//! let wire = message.to_string();
//! let parsed = TiipMessage::from_json(&wire, VersionCheck::Verify, &clock)
//!     .expect("round-trip");
//! assert_eq!(parsed, message);
//! ```

pub mod message;

pub use message::codec::VersionCheck;
pub use message::domain::{Field, TiipMessage, TiipMessageBuilder};
pub use message::error::{ErrorKind, TiipError};
pub use message::versioning::{PROTOCOL_VERSION, ProtocolVersion};
