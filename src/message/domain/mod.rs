//! Domain types for the TIIP envelope.
//!
//! Pure value types with no I/O. All field mutation goes through validated
//! setters on [`TiipMessage`].

mod field;
mod message;
pub(crate) mod timestamp;

pub use field::Field;
pub use message::{TiipMessage, TiipMessageBuilder};
