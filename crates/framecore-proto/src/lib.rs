//! Envelope and header wire types for the secure message framing core.
//!
//! This crate owns only the *shape* of a frame on the wire: the
//! [`MessageHeader`] fields, the flag bits, the canonical signing byte
//! layout, and the envelope's CBOR encoding. It has no opinion about
//! compression, encryption, signing, or replay defence — those live one
//! layer up, in the framer crate, which is the only place that knows which
//! strategies are configured.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod envelope;
pub mod errors;
pub mod header;

pub use envelope::Envelope;
pub use errors::{ProtocolError, Result};
pub use header::{MessageHeader, flags};
