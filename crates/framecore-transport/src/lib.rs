//! Transport adapter contracts, plus a QUIC reference adapter, for the
//! secure message framing core.
//!
//! An adapter is the only layer that touches OS I/O: it constructs a
//! [`framecore::Framer`] and a [`framecore_session::Session`] per
//! connection, drives the read/write loops in [`driver`], and reports
//! lifecycle events through [`SessionHandler`]. Transport choice (QUIC,
//! TCP, in-memory) is external to everything below this crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod acceptor;
pub mod connector;
pub mod driver;
pub mod error;
pub mod framing;
pub mod handler;
pub mod quic;

pub use acceptor::Acceptor;
pub use connector::Connector;
pub use error::{Result, TransportError};
pub use handler::SessionHandler;
pub use quic::{QuicAcceptor, QuicConnector};
