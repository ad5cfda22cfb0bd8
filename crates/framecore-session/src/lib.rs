//! Per-connection session abstraction and session registry for the secure
//! message framing core.
//!
//! A [`Session`] binds one [`framecore::Framer`] to one connection's bounded
//! send/receive queues and a cancellation context; a [`SessionManager`]
//! tracks every live session by id and supports broadcast.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod manager;
pub mod session;

pub use error::{Result, SessionError};
pub use manager::SessionManager;
pub use session::{DEFAULT_QUEUE_CAPACITY, Session, SessionState};
