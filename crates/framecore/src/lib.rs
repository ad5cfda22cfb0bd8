//! The replay-defended encode/decode pipeline at the centre of the secure
//! message framing core.
//!
//! Binds [`framecore_proto`]'s envelope shape and [`framecore_crypto`]'s
//! pluggable strategies into the ordered pipeline described by
//! [`framer::Framer`]: compress → encrypt → sequence → sign on encode, and
//! its mirror on decode. [`sequence::SequenceIdManager`] is the replay
//! defence sub-component; [`env::Environment`] decouples both from system
//! time so tests can run with a fake clock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod framer;
pub mod sequence;

pub use env::{Environment, SystemEnv};
pub use error::{FramerError, Result};
pub use framer::{Framer, FramerConfig};
pub use sequence::{SequenceConfig, SequenceIdManager};
