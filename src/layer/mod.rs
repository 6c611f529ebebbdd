//! Stateful protocol endpoints.
//!
//! Every endpoint here is single-threaded and externally driven: incoming
//! packets are handed in by the host environment, outgoing packets are handed
//! back through transmit callbacks or queues, and the passing of time is
//! reported through explicit `tick` calls.

use core::fmt;

pub mod eth;
pub mod ip;
pub mod tcp;

/// The error type for layer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An interface index referred to no attached interface.
    NoInterface,
}

/// The result type for layer configuration.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoInterface => write!(f, "no such interface"),
        }
    }
}
