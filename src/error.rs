//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by wrapchain's fallible operations.
///
/// Handler failures are not `Error`s: they are panics, caught by
/// [`recover`](crate::recover) or turned into a `500` by the server. This type
/// surfaces host failures: bad configuration, binding to a port, accepting a
/// connection.
#[derive(Debug)]
pub enum Error {
    /// Binding or accepting failed.
    Io(std::io::Error),
    /// The listen address is not a valid `host:port`.
    Addr(AddrParseError),
    /// A configuration value could not be parsed.
    Config { key: &'static str, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Addr(e) => write!(f, "address: {e}"),
            Self::Config { key, value } => write!(f, "config: invalid value {value:?} for {key}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Addr(e) => Some(e),
            Self::Config { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}
