use std::fmt;
use std::io;

/// An error that can occur when building, loading, or querying an index.
#[derive(Debug)]
pub enum Error {
    /// The input text contains the byte reserved as the terminator.
    InputContainsTerminator(u8),
    /// A serialized index failed a structural check on load.
    MalformedIndex(String),
    /// An I/O operation failed while reading or writing an index.
    Io(io::Error),
    /// An internal invariant was violated, e.g. an LF-mapping step left
    /// `[0, m)`. This indicates a corrupt index or a bug, never a user error.
    InternalInvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputContainsTerminator(b) => write!(
                f,
                "input text contains the reserved terminator byte 0x{:02x}",
                b,
            ),
            Error::MalformedIndex(msg) => write!(f, "malformed index: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::InternalInvariantViolation(msg) => {
                write!(f, "internal invariant violation: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
