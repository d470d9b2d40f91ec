use std::io;

use thiserror::Error;

/// Canonical result for fwdread.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source is exhausted. Not a failure for `copy_to`.
    #[error("end of data")]
    EndOfData,

    /// End of data arrived before an exact amount was satisfied.
    #[error("truncated: requested {requested} bytes, only {delivered} delivered")]
    Truncated {
        requested: u64,
        delivered: u64,
        #[source]
        cause: Box<Error>,
    },

    #[error("source reported success but produced no bytes")]
    NoProgress,

    /// Any other source or sink failure, passed through unmodified.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// A truncation caused by clean end of data.
    pub fn truncated(requested: u64, delivered: u64) -> Self {
        Error::Truncated {
            requested,
            delivered,
            cause: Box::new(Error::EndOfData),
        }
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Error::EndOfData)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }

    /// Bytes delivered before a truncation, if this is one.
    pub fn delivered(&self) -> Option<u64> {
        match self {
            Error::Truncated { delivered, .. } => Some(*delivered),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

// Used by the `std::io::Read`/`BufRead` impls. End of data never reaches
// this conversion there; it is mapped to `Ok(0)` first.
impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(inner) => inner,
            Error::EndOfData => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Error::Truncated { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Error::NoProgress => io::Error::new(io::ErrorKind::Other, e),
            Error::Config(_) => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}
