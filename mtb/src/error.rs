//! Error type for MTX parsing, MTB I/O and conversion

use mtb_core::MtbError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by readers, writers and the converter
///
/// Every error is fatal to the operation that raised it; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wrong MTX format at byte {offset}: {message}")]
    Format { message: String, offset: u64 },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Coarse category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Unsupported,
}

impl Error {
    pub(crate) fn format(message: impl Into<String>, offset: u64) -> Self {
        Error::Format {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported(message.into())
    }

    /// Data ended before the records a header declares
    pub(crate) fn truncated(message: impl Into<String>) -> Self {
        Error::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, message.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } | Error::Create { .. } | Error::Io(_) => ErrorKind::Io,
            Error::Format { .. } => ErrorKind::Format,
            Error::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

impl From<MtbError> for Error {
    fn from(err: MtbError) -> Self {
        match err {
            MtbError::InsufficientBuffer => Error::format(err.to_string(), 0),
            MtbError::UnsupportedMatrixType(_)
            | MtbError::UnsupportedDatatype(_)
            | MtbError::UnsupportedTypeSize { .. }
            | MtbError::IncompatibleElement => Error::Unsupported(err.to_string()),
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

/// Result type for MTB I/O operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof").into();
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(Error::format("bad", 3).kind(), ErrorKind::Format);

        let unsupported: Error = MtbError::UnsupportedDatatype(0x40).into();
        assert_eq!(unsupported.kind(), ErrorKind::Unsupported);
        assert!(unsupported.to_string().contains("0x40"));

        let short: Error = MtbError::InsufficientBuffer.into();
        assert_eq!(short.kind(), ErrorKind::Format);
    }
}
