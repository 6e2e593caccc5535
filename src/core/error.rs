use std::io;
use thiserror::Error;

/// Error types for the WSJT-X codec and transport
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: message too short")]
    TooShort,

    #[error("parse error: invalid magic {0:#010x}")]
    InvalidMagic(u32),

    #[error("parse error: unknown message type {0}")]
    UnknownMessageType(u32),

    #[error("parse error: invalid date/time spec {0}")]
    InvalidDateTimeSpec(u8),

    #[error("parse error: julian day {0} out of range")]
    DateOutOfRange(u64),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns true for errors produced while decoding a datagram
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::TooShort
                | Error::InvalidMagic(_)
                | Error::UnknownMessageType(_)
                | Error::InvalidDateTimeSpec(_)
                | Error::DateOutOfRange(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::network("socket closed");
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(err.to_string(), "Network error: socket closed");
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(Error::TooShort.to_string(), "parse error: message too short");
        assert_eq!(
            Error::InvalidMagic(0xdeadbeef).to_string(),
            "parse error: invalid magic 0xdeadbeef"
        );
        assert!(Error::UnknownMessageType(42).is_parse_error());
        assert!(Error::InvalidDateTimeSpec(2).is_parse_error());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
