//! Client error types.

use crate::config::ConfigError;
use irbis_protocol::ProtocolError;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing connection parameter: {parameter}")]
    Config { parameter: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timeout")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("not connected")]
    NotConnected,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    ConfigFile(#[from] ConfigError),

    #[error("file not found on server: {0}")]
    FileNotFound(String),
}

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid parameters; nothing was sent.
    Configuration,
    /// The socket could not be opened, written or read.
    Transport,
    /// The server rejected the request or has no such file.
    Protocol,
    /// The reply could not be interpreted.
    Decode,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Config { .. }
            | ClientError::ConfigFile(_)
            | ClientError::InvalidArgument(_)
            | ClientError::NotConnected => ErrorKind::Configuration,
            ClientError::Io(_) | ClientError::Timeout => ErrorKind::Transport,
            ClientError::Protocol(e) if e.is_decode() => ErrorKind::Decode,
            ClientError::Protocol(ProtocolError::Server { .. }) | ClientError::FileNotFound(_) => {
                ErrorKind::Protocol
            }
            // Text that cannot be encoded never leaves the client.
            ClientError::Protocol(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the server return code if the server rejected the request.
    pub fn server_code(&self) -> Option<i32> {
        match self {
            ClientError::Protocol(e) => e.server_code(),
            _ => None,
        }
    }

    /// Returns whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Io(_) | ClientError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            ClientError::Config { parameter: "host" }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(ClientError::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(
            ClientError::from(ProtocolError::server(-140)).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            ClientError::from(ProtocolError::InvalidInteger("x".into())).kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            ClientError::from(ProtocolError::Encoding {
                encoding: "windows-1251",
                text: "☃".into()
            })
            .kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_file_not_found() {
        let err = ClientError::FileNotFound("0..isisacw.tab".into());
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.server_code(), None);
        assert!(err.to_string().contains("0..isisacw.tab"));
    }

    #[test]
    fn test_server_code() {
        let err = ClientError::from(ProtocolError::server(-3337));
        assert_eq!(err.server_code(), Some(-3337));
        assert!(err.to_string().contains("-3337"));
        assert_eq!(ClientError::NotConnected.server_code(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::Timeout.is_retryable());
        assert!(!ClientError::NotConnected.is_retryable());
    }
}
