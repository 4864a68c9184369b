//! Error types for the chat server
//!
//! Defines application-level errors, frame codec errors and send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Application-level errors
///
/// Everything here is either fatal at startup (bad configuration, bind
/// or log-file failure) or fatal to a single connection.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (socket bind, log file, connect)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame could not be decoded or encoded
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Port argument is not a valid TCP port
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// The configured default room is not part of the room set
    #[error("Default room not configured: {0}")]
    UnknownDefaultRoom(String),

    /// The peer closed the stream
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Frame codec errors
///
/// Any of these ends the session that produced them.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying stream failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame is not valid JSON or does not match the message vocabulary
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame exceeded the configured maximum length
    #[error("Frame exceeds maximum length")]
    TooLong,
}

impl From<LinesCodecError> for FrameError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => FrameError::TooLong,
            LinesCodecError::Io(e) => FrameError::Io(e),
        }
    }
}

/// Message send errors
///
/// Occurs when a frame cannot be written to a client's connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// Writing the frame to the connection failed
    #[error("Send failed: {0}")]
    Frame(#[from] FrameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_codec_error_conversion() {
        let err: FrameError = LinesCodecError::MaxLineLengthExceeded.into();
        assert!(matches!(err, FrameError::TooLong));

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: FrameError = LinesCodecError::Io(io).into();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidPort("abc".to_string());
        assert_eq!(err.to_string(), "Invalid port: abc");
    }
}
