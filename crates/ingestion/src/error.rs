//! Ingestion error types

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Channel closed while a source was still delivering
    #[error("channel closed for address {address}")]
    ChannelClosed {
        /// Source address pattern
        address: String,
    },

    /// Replay file could not be read
    #[error("failed to read replay file {path}: {message}")]
    ReplayIo {
        /// Replay file path
        path: String,
        /// Error message
        message: String,
    },

    /// Replay file record could not be decoded
    #[error("invalid replay record at {path}:{line}: {message}")]
    ReplayDecode {
        /// Replay file path
        path: String,
        /// 1-based line number
        line: usize,
        /// Error message
        message: String,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
