//! Error types for feed operations.

use crate::protocol::ProtocolError;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

/// Error type for feed transport and session operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket error.
    #[error("websocket error: {0}")]
    WebSocket(Box<WsError>),

    /// Connection timeout.
    #[error("connection timeout")]
    ConnectTimeout,

    /// Connection closed by the remote side.
    #[error("connection closed")]
    ConnectionClosed,

    /// Inbound payload could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Channel error.
    #[error("channel error: {message}")]
    Channel {
        /// Error message.
        message: String,
    },
}

impl From<WsError> for FeedError {
    fn from(error: WsError) -> Self {
        Self::WebSocket(Box::new(error))
    }
}

impl FeedError {
    /// Creates a channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }
}
