//! Transport collaborators.
//!
//! The controller talks to the feed through two seams: a [`Connector`] that
//! opens a connection and a [`Transport`] that moves text frames over it.
//! [`WsConnector`] and [`WsTransport`] implement them over a WebSocket.

use crate::error::FeedError;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// An open, bidirectional text-frame connection.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Sends one text frame.
    ///
    /// # Errors
    /// Returns `FeedError` if the frame cannot be written.
    async fn send(&mut self, text: String) -> Result<(), FeedError>;

    /// Receives the next text frame.
    ///
    /// Returns `None` once the remote side has closed the connection. Must be
    /// cancel safe: a frame is never lost if the future is dropped early.
    async fn recv(&mut self) -> Option<Result<String, FeedError>>;

    /// Closes the connection.
    ///
    /// # Errors
    /// Returns `FeedError` if the close handshake fails.
    async fn close(&mut self) -> Result<(), FeedError>;
}

/// Opens transports on demand.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Transport produced by this connector.
    type Transport: Transport;

    /// Opens a fresh connection.
    ///
    /// # Errors
    /// Returns `FeedError` if the connection cannot be established.
    async fn connect(&self) -> Result<Self::Transport, FeedError>;
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Connects to a WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Creates a connector for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self) -> Result<WsTransport, FeedError> {
        let (stream, _response) = connect_async(self.url.as_str()).await?;
        tracing::debug!(url = %self.url, "websocket connected");

        let (sink, stream) = stream.split();
        Ok(WsTransport { sink, stream })
    }
}

/// A WebSocket connection carrying text frames.
pub struct WsTransport {
    sink: WsSink,
    stream: WsStream,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), FeedError> {
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, FeedError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => return Some(Ok(text)),
                    Err(e) => {
                        tracing::debug!(error = %e, "dropping non-UTF-8 binary frame");
                    }
                },
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "websocket close frame received");
                    return None;
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), FeedError> {
        self.sink.close().await?;
        Ok(())
    }
}
