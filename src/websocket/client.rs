//! WebSocket client for Binance streams
//!
//! Handles connection and message reception for a single stream.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use super::{Connection, Connector};
use crate::error::{Result, TerminalError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client for a single stream connection
pub struct WebSocketClient {
    stream: WsStream,
    url: String,
}

impl WebSocketClient {
    /// Connect to a stream URL
    pub async fn connect(url: &str) -> Result<Self> {
        info!(url = %url, "Connecting to Binance WebSocket");

        let (stream, response) = connect_async(url).await.map_err(|e| {
            TerminalError::WebSocketConnection(format!("Failed to connect: {}", e))
        })?;

        info!(url = %url, status = ?response.status(), "WebSocket connected");

        Ok(Self {
            stream,
            url: url.to_string(),
        })
    }
}

impl Connection for WebSocketClient {
    async fn recv(&mut self) -> Result<Option<String>> {
        match self.stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(len = text.len(), "Received text message");
                Ok(Some(text))
            }
            Some(Ok(Message::Binary(data))) => {
                // Convert binary to text if needed
                let text = String::from_utf8_lossy(&data).to_string();
                Ok(Some(text))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Err(e) = self.stream.send(Message::Pong(data)).await {
                    warn!(url = %self.url, error = %e, "Failed to answer ping");
                }
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => {
                debug!("Received pong");
                Ok(None)
            }
            Some(Ok(Message::Close(frame))) => {
                warn!(url = %self.url, frame = ?frame, "Received close frame");
                Err(TerminalError::WebSocketConnection(
                    "Connection closed".to_string(),
                ))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                error!(url = %self.url, error = %e, "WebSocket error");
                Err(TerminalError::WebSocketMessage(e.to_string()))
            }
            None => {
                warn!(url = %self.url, "WebSocket stream ended");
                Err(TerminalError::WebSocketConnection(
                    "Stream ended".to_string(),
                ))
            }
        }
    }
}

/// Production connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    type Conn = WebSocketClient;

    async fn connect(&self, url: &str) -> Result<WebSocketClient> {
        WebSocketClient::connect(url).await
    }
}
