//! Error types for the market terminal

use thiserror::Error;

/// Market terminal errors
#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    #[error("WebSocket message error: {0}")]
    WebSocketMessage(String),

    #[error("Failed to parse message: {0}")]
    ParseError(String),

    #[error("Unknown stream name: {0}")]
    UnknownStream(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Display error: {0}")]
    DisplayError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for TerminalError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TerminalError::WebSocketConnection(err.to_string())
    }
}

impl From<serde_json::Error> for TerminalError {
    fn from(err: serde_json::Error) -> Self {
        TerminalError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for TerminalError {
    fn from(err: std::io::Error) -> Self {
        TerminalError::DisplayError(err.to_string())
    }
}

impl From<prometheus::Error> for TerminalError {
    fn from(err: prometheus::Error) -> Self {
        TerminalError::MetricsError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TerminalError>;
