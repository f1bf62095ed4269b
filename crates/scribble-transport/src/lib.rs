//! Transport abstraction layer for Scribble.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server's accept
//! loop and connection handlers are written against, plus a WebSocket
//! implementation.
//!
//! A [`Connection`] is used from two tasks at once: the handler reads
//! client events while a writer task pushes room broadcasts. Implementations
//! must therefore let `send` make progress while a `recv` is pending.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Unique for the lifetime of the process. The server uses it as the
/// participant handle, so it is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client and completes its handshake.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// One client connection, shared by its reader and writer tasks.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes a binary frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Writes a text frame. Browser clients expect JSON events as text.
    ///
    /// Falls back to [`send`](Connection::send) for transports without a
    /// text/binary distinction.
    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.send(text.as_bytes()).await
    }

    /// Asks the peer to prove it is still there. Transports without a
    /// keep-alive mechanism do nothing.
    async fn ping(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Next frame from the client; `Ok(None)` once it closed cleanly.
    ///
    /// Keep-alive traffic (a pong, or a ping from the client) comes back as
    /// an empty frame, so a caller timing out idle peers sees it as
    /// activity.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut rooms = HashMap::new();
        rooms.insert(ConnectionId::new(1), "AB12");
        rooms.insert(ConnectionId::new(2), "CD34");
        assert_eq!(rooms[&ConnectionId::new(2)], "CD34");
    }
}
