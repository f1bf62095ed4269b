//! `ScribbleServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{Codec, JsonCodec};
use scribble_room::{RoomConfig, RoomRegistry, WordBank};
use scribble_session::SessionManager;
use scribble_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ScribbleError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// The session map sits behind a mutex that is never held across a call
/// into the room registry. The registry locks internally.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    /// How often the writer pings an otherwise quiet client.
    pub(crate) keepalive: Duration,
}

/// Builder for configuring and starting a Scribble server.
///
/// ```rust,no_run
/// use scribble::prelude::*;
///
/// # async fn start() -> Result<(), ScribbleError> {
/// let server = ScribbleServer::builder()
///     .bind("127.0.0.1:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    config: ServerConfig,
    words: Option<WordBank>,
}

impl ScribbleServerBuilder {
    /// A builder with [`ServerConfig::default`] settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from an existing config, e.g. [`ServerConfig::from_env`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config, words: None }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Uses this word bank instead of the configured word file.
    pub fn words(mut self, words: WordBank) -> Self {
        self.words = Some(words);
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Loads the word bank and binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<ScribbleServer<JsonCodec>, ScribbleError> {
        let config = self.config.validated();
        let words = match self.words {
            Some(words) => words,
            None => config.load_words()?,
        };
        let transport = WebSocketTransport::bind(&config.bind_addr).await?;

        let keepalive = config.keepalive_interval();
        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: RoomRegistry::new(config.room, words),
            codec: JsonCodec,
            idle_timeout: config.idle_timeout,
            keepalive,
        });

        Ok(ScribbleServer { transport, state })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scribble server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct ScribbleServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ScribbleServer<JsonCodec> {
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }
}

impl<C: Codec> ScribbleServer<C> {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection. Only
    /// returns if the process is shutting down.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "scribble server listening"),
            Err(e) => tracing::warn!(error = %e, "scribble server listening on unknown address"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
