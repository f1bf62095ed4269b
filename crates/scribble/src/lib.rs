//! # Scribble
//!
//! Server core for a multiplayer drawing-and-guessing game.
//!
//! Players create or join rooms by code, take turns drawing a secret word
//! while the others guess, and see the drawer's strokes live. This crate
//! wires the layers into a runnable server; the game itself lives in
//! `scribble-room`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn start() -> Result<(), ScribbleError> {
//! let config = ServerConfig::from_env()?;
//! let server = ScribbleServerBuilder::from_config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod lifecycle;
mod server;

pub use config::{DEFAULT_BIND, DEFAULT_IDLE_TIMEOUT, MIN_IDLE_TIMEOUT, ServerConfig};
pub use error::ScribbleError;
pub use server::{ScribbleServer, ScribbleServerBuilder};

/// Everything needed to configure and run a server, plus the event types
/// clients exchange with it.
pub mod prelude {
    pub use crate::{ScribbleError, ScribbleServer, ScribbleServerBuilder, ServerConfig};
    pub use scribble_protocol::{
        ClientMessage, Codec, JsonCodec, ParticipantId, ParticipantInfo, RoomCode, ScoreEntry,
        ServerMessage,
    };
    pub use scribble_room::{RoomConfig, RoomError, WordBank};
    pub use scribble_session::SessionError;
    pub use scribble_transport::TransportError;
}
