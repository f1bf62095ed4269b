//! Wire protocol for Scribble.
//!
//! This crate defines the "language" that drawing clients and the server speak:
//!
//! - **Identity** ([`ParticipantId`], [`RoomCode`]) identify who is talking and in
//!   which room.
//! - **Events** ([`ClientMessage`], [`ServerMessage`]) carry the event catalog
//!   exchanged over a connection, plus the [`Stroke`] payloads the draw
//!   relay fans out.
//! - **Addressing** ([`Recipient`]) decides which members of a room receive an
//!   outbound event.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) convert events
//!   to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room layer.
//! It doesn't know about connections, timers or turn order; it only knows
//! what the messages look like.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room actor → Protocol (ServerMessage) → Transport
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientMessage, ServerMessage};
pub use types::{
    ParticipantId, ParticipantInfo, Recipient, RoomCode, ScoreEntry, Stroke,
    StrokePoint,
};
