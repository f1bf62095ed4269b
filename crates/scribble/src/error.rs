//! Unified error type for the Scribble server.

use scribble_protocol::{ProtocolError, ServerMessage};
use scribble_room::RoomError;
use scribble_session::SessionError;
use scribble_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` lift sub-crate errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),

    /// A configuration value could not be parsed or loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScribbleError {
    /// HTTP-style status code reported to the client in an `error` event.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Protocol(_) => 400,
            Self::Session(SessionError::NotInRoom(_) | SessionError::NotFound(_))
            | Self::Room(RoomError::InvalidParticipant { .. }) => 403,
            Self::Room(RoomError::NotFound(_)) => 404,
            Self::Session(SessionError::AlreadyInRoom(..) | SessionError::AlreadyConnected(_))
            | Self::Room(
                RoomError::AlreadyExists(_)
                | RoomError::NotEnoughPlayers { .. }
                | RoomError::InvalidState(_),
            ) => 409,
            Self::Room(RoomError::Unavailable(_)) => 503,
            Self::Transport(_) | Self::Config(_) | Self::Room(RoomError::EmptyWordBank) => 500,
        }
    }

    /// The event sent back to the connection whose request failed.
    ///
    /// A missing room and a taken room code have dedicated events; the
    /// rest become `error {code, message}`.
    pub fn to_event(&self) -> ServerMessage {
        match self {
            Self::Room(RoomError::NotFound(_)) => ServerMessage::RoomNotFound {
                message: "Room not found".into(),
            },
            Self::Room(RoomError::AlreadyExists(_)) => ServerMessage::RoomExists {
                message: "Room already exists".into(),
            },
            other => ServerMessage::error(other.status_code(), other.to_string()),
        }
    }
}
