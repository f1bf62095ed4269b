//! Error types for the session layer.

use scribble_protocol::{ParticipantId, RoomCode};

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given participant.
    #[error("session not found for participant {0}")]
    NotFound(ParticipantId),

    /// The participant already has a live session.
    #[error("participant {0} already has an active session")]
    AlreadyConnected(ParticipantId),

    /// The connection is already bound to a room. A connection can be in at
    /// most one room at a time.
    #[error("participant {0} is already in room {1}")]
    AlreadyInRoom(ParticipantId, RoomCode),

    /// The connection is not bound to any room.
    #[error("participant {0} is not in a room")]
    NotInRoom(ParticipantId),
}
