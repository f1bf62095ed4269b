//! Error types for the room layer.

use scribble_protocol::{ParticipantId, RoomCode};

/// Errors that can occur during room operations.
///
/// A room emptying out is not an error; see
/// [`LeaveOutcome::Emptied`](crate::LeaveOutcome::Emptied).
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A room with this code is already registered.
    #[error("room {0} already exists")]
    AlreadyExists(RoomCode),

    /// The participant may not perform this action in this room.
    #[error("participant {participant} rejected in room {room}: {reason}")]
    InvalidParticipant {
        participant: ParticipantId,
        room: RoomCode,
        reason: &'static str,
    },

    /// The game cannot start with this few participants.
    #[error("room {room} needs {required} players to start, has {present}")]
    NotEnoughPlayers {
        room: RoomCode,
        required: usize,
        present: usize,
    },

    /// The room's turn phase doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// A word bank was built from a list with no usable words.
    #[error("word bank has no words")]
    EmptyWordBank,

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
