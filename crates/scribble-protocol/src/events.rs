//! The event catalog exchanged between drawing clients and the server.
//!
//! Every frame is a JSON object of the form
//! `{"event": "<name>", "data": { ...camelCase fields... }}`. Event names are
//! camelCase except the three membership notifications (`room-created`,
//! `player-joined`, `player-left`), which keep the hyphenated names the
//! browser client listens for.

use serde::{Deserialize, Serialize};

use crate::types::{ParticipantId, ParticipantInfo, RoomCode, ScoreEntry, Stroke, StrokePoint};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Events sent by a client.
///
/// Every client event names the room it targets. The handler still checks
/// that the connection actually belongs to that room before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Create a new room with the sender as host.
    CreateRoom {
        room_id: RoomCode,
        name: String,
        #[serde(default)]
        avatar: Option<String>,
    },

    /// Join an existing room as a regular player.
    JoinRoom {
        room_id: RoomCode,
        name: String,
        #[serde(default)]
        avatar: Option<String>,
    },

    /// Ask for the current roster of a room.
    JoinLobby { room_id: RoomCode },

    /// Start the game (host only).
    EnterGame { room_id: RoomCode },

    /// Submit a guess for the current word.
    ///
    /// Older clients also send a `participantId`. It is skipped, whatever its
    /// type: the server always uses the identity of the connection.
    GuessWord { room_id: RoomCode, guess: String },

    StartDraw {
        room_id: RoomCode,
        x: f64,
        y: f64,
        color: String,
    },

    Draw {
        room_id: RoomCode,
        x: f64,
        y: f64,
        color: String,
    },

    EndDraw { room_id: RoomCode },

    ClearCanvas { room_id: RoomCode },

    /// Leave the room without closing the connection.
    LeaveRoom { room_id: RoomCode },
}

impl ClientMessage {
    /// The room this event targets.
    pub fn room_id(&self) -> &RoomCode {
        match self {
            Self::CreateRoom { room_id, .. }
            | Self::JoinRoom { room_id, .. }
            | Self::JoinLobby { room_id }
            | Self::EnterGame { room_id }
            | Self::GuessWord { room_id, .. }
            | Self::StartDraw { room_id, .. }
            | Self::Draw { room_id, .. }
            | Self::EndDraw { room_id }
            | Self::ClearCanvas { room_id }
            | Self::LeaveRoom { room_id } => room_id,
        }
    }

    /// Event name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::JoinLobby { .. } => "joinLobby",
            Self::EnterGame { .. } => "enterGame",
            Self::GuessWord { .. } => "guessWord",
            Self::StartDraw { .. } => "startDraw",
            Self::Draw { .. } => "draw",
            Self::EndDraw { .. } => "endDraw",
            Self::ClearCanvas { .. } => "clearCanvas",
            Self::LeaveRoom { .. } => "leaveRoom",
        }
    }

    /// Converts a drawing event into the [`Stroke`] the relay works with.
    ///
    /// Returns `None` for every non-drawing event.
    pub fn stroke(&self) -> Option<Stroke> {
        match self {
            Self::StartDraw { x, y, color, .. } => Some(Stroke::Start(StrokePoint {
                x: *x,
                y: *y,
                color: color.clone(),
            })),
            Self::Draw { x, y, color, .. } => Some(Stroke::Point(StrokePoint {
                x: *x,
                y: *y,
                color: color.clone(),
            })),
            Self::EndDraw { .. } => Some(Stroke::End),
            Self::ClearCanvas { .. } => Some(Stroke::Clear),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent to the host once the room exists.
    #[serde(rename = "room-created")]
    RoomCreated {
        room_id: RoomCode,
        players: Vec<ParticipantInfo>,
    },

    /// Broadcast to the room whenever someone joins.
    #[serde(rename = "player-joined")]
    PlayerJoined {
        room_id: RoomCode,
        players: Vec<ParticipantInfo>,
    },

    /// Reply to `joinLobby`.
    LobbyJoined {
        room_id: RoomCode,
        players: Vec<ParticipantInfo>,
    },

    RoomExists { message: String },

    RoomNotFound { message: String },

    /// Any other rejected request. `code` follows HTTP conventions
    /// (400 malformed, 403 not allowed, 409 wrong state, 503 unavailable).
    Error { code: u16, message: String },

    /// A turn has begun.
    ///
    /// `word` is only filled in for the drawer; everyone else gets `null`
    /// and has to make do with `word_length`.
    GameStarted {
        word: Option<String>,
        word_length: usize,
        turn_index: usize,
        round: u32,
        drawer: ParticipantId,
        scores: Vec<ScoreEntry>,
    },

    /// Remaining time in the current turn.
    TimerUpdate { time: u32 },

    TimeUpModal { message: String, next_player: String },

    CloseModal,

    WordGuessed {
        player_name: String,
        word: String,
        next_player: String,
    },

    CloseGuessedModal,

    /// A guess that did not match, shown as chat.
    ChatMessage { player_name: String, message: String },

    #[serde(rename = "player-left")]
    PlayerLeft {
        player_name: String,
        message: String,
        players: Vec<ParticipantInfo>,
    },

    /// The room dropped below the minimum player count mid-game.
    GameStopped { message: String },

    StartDraw { x: f64, y: f64, color: String },

    Draw { x: f64, y: f64, color: String },

    EndDraw,

    ClearCanvas,
}

impl ServerMessage {
    /// Builds an `error` event.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

impl From<Stroke> for ServerMessage {
    fn from(stroke: Stroke) -> Self {
        match stroke {
            Stroke::Start(StrokePoint { x, y, color }) => Self::StartDraw { x, y, color },
            Stroke::Point(StrokePoint { x, y, color }) => Self::Draw { x, y, color },
            Stroke::End => Self::EndDraw,
            Stroke::Clear => Self::ClearCanvas,
        }
    }
}
