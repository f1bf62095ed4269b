//! Identity and payload types shared by every Scribble event.
//!
//! These are the small building blocks the event catalog in
//! [`events`](crate::ClientMessage) is made of: who a participant is, which
//! room they are in, what a roster entry looks like, and what a stroke
//! carries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque handle for a connected participant.
///
/// The server derives it from the transport's connection id, so it lives
/// exactly as long as one connection. There is no account behind it.
///
/// `#[serde(transparent)]` makes `ParticipantId(42)` serialize as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-typeable room code such as `AB12`.
///
/// Codes are chosen by the client that creates the room, so they are
/// validated on the way in: after trimming, 1 to [`RoomCode::MAX_LEN`]
/// ASCII letters, digits, `-` or `_`. Comparison is case-sensitive.
///
/// Deserialization goes through [`TryFrom<String>`], so an invalid code in
/// an inbound event fails to decode instead of reaching the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Longest accepted room code.
    pub const MAX_LEN: usize = 16;

    /// Validates and wraps a room code.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidRoomCode`] if the trimmed code is empty, too
    /// long, or contains other characters than `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code = raw.trim();
        let valid = !code.is_empty()
            && code.len() <= Self::MAX_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(code.to_string()))
        } else {
            Err(ProtocolError::InvalidRoomCode(raw.to_string()))
        }
    }

    /// The code as typed by the room's creator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Specifies which members of a room receive an outbound event.
///
/// The room actor computes recipients explicitly instead of relying on a
/// pub/sub side effect: guesses echoed as chat go to `AllExcept(guesser)`,
/// strokes go to `AllExcept(drawer)`, a clear goes to `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every participant in the room.
    All,
    /// One specific participant.
    Player(ParticipantId),
    /// Everyone except the given participant.
    AllExcept(ParticipantId),
}

impl Recipient {
    /// Returns `true` if `participant` is addressed by this recipient set.
    pub fn includes(&self, participant: ParticipantId) -> bool {
        match self {
            Self::All => true,
            Self::Player(pid) => *pid == participant,
            Self::AllExcept(excluded) => *excluded != participant,
        }
    }
}

// ---------------------------------------------------------------------------
// Roster payloads
// ---------------------------------------------------------------------------

/// One roster entry as shown in the lobby and in membership updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub name: String,
    pub is_host: bool,
    pub score: u32,
    /// Opaque avatar reference chosen by the client, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A participant's score, rebroadcast at the start of every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: ParticipantId,
    pub name: String,
    pub score: u32,
}

// ---------------------------------------------------------------------------
// Strokes
// ---------------------------------------------------------------------------

/// A single point of a freehand stroke.
///
/// Coordinates are canvas pixels as measured by the drawer's client; the
/// server never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    pub color: String,
}

/// A drawing event submitted by the current drawer.
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    /// Pen down at a point.
    Start(StrokePoint),
    /// Pen moved to a point.
    Point(StrokePoint),
    /// Pen up.
    End,
    /// Wipe the whole canvas.
    Clear,
}

impl Stroke {
    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Point(_) => "point",
            Self::End => "end",
            Self::Clear => "clear",
        }
    }
}
