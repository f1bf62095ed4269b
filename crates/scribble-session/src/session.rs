//! The per-connection session record.

use std::time::{Duration, Instant};

use scribble_protocol::{ParticipantId, RoomCode};

/// One live connection as seen by the server.
#[derive(Debug, Clone)]
pub struct Session {
    pub participant_id: ParticipantId,

    /// The room this connection created or joined. `None` until then, and
    /// again after an explicit leave.
    pub room: Option<RoomCode>,

    /// When the connection was accepted.
    pub connected_at: Instant,
}

impl Session {
    pub(crate) fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            room: None,
            connected_at: Instant::now(),
        }
    }

    /// How long the connection has been open.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// [`age`](Self::age) in whole milliseconds, saturating at `u64::MAX`.
    pub fn age_ms(&self) -> u64 {
        saturating_millis(self.age())
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
