//! Room configuration and the turn phase state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room the registry spawns.
///
/// Durations are expressed in units of `tick_interval`, so a test can run a
/// whole 60-unit turn in a few hundred milliseconds by shrinking the unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Participants needed to start (and keep running) a game.
    pub min_players: usize,

    /// Turn length in units.
    pub turn_ticks: u32,

    /// Pause between turns in units. 0 advances immediately.
    pub pause_ticks: u32,

    /// Length of one unit.
    pub tick_interval: Duration,

    /// Upper bound of the random delay before the first tick of a turn.
    pub start_jitter: Duration,

    /// Capacity of each room actor's command inbox.
    pub inbox_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            turn_ticks: 60,
            pause_ticks: 3,
            tick_interval: Duration::from_secs(1),
            start_jitter: Duration::ZERO,
            inbox_capacity: 64,
        }
    }
}

impl RoomConfig {
    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `min_players` is at least 2: somebody has to guess.
    /// - `turn_ticks` is at least 1.
    /// - `tick_interval` is at least 1 ms.
    /// - `inbox_capacity` is at least 1.
    pub fn validated(mut self) -> Self {
        if self.min_players < 2 {
            warn!(min_players = self.min_players, "min_players below 2, clamping");
            self.min_players = 2;
        }
        if self.turn_ticks == 0 {
            warn!("turn_ticks is 0, clamping to 1");
            self.turn_ticks = 1;
        }
        if self.tick_interval < Duration::from_millis(1) {
            warn!(tick_interval = ?self.tick_interval, "tick_interval below 1ms, clamping");
            self.tick_interval = Duration::from_millis(1);
        }
        self.inbox_capacity = self.inbox_capacity.max(1);
        self
    }

    /// Wall-clock length of a full turn.
    pub fn turn_duration(&self) -> Duration {
        self.tick_interval * self.turn_ticks
    }

    /// Wall-clock length of the pause between turns.
    pub fn pause_duration(&self) -> Duration {
        self.tick_interval * self.pause_ticks
    }
}

// ---------------------------------------------------------------------------
// TurnPhase
// ---------------------------------------------------------------------------

/// Where a room is in its turn cycle.
///
/// ```text
///            enterGame                timer expiry / correct guess / drawer left
///   Idle ─────────────→ InTurn ──────────────────────────────→ TransitionPause
///    ↑                    ↑                                            │
///    │                    └──────────────── pause elapsed ─────────────┘
///    └──────────── fewer than min_players remain (from either phase)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    InTurn,
    TransitionPause,
}

impl TurnPhase {
    /// `true` once a game has been entered and until it stops.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::InTurn | Self::TransitionPause)
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::InTurn => write!(f, "InTurn"),
            Self::TransitionPause => write!(f, "TransitionPause"),
        }
    }
}
