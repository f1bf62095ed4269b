//! Room handle: the cloneable front door to a running room actor.
//!
//! Each room runs in its own task (see [`actor`](crate::actor)); the outside
//! world only ever talks to it through the [`RoomHandle`] defined here.

use std::sync::Arc;

use scribble_protocol::{ParticipantId, ParticipantInfo, RoomCode, ServerMessage, Stroke};
use tokio::sync::{mpsc, oneshot};

use crate::actor::RoomActor;
use crate::{RoomConfig, RoomError, TurnPhase, WordBank};

/// Channel sender for delivering outbound events to one participant.
///
/// Unbounded so a room never waits on a slow client; the participant's
/// writer task drains it in order.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Everything a room needs to admit a participant.
#[derive(Debug)]
pub struct NewParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub avatar: Option<String>,
    pub sender: PlayerSender,
}

/// What remains of a room after a participant left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The room lives on with this many participants.
    Remaining(usize),
    /// The last participant left. The actor has stopped and the room
    /// must be unregistered.
    Emptied,
}

/// A point-in-time view of a room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    /// Participants in join order.
    pub players: Vec<ParticipantInfo>,
    pub phase: TurnPhase,
    pub turn_index: usize,
    pub round: u32,
    /// The drawer while a turn is running.
    pub drawer: Option<ParticipantId>,
}

/// Commands sent to a room actor through its channel.
///
/// Variants with a `reply` are request/response; the rest are
/// fire-and-forget and any rejection is only logged by the actor.
pub(crate) enum RoomCommand {
    Join {
        participant: NewParticipant,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<LeaveOutcome, RoomError>>,
    },
    EnterGame {
        requester: ParticipantId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Guess {
        participant: ParticipantId,
        text: String,
    },
    Stroke {
        participant: ParticipantId,
        stroke: Stroke,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's an `mpsc::Sender` and the room code. Handlers keep
/// one per request and talk to the room without touching the registry.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Join { .. } => "Join",
            Self::Leave { .. } => "Leave",
            Self::EnterGame { .. } => "EnterGame",
            Self::Guess { .. } => "Guess",
            Self::Stroke { .. } => "Stroke",
            Self::Snapshot { .. } => "Snapshot",
        };
        f.write_str(name)
    }
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomCode {
        &self.room_id
    }

    /// `true` once the actor has stopped (the room emptied out).
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Whether both handles lead to the same room actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Adds a participant. Everyone in the room (the newcomer included)
    /// receives `player-joined`.
    pub async fn join(&self, participant: NewParticipant) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join { participant, reply })
            .await?
    }

    /// Removes a participant, preserving everyone else's order.
    pub async fn leave(&self, participant: ParticipantId) -> Result<LeaveOutcome, RoomError> {
        self.request(|reply| RoomCommand::Leave { participant, reply })
            .await?
    }

    /// Starts the game on behalf of `requester`, who must be the host.
    pub async fn enter_game(&self, requester: ParticipantId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::EnterGame { requester, reply })
            .await?
    }

    /// Submits a guess (fire-and-forget).
    pub async fn submit_guess(
        &self,
        participant: ParticipantId,
        text: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Guess {
                participant,
                text: text.into(),
            })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Relays a stroke from `participant` (fire-and-forget).
    pub async fn relay_stroke(
        &self,
        participant: ParticipantId,
        stroke: Stroke,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Stroke { participant, stroke })
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }
}

/// Trims a display name; `None` if nothing is left.
pub(crate) fn display_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Spawns a room actor with `host` as its only participant and returns a
/// handle to it. The host receives `room-created` once the actor is up.
///
/// The caller is expected to have validated the host's display name.
pub(crate) fn spawn_room(
    room_id: RoomCode,
    host: NewParticipant,
    config: RoomConfig,
    words: Arc<WordBank>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.inbox_capacity);
    let actor = RoomActor::new(room_id.clone(), host, config, words, rx);
    tokio::spawn(actor.run());
    RoomHandle {
        room_id,
        sender: tx,
    }
}
