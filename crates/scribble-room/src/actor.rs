//! Room actor: an isolated Tokio task that owns one room.
//!
//! The actor owns the participant list, the turn state, the word bank
//! reference and both timers. Commands from connection handlers, countdown
//! ticks and the end of the post-turn pause all arrive through one
//! `tokio::select!`, so every state change in a room is serialized without
//! locks.

use std::sync::Arc;

use scribble_protocol::{
    ParticipantId, ParticipantInfo, Recipient, RoomCode, ScoreEntry, ServerMessage, Stroke,
};
use scribble_timer::{Countdown, CountdownTick, Delay};
use tokio::sync::mpsc;

use crate::guess::{self, Verdict};
use crate::room::{LeaveOutcome, NewParticipant, PlayerSender, RoomCommand, RoomSnapshot, display_name};
use crate::turn::{TurnOutcome, TurnState};
use crate::{RoomConfig, RoomError, TurnPhase, WordBank, relay};

const TIME_UP_MESSAGE: &str = "Time's up!";
const DRAWER_LEFT_MESSAGE: &str = "The drawer left the room";
const GAME_STOPPED_MESSAGE: &str = "Not enough players to continue";
/// Shown as the next drawer when nobody is left to draw.
const NOBODY: &str = "Someone";

/// A participant as the actor sees it.
struct Member {
    id: ParticipantId,
    name: String,
    avatar: Option<String>,
    is_host: bool,
    score: u32,
    sender: PlayerSender,
}

impl Member {
    fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id,
            name: self.name.clone(),
            is_host: self.is_host,
            score: self.score,
            avatar: self.avatar.clone(),
        }
    }
}

/// What woke the actor up.
enum Wake {
    Command(RoomCommand),
    Tick(CountdownTick),
    PauseOver,
    Closed,
}

/// Whether the actor loop keeps going after a command.
#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct RoomActor {
    room_id: RoomCode,
    config: RoomConfig,
    /// Join order; never reshuffled.
    members: Vec<Member>,
    turn: TurnState,
    countdown: Countdown,
    pause: Delay,
    words: Arc<WordBank>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    pub(crate) fn new(
        room_id: RoomCode,
        host: NewParticipant,
        config: RoomConfig,
        words: Arc<WordBank>,
        receiver: mpsc::Receiver<RoomCommand>,
    ) -> Self {
        let countdown = Countdown::new(config.tick_interval).with_jitter(config.start_jitter);
        let host = Member {
            id: host.id,
            name: host.name,
            avatar: host.avatar,
            is_host: true,
            score: 0,
            sender: host.sender,
        };
        Self {
            room_id,
            config,
            members: vec![host],
            turn: TurnState::new(),
            countdown,
            pause: Delay::new(),
            words,
            receiver,
        }
    }

    /// Runs until the last participant leaves or every handle is dropped.
    pub(crate) async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");
        self.dispatch(
            Recipient::All,
            ServerMessage::RoomCreated {
                room_id: self.room_id.clone(),
                players: self.roster(),
            },
        );

        loop {
            let wake = tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => Wake::Command(cmd),
                    None => Wake::Closed,
                },
                tick = self.countdown.wait() => Wake::Tick(tick),
                () = self.pause.wait() => Wake::PauseOver,
            };

            match wake {
                Wake::Command(cmd) => {
                    if self.handle_command(cmd) == Flow::Stop {
                        break;
                    }
                }
                Wake::Tick(tick) => self.handle_tick(tick),
                Wake::PauseOver => self.next_turn(),
                Wake::Closed => {
                    tracing::debug!(room_id = %self.room_id, "all room handles dropped");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> Flow {
        match cmd {
            RoomCommand::Join { participant, reply } => {
                let result = self.handle_join(participant);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { participant, reply } => {
                let result = self.handle_leave(participant);
                let emptied = matches!(result, Ok(LeaveOutcome::Emptied));
                if emptied {
                    self.receiver.close();
                }
                let _ = reply.send(result);
                if emptied {
                    return Flow::Stop;
                }
            }
            RoomCommand::EnterGame { requester, reply } => {
                let result = self.handle_enter_game(requester);
                let _ = reply.send(result);
            }
            RoomCommand::Guess { participant, text } => {
                self.handle_guess(participant, &text);
            }
            RoomCommand::Stroke { participant, stroke } => {
                self.handle_stroke(participant, stroke);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
        Flow::Continue
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    fn handle_join(&mut self, participant: NewParticipant) -> Result<(), RoomError> {
        if self.position(participant.id).is_some() {
            return Err(self.rejected(participant.id, "already in this room"));
        }
        let Some(name) = display_name(&participant.name) else {
            return Err(self.rejected(participant.id, "display name must not be empty"));
        };

        let id = participant.id;
        self.members.push(Member {
            id,
            name,
            avatar: participant.avatar,
            is_host: false,
            score: 0,
            sender: participant.sender,
        });
        tracing::info!(
            room_id = %self.room_id,
            participant_id = %id,
            players = self.members.len(),
            "player joined"
        );

        self.dispatch(
            Recipient::All,
            ServerMessage::PlayerJoined {
                room_id: self.room_id.clone(),
                players: self.roster(),
            },
        );

        // Late joiner: show the running turn, without the word.
        if self.turn.phase().is_running() {
            if let Some(started) = self.turn_started_for(id) {
                self.dispatch(Recipient::Player(id), started);
            }
        }
        Ok(())
    }

    fn handle_leave(&mut self, participant: ParticipantId) -> Result<LeaveOutcome, RoomError> {
        let Some(removed) = self.position(participant) else {
            return Err(self.rejected(participant, "not in this room"));
        };

        let was_drawer = self.turn.drawer_index() == Some(removed);
        let member = self.members.remove(removed);
        let remaining = self.members.len();
        self.turn.remove_participant(removed, remaining);

        tracing::info!(
            room_id = %self.room_id,
            participant_id = %participant,
            players = remaining,
            was_drawer,
            "player left"
        );

        if remaining == 0 {
            self.countdown.cancel();
            self.pause.disarm();
            tracing::info!(room_id = %self.room_id, "room emptied");
            return Ok(LeaveOutcome::Emptied);
        }

        if member.is_host {
            self.members[0].is_host = true;
            tracing::info!(
                room_id = %self.room_id,
                participant_id = %self.members[0].id,
                "host promoted"
            );
        }

        self.dispatch(
            Recipient::All,
            ServerMessage::PlayerLeft {
                message: format!("{} has left the room", member.name),
                player_name: member.name,
                players: self.roster(),
            },
        );

        if self.turn.phase().is_running() && remaining < self.config.min_players {
            self.stop_game();
        } else if was_drawer {
            self.end_turn(TurnOutcome::DrawerLeft);
        }

        Ok(LeaveOutcome::Remaining(remaining))
    }

    // -----------------------------------------------------------------------
    // Turn state machine
    // -----------------------------------------------------------------------

    fn handle_enter_game(&mut self, requester: ParticipantId) -> Result<(), RoomError> {
        let Some(pos) = self.position(requester) else {
            return Err(self.rejected(requester, "not in this room"));
        };
        if !self.members[pos].is_host {
            return Err(self.rejected(requester, "only the host can start the game"));
        }
        if self.members.len() < self.config.min_players {
            return Err(RoomError::NotEnoughPlayers {
                room: self.room_id.clone(),
                required: self.config.min_players,
                present: self.members.len(),
            });
        }

        let word = self.words.draw().to_string();
        self.turn.start(word)?;
        for member in &mut self.members {
            member.score = 0;
        }
        tracing::info!(
            room_id = %self.room_id,
            players = self.members.len(),
            "game started"
        );
        self.begin_turn();
        Ok(())
    }

    fn handle_tick(&mut self, tick: CountdownTick) {
        self.dispatch(Recipient::All, ServerMessage::TimerUpdate { time: tick.remaining });
        if tick.expired {
            self.end_turn(TurnOutcome::TimeUp);
        }
    }

    /// `InTurn → TransitionPause`.
    fn end_turn(&mut self, outcome: TurnOutcome) {
        self.countdown.cancel();
        let word = self.turn.word().unwrap_or_default().to_string();
        if let Err(e) = self.turn.finish(outcome, self.members.len()) {
            tracing::warn!(room_id = %self.room_id, error = %e, "turn end ignored");
            return;
        }

        let next_player = self
            .members
            .get(self.turn.upcoming_index(self.members.len()))
            .map_or_else(|| NOBODY.to_string(), |m| m.name.clone());

        let announcement = match outcome {
            TurnOutcome::TimeUp => ServerMessage::TimeUpModal {
                message: TIME_UP_MESSAGE.into(),
                next_player,
            },
            TurnOutcome::DrawerLeft => ServerMessage::TimeUpModal {
                message: DRAWER_LEFT_MESSAGE.into(),
                next_player,
            },
            TurnOutcome::Guessed { guesser } => ServerMessage::WordGuessed {
                player_name: self.name_of(guesser).unwrap_or(NOBODY).to_string(),
                word,
                next_player,
            },
        };
        tracing::info!(room_id = %self.room_id, ?outcome, "turn ended");
        self.dispatch(Recipient::All, announcement);

        if self.config.pause_ticks == 0 {
            self.next_turn();
        } else {
            self.pause.arm(self.config.pause_duration());
        }
    }

    /// `TransitionPause → InTurn`.
    fn next_turn(&mut self) {
        let word = self.words.draw().to_string();
        let outcome = match self.turn.advance(self.members.len(), word) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, error = %e, "turn advance ignored");
                return;
            }
        };

        let close = match outcome {
            TurnOutcome::Guessed { .. } => ServerMessage::CloseGuessedModal,
            TurnOutcome::TimeUp | TurnOutcome::DrawerLeft => ServerMessage::CloseModal,
        };
        self.dispatch(Recipient::All, close);
        self.begin_turn();
    }

    /// Starts the countdown and announces the turn: `gameStarted` to each
    /// participant (the word only to the drawer), then `clearCanvas`.
    fn begin_turn(&mut self) {
        self.countdown.start(self.config.turn_ticks);
        for member in &self.members {
            if let Some(started) = self.turn_started_for(member.id) {
                let _ = member.sender.send(started);
            }
        }
        self.dispatch(Recipient::All, ServerMessage::ClearCanvas);
        tracing::debug!(
            room_id = %self.room_id,
            turn_index = self.turn.turn_index(),
            round = self.turn.round(),
            "turn started"
        );
    }

    fn stop_game(&mut self) {
        self.countdown.cancel();
        self.pause.disarm();
        self.turn.stop();
        tracing::info!(
            room_id = %self.room_id,
            players = self.members.len(),
            "game stopped"
        );
        self.dispatch(
            Recipient::All,
            ServerMessage::GameStopped {
                message: GAME_STOPPED_MESSAGE.into(),
            },
        );
    }

    /// The `gameStarted` event `viewer` should see for the current turn.
    fn turn_started_for(&self, viewer: ParticipantId) -> Option<ServerMessage> {
        let drawer = self.members.get(self.turn.turn_index())?;
        let word = self.turn.word()?;
        let show_word = viewer == drawer.id && self.turn.phase() == TurnPhase::InTurn;
        Some(ServerMessage::GameStarted {
            word: show_word.then(|| word.to_string()),
            word_length: word.chars().count(),
            turn_index: self.turn.turn_index(),
            round: self.turn.round(),
            drawer: drawer.id,
            scores: self.scores(),
        })
    }

    // -----------------------------------------------------------------------
    // Guesses and strokes
    // -----------------------------------------------------------------------

    fn handle_guess(&mut self, participant: ParticipantId, text: &str) {
        let Some(pos) = self.position(participant) else {
            tracing::warn!(
                room_id = %self.room_id,
                participant_id = %participant,
                "guess from non-member, ignoring"
            );
            return;
        };
        if self.turn.drawer_index() == Some(pos) {
            let err = self.rejected(participant, "the drawer cannot guess");
            tracing::debug!(room_id = %self.room_id, error = %err, "guess rejected");
            return;
        }

        let secret = if self.turn.phase() == TurnPhase::InTurn {
            self.turn.word()
        } else {
            None
        };
        match guess::evaluate(text, secret) {
            Verdict::Ignored => {}
            Verdict::Chat => {
                let chat = ServerMessage::ChatMessage {
                    player_name: self.members[pos].name.clone(),
                    message: text.to_string(),
                };
                self.dispatch(Recipient::AllExcept(participant), chat);
            }
            Verdict::Correct => {
                self.members[pos].score += 1;
                tracing::info!(
                    room_id = %self.room_id,
                    participant_id = %participant,
                    score = self.members[pos].score,
                    "word guessed"
                );
                self.end_turn(TurnOutcome::Guessed { guesser: participant });
            }
        }
    }

    fn handle_stroke(&mut self, participant: ParticipantId, stroke: Stroke) {
        let drawer = self
            .turn
            .drawer_index()
            .and_then(|i| self.members.get(i))
            .map(|m| m.id);

        match relay::route(&stroke, participant, drawer) {
            Some(recipient) => self.dispatch(recipient, stroke.into()),
            None => tracing::debug!(
                room_id = %self.room_id,
                participant_id = %participant,
                kind = stroke.kind(),
                "stroke from non-drawer dropped"
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Sends an event to every addressed member. Members whose connection
    /// is gone are skipped silently; their leave is already on its way.
    fn dispatch(&self, recipient: Recipient, msg: ServerMessage) {
        if let Recipient::Player(id) = recipient {
            if let Some(member) = self.members.iter().find(|m| m.id == id) {
                let _ = member.sender.send(msg);
            }
            return;
        }
        for member in self.members.iter().filter(|m| recipient.includes(m.id)) {
            let _ = member.sender.send(msg.clone());
        }
    }

    fn position(&self, participant: ParticipantId) -> Option<usize> {
        self.members.iter().position(|m| m.id == participant)
    }

    fn name_of(&self, participant: ParticipantId) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.id == participant)
            .map(|m| m.name.as_str())
    }

    fn rejected(&self, participant: ParticipantId, reason: &'static str) -> RoomError {
        RoomError::InvalidParticipant {
            participant,
            room: self.room_id.clone(),
            reason,
        }
    }

    fn roster(&self) -> Vec<ParticipantInfo> {
        self.members.iter().map(Member::info).collect()
    }

    fn scores(&self) -> Vec<ScoreEntry> {
        self.members
            .iter()
            .map(|m| ScoreEntry {
                id: m.id,
                name: m.name.clone(),
                score: m.score,
            })
            .collect()
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            players: self.roster(),
            phase: self.turn.phase(),
            turn_index: self.turn.turn_index(),
            round: self.turn.round(),
            drawer: self
                .turn
                .drawer_index()
                .and_then(|i| self.members.get(i))
                .map(|m| m.id),
        }
    }
}
