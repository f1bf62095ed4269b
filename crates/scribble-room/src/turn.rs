//! The turn state machine: whose turn it is, which round, which word.
//!
//! `TurnState` is plain data. It knows nothing about participants beyond
//! their count and positions, and nothing about timers: the room actor
//! drives it and starts or cancels its countdown alongside each transition.

use scribble_protocol::ParticipantId;

use crate::{RoomError, TurnPhase};

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The countdown reached zero.
    TimeUp,
    /// Someone guessed the word.
    Guessed { guesser: ParticipantId },
    /// The drawer left the room mid-turn.
    DrawerLeft,
}

/// Who draws once the pause is over. Fixed when the turn ends, so the
/// name announced with the pause is the one that draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NextDrawer {
    index: usize,
    /// Reaching `index` completes a rotation.
    wraps: bool,
}

/// Turn order bookkeeping for one room.
///
/// Invariant: whenever the room has participants, `turn_index` is a valid
/// position in its participant list.
#[derive(Debug, Clone)]
pub struct TurnState {
    phase: TurnPhase,
    turn_index: usize,
    round: u32,
    word: Option<String>,
    /// Set when the drawer was removed and somebody moved into their slot:
    /// that participant draws next, and reaching them is not a wrap.
    successor_in_place: bool,
    next: Option<NextDrawer>,
    outcome: Option<TurnOutcome>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::Idle,
            turn_index: 0,
            round: 1,
            word: None,
            successor_in_place: false,
            next: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The secret word of the current (or just finished) turn.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    /// Why the last turn ended, while the room is in its pause.
    pub fn outcome(&self) -> Option<TurnOutcome> {
        self.outcome
    }

    /// Position of the drawer while a turn is running.
    pub fn drawer_index(&self) -> Option<usize> {
        (self.phase == TurnPhase::InTurn).then_some(self.turn_index)
    }

    /// `Idle → InTurn`: the first participant draws `word` in round 1.
    pub fn start(&mut self, word: String) -> Result<(), RoomError> {
        if self.phase != TurnPhase::Idle {
            return Err(RoomError::InvalidState(format!(
                "cannot enter game in phase {}",
                self.phase
            )));
        }
        *self = Self {
            phase: TurnPhase::InTurn,
            word: Some(word),
            ..Self::new()
        };
        Ok(())
    }

    /// `InTurn → TransitionPause` in a room of `len` participants,
    /// remembering why the turn ended and who draws next.
    pub fn finish(&mut self, outcome: TurnOutcome, len: usize) -> Result<(), RoomError> {
        if self.phase != TurnPhase::InTurn {
            return Err(RoomError::InvalidState(format!(
                "cannot end a turn in phase {}",
                self.phase
            )));
        }
        self.next = Some(self.following(len));
        self.phase = TurnPhase::TransitionPause;
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Position of the next drawer in a room of `len` participants.
    ///
    /// During the pause this is the drawer chosen when the turn ended;
    /// participants joining since then don't change it.
    pub fn upcoming_index(&self, len: usize) -> usize {
        match self.next {
            Some(next) => next.index,
            None => self.following(len).index,
        }
    }

    fn following(&self, len: usize) -> NextDrawer {
        if len == 0 {
            return NextDrawer { index: 0, wraps: false };
        }
        if self.successor_in_place {
            return NextDrawer { index: self.turn_index % len, wraps: false };
        }
        let index = (self.turn_index + 1) % len;
        NextDrawer { index, wraps: index == 0 }
    }

    /// `TransitionPause → InTurn`: hands the pen to the next drawer with a
    /// fresh `word` and returns why the previous turn ended.
    ///
    /// The round increments when the rotation wraps back to position 0.
    pub fn advance(&mut self, len: usize, word: String) -> Result<TurnOutcome, RoomError> {
        if self.phase != TurnPhase::TransitionPause {
            return Err(RoomError::InvalidState(format!(
                "cannot advance turn in phase {}",
                self.phase
            )));
        }
        if len == 0 {
            return Err(RoomError::InvalidState("cannot advance turn in an empty room".into()));
        }

        let next = self.next.take().unwrap_or_else(|| self.following(len));
        let next = if next.index < len {
            next
        } else {
            NextDrawer { index: 0, wraps: true }
        };
        if next.wraps {
            self.round += 1;
        }
        self.turn_index = next.index;
        self.successor_in_place = false;
        self.phase = TurnPhase::InTurn;
        self.word = Some(word);
        Ok(self.outcome.take().unwrap_or(TurnOutcome::TimeUp))
    }

    /// Re-validates the turn index after the participant at `removed` left,
    /// leaving `remaining` participants.
    ///
    /// - Someone before the drawer left: the index shifts down, the drawer
    ///   stays the same.
    /// - The drawer left: whoever slides into their slot draws next. If the
    ///   drawer was last in order, the rotation wraps to position 0.
    /// - During the pause, the announced next drawer is tracked the same
    ///   way: shifted down, replaced by whoever slides into their slot, or
    ///   wrapped to position 0 if they were last.
    /// - The room emptied: back to a fresh idle state.
    pub fn remove_participant(&mut self, removed: usize, remaining: usize) {
        if remaining == 0 {
            *self = Self::new();
            return;
        }
        if !self.phase.is_running() {
            return;
        }

        if removed < self.turn_index {
            self.turn_index -= 1;
        } else if removed == self.turn_index {
            if removed < remaining {
                self.successor_in_place = true;
            } else {
                self.turn_index = remaining - 1;
                self.successor_in_place = false;
            }
        }
        if let Some(next) = &mut self.next {
            if removed < next.index {
                next.index -= 1;
            } else if removed == next.index && removed == remaining {
                *next = NextDrawer { index: 0, wraps: true };
            }
        }
        debug_assert!(self.turn_index < remaining);
    }

    /// Drops back to `Idle`, forgetting turn order and word.
    pub fn stop(&mut self) {
        *self = Self::new();
    }
}
