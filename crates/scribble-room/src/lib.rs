//! Rooms for Scribble: registry, turn cycle, guessing and draw relay.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! participants, turn state and timers. Everything that happens in a room
//! goes through that task, one event at a time.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates, looks up and destroys rooms by code
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`TurnState`] / [`TurnPhase`]: the turn state machine
//! - [`WordBank`]: where secret words come from
//! - [`RoomConfig`]: turn length, pause length, minimum players
//!
//! The guess evaluator ([`guess`]) and draw relay ([`relay`]) are pure
//! functions the actor calls into.

mod actor;
mod config;
mod error;
pub mod guess;
mod manager;
pub mod relay;
mod room;
mod turn;
mod words;

pub use config::{RoomConfig, TurnPhase};
pub use error::RoomError;
pub use manager::RoomRegistry;
pub use room::{LeaveOutcome, NewParticipant, PlayerSender, RoomHandle, RoomSnapshot};
pub use turn::{TurnOutcome, TurnState};
pub use words::WordBank;
