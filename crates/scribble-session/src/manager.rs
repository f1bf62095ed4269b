//! The session manager: tracks every live connection and its room binding.
//!
//! # Concurrency note
//!
//! `SessionManager` is a plain `HashMap` wrapper. The server keeps it behind
//! a `tokio::sync::Mutex` in its shared state and never holds that lock
//! across a call into a room.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use scribble_protocol::{ParticipantId, RoomCode};

use crate::{Session, SessionError};

/// Registry of live sessions, keyed by participant handle.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ bind_room() ──→ unbind_room() ──→ disconnect()
///    │              │                                 ▲
///    │              └─────────────────────────────────┤
///    └────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ParticipantId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for a freshly accepted connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the handle is already live.
    pub fn create(&mut self, participant_id: ParticipantId) -> Result<&Session, SessionError> {
        match self.sessions.entry(participant_id) {
            Entry::Occupied(_) => Err(SessionError::AlreadyConnected(participant_id)),
            Entry::Vacant(slot) => {
                tracing::debug!(%participant_id, "session created");
                Ok(slot.insert(Session::new(participant_id)))
            }
        }
    }

    /// Records that the participant created or joined `room`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if there is no session.
    /// - [`SessionError::AlreadyInRoom`] if the session is bound to a room
    ///   already, including the same one.
    pub fn bind_room(
        &mut self,
        participant_id: ParticipantId,
        room: RoomCode,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&participant_id)
            .ok_or(SessionError::NotFound(participant_id))?;

        if let Some(current) = &session.room {
            return Err(SessionError::AlreadyInRoom(participant_id, current.clone()));
        }
        tracing::debug!(%participant_id, room_id = %room, "session bound to room");
        session.room = Some(room);
        Ok(())
    }

    /// Clears the room binding and returns the room that was bound.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if there is no session.
    /// - [`SessionError::NotInRoom`] if no room was bound.
    pub fn unbind_room(&mut self, participant_id: ParticipantId) -> Result<RoomCode, SessionError> {
        let session = self
            .sessions
            .get_mut(&participant_id)
            .ok_or(SessionError::NotFound(participant_id))?;
        session
            .room
            .take()
            .ok_or(SessionError::NotInRoom(participant_id))
    }

    /// The room the participant is currently in.
    pub fn room_of(&self, participant_id: ParticipantId) -> Option<&RoomCode> {
        self.sessions.get(&participant_id)?.room.as_ref()
    }

    /// Closes the session and hands back its final state, so the caller can
    /// remove the participant from the room it was bound to.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if there is no session (for example when
    /// the connection already went through `disconnect`).
    pub fn disconnect(&mut self, participant_id: ParticipantId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&participant_id)
            .ok_or(SessionError::NotFound(participant_id))?;
        tracing::debug!(
            %participant_id,
            room_id = ?session.room.as_ref().map(RoomCode::as_str),
            connected_ms = session.age_ms(),
            "session closed"
        );
        Ok(session)
    }

    pub fn get(&self, participant_id: ParticipantId) -> Option<&Session> {
        self.sessions.get(&participant_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
