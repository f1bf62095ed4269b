//! Room registry: creates, looks up and tears down rooms by code.

use std::collections::HashMap;
use std::sync::Arc;

use scribble_protocol::{ParticipantId, RoomCode};
use tokio::sync::Mutex;

use crate::room::{display_name, spawn_room};
use crate::{LeaveOutcome, NewParticipant, RoomConfig, RoomError, RoomHandle, RoomSnapshot, WordBank};

/// The authoritative map from room code to running room.
///
/// The map sits behind its own lock, held only to look up, insert or drop
/// an entry and never while waiting on a room. A busy room therefore never
/// delays creates, joins or leaves in other rooms.
///
/// An emptied room closes its inbox before it acknowledges the last leave,
/// so a join racing with the teardown is refused and the code can be
/// reused straight away, even before the stale entry is dropped.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
    words: Arc<WordBank>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, words: WordBank) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config: config.validated(),
            words: Arc::new(words),
        }
    }

    /// Creates a room with `host` as its only participant and spawns its
    /// actor. The host receives `room-created`.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyExists`] if the code is taken.
    /// - [`RoomError::InvalidParticipant`] if the host's name is blank.
    pub async fn create_room(
        &self,
        room_id: RoomCode,
        mut host: NewParticipant,
    ) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.get(&room_id).is_some_and(|handle| !handle.is_closed()) {
            return Err(RoomError::AlreadyExists(room_id));
        }
        host.name = display_name(&host.name).ok_or_else(|| RoomError::InvalidParticipant {
            participant: host.id,
            room: room_id.clone(),
            reason: "display name must not be empty",
        })?;

        let host_id = host.id;
        let handle = spawn_room(
            room_id.clone(),
            host,
            self.config.clone(),
            Arc::clone(&self.words),
        );
        rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, host = %host_id, rooms = rooms.len(), "room created");
        Ok(handle)
    }

    /// Adds a participant to an existing room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no room has this code, or whatever the
    /// room rejects the participant with.
    pub async fn join_room(
        &self,
        room_id: &RoomCode,
        participant: NewParticipant,
    ) -> Result<RoomHandle, RoomError> {
        let handle = self.live_handle(room_id).await?;
        match handle.join(participant).await {
            Ok(()) => Ok(handle),
            // Emptied and stopped after the lookup.
            Err(RoomError::Unavailable(_)) if handle.is_closed() => {
                self.release(room_id, &handle).await;
                Err(RoomError::NotFound(room_id.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// Removes a participant from a room. When that empties the room, its
    /// actor (with its timers) has stopped and the room is unregistered
    /// before this returns.
    pub async fn remove_participant(
        &self,
        room_id: &RoomCode,
        participant: ParticipantId,
    ) -> Result<LeaveOutcome, RoomError> {
        let handle = self.live_handle(room_id).await?;
        let outcome = handle.leave(participant).await?;
        if outcome == LeaveOutcome::Emptied {
            self.release(room_id, &handle).await;
        }
        Ok(outcome)
    }

    /// Returns a snapshot of a room.
    pub async fn list_room(&self, room_id: &RoomCode) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .handle(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.snapshot().await
    }

    /// A cloned handle, for sending commands to the room directly.
    pub async fn handle(&self, room_id: &RoomCode) -> Option<RoomHandle> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    pub async fn contains(&self, room_id: &RoomCode) -> bool {
        self.rooms.lock().await.contains_key(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Looks up a room, dropping its entry if the actor is gone.
    async fn live_handle(&self, room_id: &RoomCode) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(room_id) {
            Some(handle) if handle.is_closed() => {
                tracing::warn!(%room_id, "dropping handle of stopped room");
                rooms.remove(room_id);
                Err(RoomError::NotFound(room_id.clone()))
            }
            Some(handle) => Ok(handle.clone()),
            None => Err(RoomError::NotFound(room_id.clone())),
        }
    }

    /// Unregisters `room_id`, unless the code already belongs to a newer room.
    async fn release(&self, room_id: &RoomCode, handle: &RoomHandle) {
        let mut rooms = self.rooms.lock().await;
        if rooms.get(room_id).is_some_and(|current| current.same_room(handle)) {
            rooms.remove(room_id);
            tracing::info!(%room_id, rooms = rooms.len(), "room destroyed");
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default(), WordBank::default())
    }
}
