//! Connection lifecycle: leaving a room, explicitly or by disconnecting.

use std::sync::Arc;

use scribble_protocol::{Codec, ParticipantId, RoomCode};
use scribble_room::LeaveOutcome;
use scribble_session::SessionError;

use crate::server::ServerState;
use crate::ScribbleError;

/// Drop guard that closes a participant's session when the handler exits.
///
/// Runs on every exit path, panics included. `Drop` is synchronous, so
/// the async cleanup is spawned as a fire-and-forget task.
pub(crate) struct SessionGuard<C: Codec> {
    participant_id: ParticipantId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> SessionGuard<C> {
    pub(crate) fn new(participant_id: ParticipantId, state: Arc<ServerState<C>>) -> Self {
        Self {
            participant_id,
            state,
        }
    }
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let participant_id = self.participant_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            disconnect(&state, participant_id).await;
        });
    }
}

/// Closes the session and removes the participant from their room, if any.
pub(crate) async fn disconnect<C: Codec>(state: &ServerState<C>, participant_id: ParticipantId) {
    let session = match state.sessions.lock().await.disconnect(participant_id) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(%participant_id, error = %e, "no session to close");
            return;
        }
    };

    if let Some(room_id) = &session.room {
        if let Err(e) = remove_from_room(state, participant_id, room_id).await {
            tracing::warn!(%participant_id, %room_id, error = %e, "leave on disconnect failed");
        }
    }
    tracing::info!(
        %participant_id,
        connected_for = ?session.age(),
        "participant disconnected"
    );
}

/// Handles an explicit `leaveRoom`. The connection stays open and may
/// create or join another room afterwards.
///
/// # Errors
/// [`SessionError::NotInRoom`] if the connection isn't in `room_id`.
pub(crate) async fn leave_room<C: Codec>(
    state: &ServerState<C>,
    participant_id: ParticipantId,
    room_id: &RoomCode,
) -> Result<LeaveOutcome, ScribbleError> {
    {
        let mut sessions = state.sessions.lock().await;
        if sessions.room_of(participant_id) != Some(room_id) {
            return Err(SessionError::NotInRoom(participant_id).into());
        }
        sessions.unbind_room(participant_id)?;
    }
    remove_from_room(state, participant_id, room_id).await
}

async fn remove_from_room<C: Codec>(
    state: &ServerState<C>,
    participant_id: ParticipantId,
    room_id: &RoomCode,
) -> Result<LeaveOutcome, ScribbleError> {
    let outcome = state.rooms.remove_participant(room_id, participant_id).await?;
    tracing::debug!(%participant_id, %room_id, ?outcome, "left room");
    Ok(outcome)
}
