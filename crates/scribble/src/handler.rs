//! Per-connection handler: session setup, the outbound writer, and routing
//! of client events.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create a session keyed by the connection's id
//!   2. Spawn a writer task draining the participant's outbound channel and
//!      pinging the client between events
//!   3. Loop: receive frames, decode, dispatch to the registry or a room
//!
//! A connection is dropped after `idle_timeout` without any inbound
//! traffic. Pongs count, so a player who only watches stays connected.
//!
//! Everything sent to a participant goes through that one channel, so
//! replies to this connection and room broadcasts keep their order.

use std::sync::Arc;

use scribble_protocol::{ClientMessage, Codec, ParticipantId, RoomCode, ServerMessage};
use scribble_room::{NewParticipant, PlayerSender, RoomError, RoomHandle};
use scribble_session::SessionError;
use scribble_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::lifecycle::{self, SessionGuard};
use crate::server::ServerState;
use crate::ScribbleError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScribbleError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let participant_id = ParticipantId(conn_id.into_inner());

    {
        let mut sessions = state.sessions.lock().await;
        sessions.create(participant_id)?;
    }
    let _guard = SessionGuard::new(participant_id, Arc::clone(&state));
    tracing::info!(%conn_id, %participant_id, "participant connected");

    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), outbound_rx));

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%participant_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%participant_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%participant_id, "connection idle, closing");
                break;
            }
        };
        if data.is_empty() {
            continue; // keep-alive
        }

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%participant_id, error = %e, "malformed client event");
                let _ = outbound.send(ServerMessage::error(400, format!("invalid message: {e}")));
                continue;
            }
        };

        let event = msg.name();
        if let Err(e) = dispatch(&state, participant_id, &outbound, msg).await {
            tracing::debug!(%participant_id, event, error = %e, "request rejected");
            let _ = outbound.send(e.to_event());
        }
    }

    let _ = conn.close().await;
    // _guard drops here → session closed and the room left.
    Ok(())
}

/// Drains one participant's outbound channel into the socket, in order,
/// and pings the client every `state.keepalive`.
///
/// Ends when every sender is gone (handler exited and the room dropped
/// the participant) or the socket refuses a write.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let conn_id = conn.id();
    let mut keepalive =
        tokio::time::interval_at(Instant::now() + state.keepalive, state.keepalive);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let msg = tokio::select! {
            msg = outbound.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
            _ = keepalive.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%conn_id, error = %e, "ping failed, stopping writer");
                    break;
                }
                continue;
            }
        };
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        let sent = match std::str::from_utf8(&bytes) {
            Ok(text) => conn.send_text(text).await,
            Err(_) => conn.send(&bytes).await,
        };
        if let Err(e) = sent {
            tracing::debug!(%conn_id, error = %e, "write failed, stopping writer");
            break;
        }
    }
}

/// Routes one decoded client event.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    participant_id: ParticipantId,
    outbound: &PlayerSender,
    msg: ClientMessage,
) -> Result<(), ScribbleError> {
    match msg {
        ClientMessage::CreateRoom { room_id, name, avatar } => {
            let participant = NewParticipant {
                id: participant_id,
                name,
                avatar,
                sender: outbound.clone(),
            };
            create_room(state, participant, room_id).await
        }
        ClientMessage::JoinRoom { room_id, name, avatar } => {
            let participant = NewParticipant {
                id: participant_id,
                name,
                avatar,
                sender: outbound.clone(),
            };
            join_room(state, participant, room_id).await
        }
        ClientMessage::JoinLobby { room_id } => {
            let snapshot = state.rooms.list_room(&room_id).await?;
            let _ = outbound.send(ServerMessage::LobbyJoined {
                room_id,
                players: snapshot.players,
            });
            Ok(())
        }
        ClientMessage::EnterGame { room_id } => {
            let handle = member_handle(state, participant_id, &room_id).await?;
            handle.enter_game(participant_id).await?;
            Ok(())
        }
        ClientMessage::GuessWord { room_id, guess, .. } => {
            let handle = member_handle(state, participant_id, &room_id).await?;
            handle.submit_guess(participant_id, guess).await?;
            Ok(())
        }
        ClientMessage::StartDraw { .. }
        | ClientMessage::Draw { .. }
        | ClientMessage::EndDraw { .. }
        | ClientMessage::ClearCanvas { .. } => {
            let Some(stroke) = msg.stroke() else {
                return Ok(());
            };
            let handle = member_handle(state, participant_id, msg.room_id()).await?;
            handle.relay_stroke(participant_id, stroke).await?;
            Ok(())
        }
        ClientMessage::LeaveRoom { room_id } => {
            lifecycle::leave_room(state, participant_id, &room_id).await?;
            Ok(())
        }
    }
}

/// Binds the session first so a connection can never end up in two rooms,
/// and releases the binding if the registry says no.
async fn create_room<C: Codec>(
    state: &ServerState<C>,
    host: NewParticipant,
    room_id: RoomCode,
) -> Result<(), ScribbleError> {
    let participant_id = host.id;
    state
        .sessions
        .lock()
        .await
        .bind_room(participant_id, room_id.clone())?;

    let created = state.rooms.create_room(room_id, host).await;
    if let Err(e) = created {
        let _ = state.sessions.lock().await.unbind_room(participant_id);
        return Err(e.into());
    }
    Ok(())
}

async fn join_room<C: Codec>(
    state: &ServerState<C>,
    participant: NewParticipant,
    room_id: RoomCode,
) -> Result<(), ScribbleError> {
    let participant_id = participant.id;
    state
        .sessions
        .lock()
        .await
        .bind_room(participant_id, room_id.clone())?;

    let joined = state.rooms.join_room(&room_id, participant).await;
    if let Err(e) = joined {
        let _ = state.sessions.lock().await.unbind_room(participant_id);
        return Err(e.into());
    }
    Ok(())
}

/// The handle of `room_id`, provided this connection is a member of it.
async fn member_handle<C: Codec>(
    state: &ServerState<C>,
    participant_id: ParticipantId,
    room_id: &RoomCode,
) -> Result<RoomHandle, ScribbleError> {
    let is_member = state.sessions.lock().await.room_of(participant_id) == Some(room_id);
    if !is_member {
        return Err(SessionError::NotInRoom(participant_id).into());
    }
    let handle = state.rooms.handle(room_id).await;
    handle.ok_or_else(|| RoomError::NotFound(room_id.clone()).into())
}
