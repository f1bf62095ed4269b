//! Integration tests for the room system.
//!
//! Every test runs on a paused clock, so whole 60-second turns and 3-second
//! pauses elapse instantly whenever the test is waiting on a room event.
//! `snapshot()` doubles as a barrier: the actor answers it only after every
//! command sent before it has been processed.

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use scribble_protocol::{ParticipantId, RoomCode, ServerMessage, Stroke, StrokePoint};
use scribble_room::{
    LeaveOutcome, NewParticipant, RoomConfig, RoomError, RoomHandle, RoomRegistry, TurnPhase,
    WordBank,
};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> ParticipantId {
    ParticipantId(id)
}

fn code(s: &str) -> RoomCode {
    RoomCode::parse(s).unwrap()
}

/// A registry whose word bank only contains "cat".
fn registry() -> RoomRegistry {
    RoomRegistry::new(RoomConfig::default(), WordBank::new(["cat"]).unwrap())
}

/// The receiving end of a participant's outbound channel.
struct Client {
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Client {
    /// Next event, timer updates included.
    async fn next(&mut self) -> ServerMessage {
        tokio::time::timeout(Duration::from_secs(600), self.rx.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("room dropped the sender")
    }

    /// Next event that isn't a `timerUpdate`.
    async fn next_event(&mut self) -> ServerMessage {
        loop {
            let msg = self.next().await;
            if !matches!(msg, ServerMessage::TimerUpdate { .. }) {
                return msg;
            }
        }
    }

    /// Everything already delivered, minus timer updates.
    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if !matches!(msg, ServerMessage::TimerUpdate { .. }) {
                out.push(msg);
            }
        }
        out
    }
}

fn participant(id: u64, name: &str) -> (NewParticipant, Client) {
    let (tx, rx) = mpsc::unbounded_channel();
    let p = NewParticipant {
        id: pid(id),
        name: name.to_string(),
        avatar: None,
        sender: tx,
    };
    (p, Client { rx })
}

/// Alice (host, id 1) creates `AB12`, Bob (id 2) joins. Membership events
/// are consumed.
async fn alice_and_bob(reg: &RoomRegistry) -> (RoomHandle, Client, Client) {
    let (alice_p, mut alice) = participant(1, "Alice");
    let (bob_p, mut bob) = participant(2, "Bob");
    let handle = reg.create_room(code("AB12"), alice_p).await.unwrap();
    assert!(matches!(alice.next().await, ServerMessage::RoomCreated { .. }));
    reg.join_room(&code("AB12"), bob_p).await.unwrap();
    assert!(matches!(alice.next().await, ServerMessage::PlayerJoined { .. }));
    assert!(matches!(bob.next().await, ServerMessage::PlayerJoined { .. }));
    (handle, alice, bob)
}

fn expect_game_started(msg: ServerMessage) -> (Option<String>, usize, u32, ParticipantId) {
    match msg {
        ServerMessage::GameStarted {
            word,
            turn_index,
            round,
            drawer,
            ..
        } => (word, turn_index, round, drawer),
        other => panic!("expected gameStarted, got {other:?}"),
    }
}

fn point(x: f64) -> Stroke {
    Stroke::Point(StrokePoint { x, y: 0.0, color: "#000".into() })
}

// =========================================================================
// Registry: create / join / teardown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_create_room_host_receives_room_created() {
    let reg = registry();
    let (alice_p, mut alice) = participant(1, "  Alice ");
    reg.create_room(code("AB12"), alice_p).await.unwrap();

    match alice.next().await {
        ServerMessage::RoomCreated { room_id, players } => {
            assert_eq!(room_id, code("AB12"));
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].name, "Alice");
            assert!(players[0].is_host);
            assert_eq!(players[0].score, 0);
        }
        other => panic!("expected room-created, got {other:?}"),
    }
    assert_eq!(reg.room_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_create_room_duplicate_code_returns_already_exists() {
    let reg = registry();
    let (a, _alice) = participant(1, "Alice");
    let (b, _bob) = participant(2, "Bob");
    reg.create_room(code("AB12"), a).await.unwrap();
    let result = reg.create_room(code("AB12"), b).await;
    assert!(matches!(result, Err(RoomError::AlreadyExists(c)) if c == code("AB12")));
}

#[tokio::test(start_paused = true)]
async fn test_create_room_blank_name_is_rejected() {
    let reg = registry();
    let (a, _alice) = participant(1, "   ");
    let result = reg.create_room(code("AB12"), a).await;
    assert!(matches!(result, Err(RoomError::InvalidParticipant { .. })));
    assert_eq!(reg.room_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_join_room_unknown_code_returns_not_found() {
    let reg = registry();
    let (b, _bob) = participant(2, "Bob");
    let result = reg.join_room(&code("ZZ99"), b).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn test_join_room_broadcasts_roster_in_join_order() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    let (carol_p, mut carol) = participant(3, "Carol");
    reg.join_room(&code("AB12"), carol_p).await.unwrap();

    match carol.next().await {
        ServerMessage::PlayerJoined { players, .. } => {
            let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, ["Alice", "Bob", "Carol"]);
            assert_eq!(players.iter().filter(|p| p.is_host).count(), 1);
        }
        other => panic!("expected player-joined, got {other:?}"),
    }
    assert_eq!(handle.snapshot().await.unwrap().players.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_join_room_same_participant_twice_is_rejected() {
    let reg = registry();
    let (_handle, _alice, _bob) = alice_and_bob(&reg).await;
    let (again, _bob2) = participant(2, "Bob");
    let result = reg.join_room(&code("AB12"), again).await;
    assert!(matches!(result, Err(RoomError::InvalidParticipant { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_remove_last_participant_destroys_room_and_frees_code() {
    let reg = registry();
    let (a, _alice) = participant(1, "Alice");
    let handle = reg.create_room(code("AB12"), a).await.unwrap();

    let outcome = reg.remove_participant(&code("AB12"), pid(1)).await.unwrap();
    assert_eq!(outcome, LeaveOutcome::Emptied);
    assert_eq!(reg.room_count().await, 0);
    assert!(!reg.contains(&code("AB12")).await);

    // The actor is gone with its timers.
    assert!(matches!(handle.snapshot().await, Err(RoomError::Unavailable(_))));

    let (b, _bob) = participant(2, "Bob");
    assert!(matches!(
        reg.join_room(&code("AB12"), b).await,
        Err(RoomError::NotFound(_))
    ));

    let (c, mut carol) = participant(3, "Carol");
    reg.create_room(code("AB12"), c).await.unwrap();
    assert!(matches!(carol.next().await, ServerMessage::RoomCreated { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_registry_serves_other_rooms_while_one_is_waited_on() {
    let reg = registry();
    let (a, _alice) = participant(1, "Alice");
    reg.create_room(code("AB12"), a).await.unwrap();
    let mut cx = Context::from_waker(Waker::noop());

    // AB12's actor hasn't run yet, so this join is parked on its reply.
    let (b, _bob) = participant(2, "Bob");
    let ab12 = code("AB12");
    let mut join = pin!(reg.join_room(&ab12, b));
    assert!(join.as_mut().poll(&mut cx).is_pending());

    let (c, _carol) = participant(3, "Carol");
    let mut create = pin!(reg.create_room(code("CD34"), c));
    assert!(matches!(create.as_mut().poll(&mut cx), Poll::Ready(Ok(_))));
    let mut count = pin!(reg.room_count());
    assert!(matches!(count.as_mut().poll(&mut cx), Poll::Ready(2)));

    join.await.unwrap();
    assert_eq!(reg.list_room(&code("AB12")).await.unwrap().players.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remove_participant_not_in_room_is_rejected() {
    let reg = registry();
    let (_handle, _alice, _bob) = alice_and_bob(&reg).await;
    let result = reg.remove_participant(&code("AB12"), pid(9)).await;
    assert!(matches!(result, Err(RoomError::InvalidParticipant { .. })));
    assert_eq!(reg.room_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_list_room_reports_phase_and_turn() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;

    let before = reg.list_room(&code("AB12")).await.unwrap();
    assert_eq!(before.phase, TurnPhase::Idle);
    assert_eq!(before.drawer, None);

    handle.enter_game(pid(1)).await.unwrap();
    let after = reg.list_room(&code("AB12")).await.unwrap();
    assert_eq!(after.phase, TurnPhase::InTurn);
    assert_eq!(after.turn_index, 0);
    assert_eq!(after.round, 1);
    assert_eq!(after.drawer, Some(pid(1)));

    assert!(matches!(
        reg.list_room(&code("NOPE")).await,
        Err(RoomError::NotFound(_))
    ));
}

// =========================================================================
// Membership changes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_leave_notifies_remaining_members() {
    let reg = registry();
    let (_handle, mut alice, _bob) = alice_and_bob(&reg).await;

    let outcome = reg.remove_participant(&code("AB12"), pid(2)).await.unwrap();
    assert_eq!(outcome, LeaveOutcome::Remaining(1));

    match alice.next().await {
        ServerMessage::PlayerLeft { player_name, message, players } => {
            assert_eq!(player_name, "Bob");
            assert_eq!(message, "Bob has left the room");
            assert_eq!(players.len(), 1);
        }
        other => panic!("expected player-left, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_host_leaving_promotes_next_participant() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    reg.remove_participant(&code("AB12"), pid(1)).await.unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.players.len(), 1);
    assert_eq!(snap.players[0].id, pid(2));
    assert!(snap.players[0].is_host);

    // The new host can start a game once someone else joins.
    let (carol_p, _carol) = participant(3, "Carol");
    reg.join_room(&code("AB12"), carol_p).await.unwrap();
    handle.enter_game(pid(2)).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_late_joiner_receives_running_turn_without_word() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();

    let (carol_p, mut carol) = participant(3, "Carol");
    reg.join_room(&code("AB12"), carol_p).await.unwrap();

    assert!(matches!(carol.next_event().await, ServerMessage::PlayerJoined { .. }));
    let (word, turn_index, round, drawer) = expect_game_started(carol.next_event().await);
    assert_eq!(word, None);
    assert_eq!((turn_index, round, drawer), (0, 1, pid(1)));
}

// =========================================================================
// Entering the game
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_enter_game_word_only_sent_to_drawer() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();

    let (word, turn_index, round, drawer) = expect_game_started(alice.next().await);
    assert_eq!(word.as_deref(), Some("cat"));
    assert_eq!((turn_index, round, drawer), (0, 1, pid(1)));
    assert_eq!(alice.next().await, ServerMessage::ClearCanvas);

    match bob.next().await {
        ServerMessage::GameStarted { word, word_length, scores, .. } => {
            assert_eq!(word, None);
            assert_eq!(word_length, 3);
            assert_eq!(scores.len(), 2);
        }
        other => panic!("expected gameStarted, got {other:?}"),
    }
    assert_eq!(bob.next().await, ServerMessage::ClearCanvas);
}

#[tokio::test(start_paused = true)]
async fn test_enter_game_by_non_host_is_rejected() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    let result = handle.enter_game(pid(2)).await;
    assert!(matches!(result, Err(RoomError::InvalidParticipant { .. })));
    assert_eq!(handle.snapshot().await.unwrap().phase, TurnPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_enter_game_alone_returns_not_enough_players() {
    let reg = registry();
    let (a, _alice) = participant(1, "Alice");
    let handle = reg.create_room(code("AB12"), a).await.unwrap();
    let result = handle.enter_game(pid(1)).await;
    assert!(matches!(
        result,
        Err(RoomError::NotEnoughPlayers { required: 2, present: 1, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_enter_game_twice_returns_invalid_state() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    assert!(matches!(
        handle.enter_game(pid(1)).await,
        Err(RoomError::InvalidState(_))
    ));
}

// =========================================================================
// Scenario AB12: a full two-player rotation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_scenario_two_players_full_rotation() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    let _ = expect_game_started(alice.next_event().await);
    let _ = alice.next_event().await; // clearCanvas
    let _ = expect_game_started(bob.next_event().await);
    let _ = bob.next_event().await; // clearCanvas

    // Wrong guess: chat to everyone but Bob.
    handle.submit_guess(pid(2), "dog").await.unwrap();
    assert_eq!(
        alice.next_event().await,
        ServerMessage::ChatMessage {
            player_name: "Bob".into(),
            message: "dog".into(),
        }
    );
    handle.snapshot().await.unwrap();
    assert!(bob.drain().is_empty(), "guesser must not get their own chat echo");

    // Correct guess, sloppy casing.
    handle.submit_guess(pid(2), "  Cat ").await.unwrap();
    let guessed = ServerMessage::WordGuessed {
        player_name: "Bob".into(),
        word: "cat".into(),
        next_player: "Bob".into(),
    };
    assert_eq!(alice.next_event().await, guessed);
    assert_eq!(bob.next_event().await, guessed);

    // Pause, then Bob draws turn 1 of round 1.
    assert_eq!(bob.next_event().await, ServerMessage::CloseGuessedModal);
    match bob.next_event().await {
        ServerMessage::GameStarted { word, turn_index, round, drawer, scores, .. } => {
            assert_eq!(word.as_deref(), Some("cat"));
            assert_eq!((turn_index, round, drawer), (1, 1, pid(2)));
            let bob_score = scores.iter().find(|s| s.id == pid(2)).map(|s| s.score);
            assert_eq!(bob_score, Some(1));
        }
        other => panic!("expected gameStarted, got {other:?}"),
    }
    assert_eq!(bob.next_event().await, ServerMessage::ClearCanvas);

    // Alice guesses; the rotation wraps into round 2.
    handle.submit_guess(pid(1), "cat").await.unwrap();
    assert!(matches!(
        bob.next_event().await,
        ServerMessage::WordGuessed { ref next_player, .. } if next_player == "Alice"
    ));
    assert_eq!(bob.next_event().await, ServerMessage::CloseGuessedModal);
    let (word, turn_index, round, drawer) = expect_game_started(bob.next_event().await);
    assert_eq!(word, None);
    assert_eq!((turn_index, round, drawer), (0, 2, pid(1)));
}

#[tokio::test(start_paused = true)]
async fn test_join_during_pause_keeps_announced_next_drawer() {
    let reg = registry();
    let (handle, _alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    handle.submit_guess(pid(2), "cat").await.unwrap();
    loop {
        if let ServerMessage::GameStarted { drawer, .. } = bob.next_event().await {
            if drawer == pid(2) {
                break;
            }
        }
    }
    assert_eq!(bob.next_event().await, ServerMessage::ClearCanvas);

    // Bob's turn resolves; Alice is announced, then Carol joins mid-pause.
    handle.submit_guess(pid(1), "cat").await.unwrap();
    assert!(matches!(
        bob.next_event().await,
        ServerMessage::WordGuessed { ref next_player, .. } if next_player == "Alice"
    ));
    let (carol_p, _carol) = participant(3, "Carol");
    reg.join_room(&code("AB12"), carol_p).await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, TurnPhase::TransitionPause);

    let started = loop {
        let msg = bob.next_event().await;
        if matches!(msg, ServerMessage::GameStarted { .. }) {
            break msg;
        }
    };
    let (_, turn_index, round, drawer) = expect_game_started(started);
    assert_eq!((turn_index, round, drawer), (0, 2, pid(1)));
}

// =========================================================================
// Timer behavior
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_turn_without_correct_guess_expires_after_sixty_updates() {
    let reg = registry();
    let (handle, _alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    let _ = bob.next().await; // gameStarted
    let _ = bob.next().await; // clearCanvas

    let mut times = Vec::new();
    let time_up = loop {
        match bob.next().await {
            ServerMessage::TimerUpdate { time } => times.push(time),
            other => break other,
        }
    };

    assert_eq!(times.len(), 60);
    assert_eq!(times, (0..60).rev().collect::<Vec<u32>>());
    assert_eq!(
        time_up,
        ServerMessage::TimeUpModal {
            message: "Time's up!".into(),
            next_player: "Bob".into(),
        }
    );

    // Exactly one expiry, then the automatic advance.
    assert_eq!(bob.next().await, ServerMessage::CloseModal);
    let (_, turn_index, round, drawer) = expect_game_started(bob.next().await);
    assert_eq!((turn_index, round, drawer), (1, 1, pid(2)));
}

#[tokio::test(start_paused = true)]
async fn test_correct_guess_cancels_countdown() {
    let reg = registry();
    let (handle, _alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    let _ = bob.next().await;
    let _ = bob.next().await;

    // Let a few seconds run, then guess.
    for expected in [59, 58, 57] {
        assert_eq!(bob.next().await, ServerMessage::TimerUpdate { time: expected });
    }
    handle.submit_guess(pid(2), "cat").await.unwrap();
    assert!(matches!(bob.next().await, ServerMessage::WordGuessed { .. }));

    // Nothing from the resolved turn's timer during the pause.
    assert_eq!(bob.next().await, ServerMessage::CloseGuessedModal);
    assert!(matches!(bob.next().await, ServerMessage::GameStarted { .. }));
    assert_eq!(bob.next().await, ServerMessage::ClearCanvas);

    // The new turn's countdown starts from the top.
    assert_eq!(bob.next().await, ServerMessage::TimerUpdate { time: 59 });
}

#[tokio::test(start_paused = true)]
async fn test_zero_pause_advances_immediately() {
    let config = RoomConfig { pause_ticks: 0, ..RoomConfig::default() };
    let reg = RoomRegistry::new(config, WordBank::new(["cat"]).unwrap());
    let (handle, _alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    let _ = bob.next_event().await;
    let _ = bob.next_event().await;

    handle.submit_guess(pid(2), "cat").await.unwrap();
    handle.snapshot().await.unwrap();
    let events = bob.drain();
    assert!(matches!(events[0], ServerMessage::WordGuessed { .. }));
    assert_eq!(events[1], ServerMessage::CloseGuessedModal);
    assert!(matches!(events[2], ServerMessage::GameStarted { turn_index: 1, .. }));
}

// =========================================================================
// Guess evaluation inside the room
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drawer_guess_is_not_relayed() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    handle.snapshot().await.unwrap();
    alice.drain();
    bob.drain();

    handle.submit_guess(pid(1), "cat").await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, TurnPhase::InTurn);
    assert!(alice.drain().is_empty());
    assert!(bob.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_guess_before_game_is_chat() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;

    handle.submit_guess(pid(2), "cat").await.unwrap();
    handle.submit_guess(pid(2), "   ").await.unwrap();
    handle.snapshot().await.unwrap();

    assert_eq!(
        alice.drain(),
        vec![ServerMessage::ChatMessage { player_name: "Bob".into(), message: "cat".into() }]
    );
    assert!(bob.drain().is_empty());
}

// =========================================================================
// Draw relay inside the room
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_strokes_from_non_drawer_are_dropped() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;

    // No turn running: nobody may draw.
    handle.relay_stroke(pid(1), point(1.0)).await.unwrap();
    handle.snapshot().await.unwrap();
    assert!(bob.drain().is_empty());

    handle.enter_game(pid(1)).await.unwrap();
    handle.snapshot().await.unwrap();
    alice.drain();
    bob.drain();

    handle.relay_stroke(pid(2), point(2.0)).await.unwrap();
    handle.relay_stroke(pid(2), Stroke::Clear).await.unwrap();
    handle.snapshot().await.unwrap();
    assert!(alice.drain().is_empty());
    assert!(bob.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drawer_strokes_reach_guessers_in_order() {
    let reg = registry();
    let (handle, mut alice, mut bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    handle.snapshot().await.unwrap();
    alice.drain();
    bob.drain();

    handle
        .relay_stroke(pid(1), Stroke::Start(StrokePoint { x: 0.0, y: 0.0, color: "red".into() }))
        .await
        .unwrap();
    handle.relay_stroke(pid(1), point(1.0)).await.unwrap();
    handle.relay_stroke(pid(1), point(2.0)).await.unwrap();
    handle.relay_stroke(pid(1), Stroke::End).await.unwrap();
    handle.relay_stroke(pid(1), Stroke::Clear).await.unwrap();
    handle.snapshot().await.unwrap();

    assert_eq!(
        bob.drain(),
        vec![
            ServerMessage::StartDraw { x: 0.0, y: 0.0, color: "red".into() },
            ServerMessage::Draw { x: 1.0, y: 0.0, color: "#000".into() },
            ServerMessage::Draw { x: 2.0, y: 0.0, color: "#000".into() },
            ServerMessage::EndDraw,
            ServerMessage::ClearCanvas,
        ]
    );
    // The drawer only sees the clear.
    assert_eq!(alice.drain(), vec![ServerMessage::ClearCanvas]);
}

// =========================================================================
// Drawer leaves / game stops
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drawer_leaving_ends_turn_and_successor_draws() {
    let reg = registry();
    let (handle, _alice, mut bob) = alice_and_bob(&reg).await;
    let (carol_p, mut carol) = participant(3, "Carol");
    reg.join_room(&code("AB12"), carol_p).await.unwrap();
    handle.enter_game(pid(1)).await.unwrap();
    handle.snapshot().await.unwrap();
    bob.drain();
    carol.drain();

    reg.remove_participant(&code("AB12"), pid(1)).await.unwrap();

    assert!(matches!(carol.next_event().await, ServerMessage::PlayerLeft { .. }));
    assert!(matches!(
        carol.next_event().await,
        ServerMessage::TimeUpModal { ref next_player, .. } if next_player == "Bob"
    ));
    assert_eq!(carol.next_event().await, ServerMessage::CloseModal);
    let (_, turn_index, round, drawer) = expect_game_started(carol.next_event().await);
    assert_eq!((turn_index, round, drawer), (0, 1, pid(2)));

    let (word, ..) = expect_game_started(
        loop {
            let msg = bob.next_event().await;
            if matches!(msg, ServerMessage::GameStarted { .. }) {
                break msg;
            }
        },
    );
    assert_eq!(word.as_deref(), Some("cat"));
}

#[tokio::test(start_paused = true)]
async fn test_falling_below_min_players_stops_game() {
    let reg = registry();
    let (handle, mut alice, _bob) = alice_and_bob(&reg).await;
    handle.enter_game(pid(1)).await.unwrap();
    handle.snapshot().await.unwrap();
    alice.drain();

    reg.remove_participant(&code("AB12"), pid(2)).await.unwrap();
    assert!(matches!(alice.next_event().await, ServerMessage::PlayerLeft { .. }));
    assert!(matches!(alice.next_event().await, ServerMessage::GameStopped { .. }));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, TurnPhase::Idle);

    // No timer keeps running for the stopped game.
    let quiet = tokio::time::timeout(Duration::from_secs(120), alice.rx.recv()).await;
    assert!(quiet.is_err(), "stopped game must not tick");
}

#[tokio::test(start_paused = true)]
async fn test_turn_index_stays_valid_as_room_shrinks() {
    let reg = registry();
    let (handle, _alice, _bob) = alice_and_bob(&reg).await;
    let mut clients = Vec::new();
    for id in 3..=5 {
        let (p, c) = participant(id, &format!("P{id}"));
        reg.join_room(&code("AB12"), p).await.unwrap();
        clients.push(c);
    }
    handle.enter_game(pid(1)).await.unwrap();

    for leaving in [3, 1, 5, 2] {
        reg.remove_participant(&code("AB12"), pid(leaving)).await.unwrap();
        let snap = handle.snapshot().await.unwrap();
        if !snap.players.is_empty() {
            assert!(snap.turn_index < snap.players.len());
        }
    }
}
