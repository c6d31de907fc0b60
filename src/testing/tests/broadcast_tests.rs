// Copyright © liaptui 2025-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use data::config::engine_config::EngineConfig;
use data::core::primitives::{ConnectionId, Seat};
use data::events::display::{DisplayMetadata, DisplayType};
use data::events::game_event::{EventEnvelope, GameEvent};
use data::game_states::game_phase::GamePhase;
use server::broadcast::broadcaster::Broadcaster;
use server::broadcast::connections::{ConnectionRegistry, ConnectionRole};
use server::transport::ChannelTransport;
use testing::test_games::envelope;
use tokio::time;

fn broadcaster_with(config: EngineConfig) -> (Arc<ChannelTransport>, Broadcaster) {
    let transport = Arc::new(ChannelTransport::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = Broadcaster::new(registry, transport.clone(), &config);
    (transport, broadcaster)
}

fn turn_resolved(sequence: u64) -> EventEnvelope {
    let mut event = envelope(
        sequence,
        GameEvent::TurnResolved {
            turn_number: 3,
            winner: Seat::One,
            piles_won: 2,
            plays: vec![],
        },
    );
    event.display = Some(DisplayMetadata {
        display_type: DisplayType::TurnResults,
        show_for_seconds: 5.0,
        auto_advance: true,
        can_skip: true,
        next_phase: GamePhase::Turn,
    });
    event
}

#[tokio::test]
async fn reconnection_within_grace_drains_queued_broadcasts_in_order() {
    let (transport, broadcaster) = broadcaster_with(EngineConfig::default());

    // The seat's only connection closes just before the turn resolves.
    let old = ConnectionId::generate();
    let _old_rx = transport.register(old);
    broadcaster.attach(old, ConnectionRole::Seat(Seat::One));
    transport.close(old);
    broadcaster.detach(old);

    broadcaster.broadcast(&turn_resolved(42));
    broadcaster.broadcast(&envelope(
        43,
        GameEvent::PhaseChanged { from: GamePhase::Turn, to: GamePhase::Turn },
    ));

    // A new connection binds to the same seat within the grace window.
    let new = ConnectionId::generate();
    let mut rx = transport.register(new);
    broadcaster.attach(new, ConnectionRole::Seat(Seat::One));

    let first = rx.try_recv().expect("queued frame delivered");
    let replayed: EventEnvelope = serde_json::from_str(&first).expect("valid envelope");
    assert_eq!(replayed.sequence, 42);
    let display = replayed.display.expect("display metadata intact");
    assert_eq!(display.display_type, DisplayType::TurnResults);
    assert_eq!(display.show_for_seconds, 5.0);

    let second = rx.try_recv().expect("subsequent frame delivered");
    let followup: EventEnvelope = serde_json::from_str(&second).expect("valid envelope");
    assert_eq!(followup.sequence, 43);

    // Later events flow directly.
    broadcaster.broadcast(&envelope(
        44,
        GameEvent::Declared { seat: Seat::One, value: 2 },
    ));
    let third = rx.try_recv().expect("live frame delivered");
    let live: EventEnvelope = serde_json::from_str(&third).expect("valid envelope");
    assert_eq!(live.sequence, 44);
}

#[tokio::test]
async fn critical_events_are_held_for_seats_with_no_connection() {
    let (transport, broadcaster) = broadcaster_with(EngineConfig::default());

    broadcaster.broadcast(&envelope(
        7,
        GameEvent::PhaseChanged { from: GamePhase::Preparation, to: GamePhase::Declaration },
    ));

    let conn = ConnectionId::generate();
    let mut rx = transport.register(conn);
    broadcaster.attach(conn, ConnectionRole::Seat(Seat::Three));
    let frame = rx.try_recv().expect("held critical frame delivered");
    let replayed: EventEnvelope = serde_json::from_str(&frame).expect("valid envelope");
    assert_eq!(replayed.sequence, 7);
}

#[tokio::test]
async fn failed_send_marks_connection_lost_and_resume_drains_it() {
    let (transport, broadcaster) = broadcaster_with(EngineConfig::default());

    let conn = ConnectionId::generate();
    let _rx = transport.register(conn);
    broadcaster.attach(conn, ConnectionRole::Seat(Seat::Two));

    // The transport dies without an explicit detach.
    transport.close(conn);
    broadcaster.broadcast(&envelope(5, GameEvent::Declared { seat: Seat::One, value: 1 }));
    assert!(broadcaster.registry().live_for_seat(Seat::Two).is_empty());

    // The same connection handle returns within grace.
    let mut rx = transport.register(conn);
    broadcaster.resume(conn);
    let frame = rx.try_recv().expect("held frame delivered on resume");
    let replayed: EventEnvelope = serde_json::from_str(&frame).expect("valid envelope");
    assert_eq!(replayed.sequence, 5);
}

#[tokio::test]
async fn grace_expiry_drops_held_frames() {
    let config = EngineConfig {
        broadcast_grace_ms_game: 10,
        broadcast_grace_ms_lobby: 10,
        ..EngineConfig::default()
    };
    let (transport, broadcaster) = broadcaster_with(config);

    broadcaster.broadcast(&envelope(1, GameEvent::Declared { seat: Seat::One, value: 1 }));
    time::sleep(Duration::from_millis(50)).await;
    // The next broadcast runs the expiry sweep before holding anything new.
    broadcaster.broadcast(&envelope(2, GameEvent::Declared { seat: Seat::Two, value: 2 }));

    let conn = ConnectionId::generate();
    let mut rx = transport.register(conn);
    broadcaster.attach(conn, ConnectionRole::Seat(Seat::One));

    let frame = rx.try_recv().expect("recent frame delivered");
    let replayed: EventEnvelope = serde_json::from_str(&frame).expect("valid envelope");
    assert_eq!(replayed.sequence, 2, "expired frame should have been dropped");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn replay_ring_resyncs_new_connections_when_enabled() {
    let config = EngineConfig { replay_last_n_events: 2, ..EngineConfig::default() };
    let (transport, broadcaster) = broadcaster_with(config);

    // An observer is present so frames are not merely seat-held.
    let observer = ConnectionId::generate();
    let _observer_rx = transport.register(observer);
    broadcaster.attach(observer, ConnectionRole::Observer);

    for sequence in 1..=4 {
        broadcaster.broadcast(&envelope(
            sequence,
            GameEvent::Declared { seat: Seat::One, value: sequence as u32 },
        ));
    }

    let late = ConnectionId::generate();
    let mut rx = transport.register(late);
    broadcaster.attach(late, ConnectionRole::Observer);

    // Only the last two events are replayed.
    let sequences: Vec<u64> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|frame| serde_json::from_str::<EventEnvelope>(&frame).expect("valid").sequence)
        .collect();
    assert_eq!(sequences, vec![3, 4]);
}
