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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use data::actions::game_action::{ActionOrigin, GameAction};
use data::config::engine_config::{DelayRangeMs, EngineConfig};
use data::core::primitives::{ActionId, Seat, SeatMap};
use data::events::game_event::{EventKind, GameEvent};
use enumset::{enum_set, EnumSet};
use server::action_queue::{ActionQueue, SubmitError};
use server::event_dispatcher::{EventDispatcher, SubscriberFn, Subscription};
use server::rooms::registry::RoomDirectory;
use server::rooms::room::SeatAssignment;
use server::transport::ChannelTransport;
use testing::collector::EventCollector;
use testing::test_games::envelope;
use tokio::time;

fn declare() -> GameAction {
    GameAction::Declare { value: 1 }
}

#[tokio::test]
async fn queue_preserves_arrival_order_across_producers() {
    let (submitter, mut queue) = ActionQueue::new(64);
    let mut handles = vec![];
    for _ in 0..4 {
        let submitter = submitter.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..8 {
                submitter
                    .submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), declare())
                    .expect("queue open");
            }
        }));
    }
    for handle in handles {
        handle.await.expect("producer");
    }

    let mut arrivals = vec![];
    for _ in 0..32 {
        arrivals.push(queue.next().await.expect("queued action").arrival_sequence);
    }
    for pair in arrivals.windows(2) {
        assert!(pair[1] > pair[0], "arrival order violated: {pair:?}");
    }
}

#[tokio::test]
async fn queue_applies_backpressure_but_never_drops_critical_actions() {
    let (submitter, mut queue) = ActionQueue::new(2);

    assert!(submitter
        .submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), declare())
        .is_ok());
    assert!(submitter
        .submit(ActionId::generate(), ActionOrigin::Seat(Seat::Two), declare())
        .is_ok());
    assert_eq!(
        submitter.submit(ActionId::generate(), ActionOrigin::Seat(Seat::Three), declare()),
        Err(SubmitError::QueueFull)
    );
    // Critical control actions pass the cap.
    assert!(submitter
        .submit(ActionId::generate(), ActionOrigin::Seat(Seat::Three), GameAction::Leave)
        .is_ok());

    submitter.close();
    assert_eq!(
        submitter.submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), declare()),
        Err(SubmitError::RoomClosed)
    );

    // Close rejects what was still pending rather than handling it.
    assert!(queue.next().await.is_none());
    let drained = queue.drain();
    assert_eq!(drained.len(), 3);
}

#[tokio::test]
async fn dispatcher_orders_subscribers_by_priority_and_kind_mask() {
    fn record(name: &'static str, order: &Arc<std::sync::Mutex<Vec<&'static str>>>) -> SubscriberFn {
        let order = order.clone();
        Box::new(move |_| {
            order.lock().expect("order lock").push(name);
        })
    }

    let order: Arc<std::sync::Mutex<Vec<&'static str>>> = Arc::default();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(Subscription {
        label: "second".to_string(),
        kinds: EnumSet::all(),
        priority: 10,
        callback: record("second", &order),
    });
    dispatcher.subscribe(Subscription {
        label: "first".to_string(),
        kinds: EnumSet::all(),
        priority: 1,
        callback: record("first", &order),
    });
    dispatcher.subscribe(Subscription {
        label: "declared_only".to_string(),
        kinds: enum_set!(EventKind::Declared),
        priority: 5,
        callback: record("declared_only", &order),
    });

    dispatcher.dispatch(&[envelope(1, GameEvent::RedealOffered { seat: Seat::One })]);
    dispatcher.dispatch(&[envelope(2, GameEvent::Declared { seat: Seat::One, value: 2 })]);

    let seen = order.lock().expect("order lock").clone();
    assert_eq!(seen, vec!["first", "second", "first", "declared_only", "second"]);
}

#[tokio::test]
async fn dispatcher_retries_panicking_subscriber_once_and_isolates_it() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let collector = EventCollector::new();
    let mut dispatcher = EventDispatcher::new();

    let counted = attempts.clone();
    dispatcher.subscribe(Subscription {
        label: "flaky".to_string(),
        kinds: EnumSet::all(),
        priority: 1,
        callback: Box::new(move |_| {
            // First delivery panics; the retry succeeds.
            if counted.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("flaky subscriber");
            }
        }),
    });
    dispatcher.subscribe(collector.subscription("steady", 2));

    dispatcher.dispatch(&[envelope(1, GameEvent::RedealOffered { seat: Seat::Two })]);

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(collector.sequences(), vec![1]);
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        winning_score_threshold: -1000,
        bot_decision_delay_ms: DelayRangeMs { min: 1, max: 4 },
        turn_results_display_seconds: 0.02,
        scoring_display_seconds: 0.02,
        display_server_safety_multiplier: 1.0,
        rng_seed: Some(20_240_613),
        ..EngineConfig::default()
    }
}

fn bot_seats() -> SeatMap<SeatAssignment> {
    let mut seats: SeatMap<SeatAssignment> = SeatMap::default();
    for seat in [Seat::One, Seat::Two, Seat::Three, Seat::Four] {
        seats[seat] = SeatAssignment::bot(format!("Bot {}", seat.index() + 1));
    }
    seats
}

async fn wait_for_game_end(collector: &EventCollector) {
    for _ in 0..600 {
        if collector.count(EventKind::GameEnded) > 0 {
            return;
        }
        time::sleep(Duration::from_millis(50)).await;
    }
    panic!("game never ended; kinds so far: {:?}", collector.kinds());
}

#[tokio::test]
async fn bots_only_room_plays_to_completion_with_identical_subscriber_order() {
    let directory = RoomDirectory::new(fast_config(), Arc::new(ChannelTransport::new()));
    let first = EventCollector::new();
    let second = EventCollector::new();
    let room = directory.create_with(
        Seat::One,
        bot_seats(),
        vec![first.subscription("first", 1), second.subscription("second", 2)],
    );

    let submitter = directory.submitter(room).expect("room exists");
    submitter
        .submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), GameAction::StartGame)
        .expect("queue open");
    wait_for_game_end(&first).await;
    directory.close(room).await;

    let kinds = first.kinds();
    assert_eq!(kinds.first(), Some(&EventKind::GameStarted));
    assert!(kinds.contains(&EventKind::HandsDealt));
    assert!(kinds.contains(&EventKind::Declared));
    assert!(kinds.contains(&EventKind::TurnResolved));
    assert!(kinds.contains(&EventKind::ScoringApplied));
    assert!(kinds.contains(&EventKind::GameEnded));
    assert!(kinds.contains(&EventKind::RoomClosed));

    // Strictly increasing sequences, and both subscribers observed the
    // exact same order.
    let sequences = first.sequences();
    for pair in sequences.windows(2) {
        assert!(pair[1] > pair[0], "sequence regressed: {pair:?}");
    }
    assert_eq!(sequences, second.sequences());
    assert_eq!(first.kinds(), second.kinds());
}

#[tokio::test]
async fn closed_room_rejects_queued_actions() {
    let directory = RoomDirectory::new(fast_config(), Arc::new(ChannelTransport::new()));
    let collector = EventCollector::new();
    let room = directory.create_with(Seat::One, bot_seats(), vec![collector.subscription("c", 1)]);

    let submitter = directory.submitter(room).expect("room exists");
    directory.close(room).await;
    assert_eq!(
        submitter.submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), GameAction::StartGame),
        Err(SubmitError::RoomClosed)
    );
    assert_eq!(collector.count(EventKind::RoomClosed), 1);
}
