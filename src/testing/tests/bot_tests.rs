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

use ai::core::balanced::Balanced;
use ai::core::fallback;
use ai::core::strategy::BotStrategy;
use data::actions::game_action::GameAction;
use data::config::engine_config::DelayRangeMs;
use data::core::primitives::Seat;
use data::events::game_event::GameEvent;
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use server::action_queue::ActionQueue;
use server::bot_coordinator::BotCoordinator;
use testing::test_games;
use testing::test_games::envelope;
use tokio::time;
use utils::outcome::{StopCondition, Value};

/// A game in Declaration with the bot at seat Two on the clock.
fn game_with_bot_to_act() -> GameState {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut game = test_games::game_in_declaration(hands);
    game.player_mut(Seat::Two).is_bot = true;
    game.current_seat = Some(Seat::Two);
    game
}

#[tokio::test]
async fn bot_decision_is_canceled_by_phase_change() {
    let (submitter, mut queue) = ActionQueue::new(64);
    let mut bots = BotCoordinator::new(
        Arc::new(Balanced),
        submitter,
        DelayRangeMs { min: 400, max: 400 },
    );

    let mut game = game_with_bot_to_act();
    bots.observe(&game, &[]);
    assert!(bots.has_pending(Seat::Two));

    // A human action transitions the phase well before the 400ms deadline.
    time::sleep(Duration::from_millis(150)).await;
    game.phase = GamePhase::Turn;
    game.current_seat = Some(Seat::One);
    let change = envelope(
        9,
        GameEvent::PhaseChanged { from: GamePhase::Declaration, to: GamePhase::Turn },
    );
    bots.observe(&game, &[change]);
    assert!(!bots.has_pending(Seat::Two));

    // No stale action ever reaches the queue.
    let stale = time::timeout(Duration::from_millis(600), queue.next()).await;
    assert!(stale.is_err(), "canceled bot decision still produced an action");
}

#[tokio::test]
async fn rescheduling_keeps_at_most_one_pending_decision_per_seat() {
    let (submitter, mut queue) = ActionQueue::new(64);
    let mut bots = BotCoordinator::new(
        Arc::new(Balanced),
        submitter,
        DelayRangeMs { min: 50, max: 50 },
    );

    let game = game_with_bot_to_act();
    bots.observe(&game, &[]);
    bots.observe(&game, &[]);
    bots.observe(&game, &[]);
    assert!(bots.has_pending(Seat::Two));

    time::sleep(Duration::from_millis(300)).await;
    let first = time::timeout(Duration::from_millis(50), queue.next()).await;
    assert!(first.is_ok(), "scheduled decision never arrived");
    let second = time::timeout(Duration::from_millis(200), queue.next()).await;
    assert!(second.is_err(), "superseded decisions were not canceled");
}

struct Failing;

impl BotStrategy for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn select(&self, _game: &GameState, _seat: Seat) -> Value<GameAction> {
        Err(StopCondition::GameOver)
    }
}

#[tokio::test]
async fn failed_strategy_falls_back_to_safe_action() {
    let (submitter, mut queue) = ActionQueue::new(64);
    let mut bots =
        BotCoordinator::new(Arc::new(Failing), submitter, DelayRangeMs { min: 1, max: 1 });

    let game = game_with_bot_to_act();
    let expected = fallback::safe_action(&game, Seat::Two).expect("safe action exists");
    bots.observe(&game, &[]);

    let queued = time::timeout(Duration::from_millis(500), queue.next())
        .await
        .expect("fallback arrived")
        .expect("queue open");
    assert_eq!(queued.action, expected);
}

#[tokio::test]
async fn bot_decisions_flow_through_the_queue_like_any_action() {
    let (submitter, mut queue) = ActionQueue::new(64);
    let mut bots = BotCoordinator::new(
        Arc::new(Balanced),
        submitter,
        DelayRangeMs { min: 1, max: 1 },
    );

    let game = game_with_bot_to_act();
    bots.observe(&game, &[]);
    let queued = time::timeout(Duration::from_millis(500), queue.next())
        .await
        .expect("decision arrived")
        .expect("queue open");
    assert_eq!(queued.origin.seat(), Some(Seat::Two));
    assert!(matches!(queued.action, GameAction::Declare { .. }));
}
