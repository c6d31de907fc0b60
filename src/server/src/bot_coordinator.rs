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

use ai::core::fallback;
use ai::core::strategy::BotStrategy;
use data::actions::game_action::ActionOrigin;
use data::config::engine_config::DelayRangeMs;
use data::core::primitives::{ActionId, Seat, SeatMap};
use data::events::game_event::{EventEnvelope, EventKind};
use data::game_states::game_state::GameState;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::action_queue::ActionSubmitter;

/// Synthesizes actions for bot seats in response to state changes.
///
/// Each decision runs as its own scheduled task with a short randomized
/// delay; the task enqueues through the same FIFO as human actions rather
/// than mutating anything itself. Any phase change cancels every pending
/// decision, and a decision is always canceled before a new one is
/// scheduled for the same seat, so at most one exists per seat.
pub struct BotCoordinator {
    strategy: Arc<dyn BotStrategy>,
    submitter: ActionSubmitter,
    delay: DelayRangeMs,
    pending: SeatMap<Option<JoinHandle<()>>>,
}

impl BotCoordinator {
    pub fn new(
        strategy: Arc<dyn BotStrategy>,
        submitter: ActionSubmitter,
        delay: DelayRangeMs,
    ) -> Self {
        Self { strategy, submitter, delay, pending: SeatMap::default() }
    }

    /// Reacts to the events of one handled action.
    ///
    /// Called on the room's serialization path after subscriber fan-out, so
    /// the snapshot a decision task computes from is exactly the state the
    /// clients were just shown.
    pub fn observe(&mut self, game: &GameState, events: &[EventEnvelope]) {
        if events.iter().any(|event| event.kind() == EventKind::PhaseChanged) {
            self.cancel_all();
        }
        let Some(seat) = game.current_seat else {
            return;
        };
        if !game.player(seat).is_bot {
            return;
        }
        self.schedule(game, seat);
    }

    /// Cancels any pending decision for the seat and schedules a new one.
    fn schedule(&mut self, game: &GameState, seat: Seat) {
        self.cancel(seat);

        let snapshot = game.clone();
        let strategy = self.strategy.clone();
        let submitter = self.submitter.clone();
        let delay = self.roll_delay();
        debug!(%seat, ?delay, "Scheduling bot decision");

        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let action = match strategy.select(&snapshot, seat) {
                Ok(action) => action,
                Err(stop) => {
                    warn!(%seat, ?stop, "Bot strategy failed, using safe fallback");
                    match fallback::safe_action(&snapshot, seat) {
                        Some(action) => action,
                        None => return,
                    }
                }
            };
            if let Err(err) = submitter.submit(ActionId::generate(), ActionOrigin::Seat(seat), action)
            {
                debug!(%seat, ?err, "Bot action not accepted by queue");
            }
        });
        self.pending[seat] = Some(handle);
    }

    pub fn cancel(&mut self, seat: Seat) {
        if let Some(handle) = self.pending[seat].take() {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for seat in enum_iterator::all::<Seat>() {
            self.cancel(seat);
        }
    }

    /// True if a decision task is currently scheduled for the seat.
    pub fn has_pending(&self, seat: Seat) -> bool {
        self.pending[seat].as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn roll_delay(&self) -> Duration {
        let DelayRangeMs { min, max } = self.delay;
        let millis = if max > min { rand::thread_rng().gen_range(min..=max) } else { min };
        Duration::from_millis(millis)
    }
}

impl Drop for BotCoordinator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
