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

use data::actions::game_action::{ActionOrigin, GameAction, QueuedAction};
use data::config::engine_config::EngineConfig;
use data::core::primitives::{ActionId, Seat};
use data::events::display::DisplayType;
use data::events::game_event::{EventAudience, EventEnvelope, GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::{GameState, PendingDisplay};
use rand::Rng;
use rules::engine::emit::now_ms;
use rules::engine::state_machine::{DispatchResult, DispatchStatus, StateMachine};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, instrument};

use crate::action_queue::{ActionQueue, ActionSubmitter};
use crate::bot_coordinator::BotCoordinator;
use crate::broadcast::broadcaster::Broadcaster;
use crate::event_dispatcher::EventDispatcher;
use crate::rooms::room::{Room, SeatAssignment};

/// The single serializer for one room.
///
/// One of these runs as one tokio task, consuming the action queue. All
/// action handling, phase transitions, event dispatch and synchronous
/// broadcasting happen here, one action at a time; bot decision tasks and
/// the display safety deadline run off to the side and feed back through
/// the queue.
pub struct RoomActor {
    room: Room,
    machine: Option<StateMachine>,
    queue: ActionQueue,
    submitter: ActionSubmitter,
    dispatcher: EventDispatcher,
    bots: BotCoordinator,
    broadcaster: Arc<Broadcaster>,
    config: EngineConfig,
    pre_game_sequence: u64,
    armed_display: Option<(PendingDisplay, JoinHandle<()>)>,
}

impl RoomActor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room: Room,
        config: EngineConfig,
        queue: ActionQueue,
        submitter: ActionSubmitter,
        dispatcher: EventDispatcher,
        bots: BotCoordinator,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            room,
            machine: None,
            queue,
            submitter,
            dispatcher,
            bots,
            broadcaster,
            config,
            pre_game_sequence: 0,
            armed_display: None,
        }
    }

    /// Consumes the queue until the room shuts down.
    pub async fn run(mut self) {
        info!(room = ?self.room.id, "Room actor started");
        while let Some(action) = self.queue.next().await {
            self.handle(&action);
        }
        self.shutdown();
        info!(room = ?self.room.id, "Room actor stopped");
    }

    #[instrument(level = "debug", skip(self, action), fields(room = ?self.room.id))]
    fn handle(&mut self, action: &QueuedAction) {
        let result = if self.room.started {
            match self.machine.as_mut() {
                Some(machine) => machine.dispatch(action),
                None => self.reject_pre_game(action, RejectReason::GameNotStarted),
            }
        } else {
            self.handle_pre_game(action)
        };

        // Every subscriber observes this batch before the next dequeue.
        self.dispatcher.dispatch(&result.events);

        self.update_display_safety();
        if let Some(machine) = self.machine.as_ref() {
            self.bots.observe(machine.game(), &result.events);
        }
    }

    /// Room-level actions accepted before `start_game`.
    fn handle_pre_game(&mut self, action: &QueuedAction) -> DispatchResult {
        match &action.action {
            GameAction::StartGame => self.start_game(action),
            GameAction::HostReplaceSeat { seat } => {
                if action.origin.seat() != Some(self.room.host_seat) {
                    return self.reject_pre_game(action, RejectReason::NotHost);
                }
                if *seat == self.room.host_seat {
                    return self.reject_pre_game(action, RejectReason::CannotReplaceHost);
                }
                let bot_name = format!("Bot {}", seat.index() + 1);
                self.room.seats[*seat] = SeatAssignment::bot(bot_name.clone());
                self.accept_pre_game(action, GameEvent::SeatReplaced { seat: *seat, bot_name })
            }
            GameAction::Leave => {
                let Some(seat) = action.origin.seat() else {
                    return self.reject_pre_game(action, RejectReason::WrongPhase);
                };
                let name = self.room.seats[seat].display_name.clone();
                self.room.seats[seat] = SeatAssignment { display_name: name, is_bot: true };
                if seat == self.room.host_seat {
                    self.reassign_host();
                }
                self.accept_pre_game(
                    action,
                    GameEvent::PlayerLeft { seat, replaced_by_bot: true },
                )
            }
            _ => self.reject_pre_game(action, RejectReason::GameNotStarted),
        }
    }

    fn start_game(&mut self, action: &QueuedAction) -> DispatchResult {
        if action.origin.seat() != Some(self.room.host_seat) {
            return self.reject_pre_game(action, RejectReason::NotHost);
        }
        let seed = self.config.rng_seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut game = GameState::new(
            self.room.id,
            self.room.players(),
            self.config.game_configuration(),
            seed,
        );
        // Pre-game membership events already consumed part of the room's
        // sequence space; the game continues it without gaps.
        game.last_event_sequence = self.pre_game_sequence;

        let mut machine = StateMachine::new(game);
        let result = machine.start(Some(action.action_id));
        self.machine = Some(machine);
        self.room.started = true;
        info!(room = ?self.room.id, seed, "Game started");
        result
    }

    /// Moves the host role to the lowest-index human seat, if any remains.
    fn reassign_host(&mut self) {
        let human =
            enum_iterator::all::<Seat>().find(|&seat| !self.room.seats[seat].is_bot);
        if let Some(seat) = human {
            self.room.host_seat = seat;
        }
    }

    /// Arms, re-arms or disarms the server-side display safety deadline.
    ///
    /// The deadline fires through the queue as a system `advance_display`,
    /// so a room whose clients all stall (or which has no clients at all)
    /// still advances.
    fn update_display_safety(&mut self) {
        let pending = self.machine.as_ref().and_then(|machine| machine.game().pending_display);
        match pending {
            None => {
                if let Some((_, handle)) = self.armed_display.take() {
                    handle.abort();
                }
            }
            Some(display) => {
                if self.armed_display.as_ref().map(|(armed, _)| *armed) == Some(display) {
                    return;
                }
                if let Some((_, handle)) = self.armed_display.take() {
                    handle.abort();
                }
                let show_for = match display.display_type {
                    DisplayType::TurnResults => self.config.turn_results_display_seconds,
                    DisplayType::ScoringDisplay => self.config.scoring_display_seconds,
                };
                let deadline = Duration::from_secs_f64(
                    show_for * self.config.display_server_safety_multiplier,
                );
                let submitter = self.submitter.clone();
                let of = display.display_type;
                debug!(?of, ?deadline, "Arming display safety deadline");
                let handle = tokio::spawn(async move {
                    time::sleep(deadline).await;
                    let _ = submitter.submit(
                        ActionId::generate(),
                        ActionOrigin::System,
                        GameAction::AdvanceDisplay { of },
                    );
                });
                self.armed_display = Some((display, handle));
            }
        }
    }

    /// Terminal teardown: cancel side tasks, notify the room, reject
    /// whatever was still queued, and drop all connections.
    fn shutdown(&mut self) {
        if let Some((_, handle)) = self.armed_display.take() {
            handle.abort();
        }
        self.bots.cancel_all();

        let closing = match self.machine.as_mut() {
            Some(machine) => machine.stop("room closed"),
            None => vec![self.pre_game_event(
                GameEvent::RoomClosed { reason: "room closed".to_string() },
                EventAudience::Room,
                None,
            )],
        };
        self.dispatcher.dispatch(&closing);

        for action in self.queue.drain() {
            let rejection = match self.machine.as_mut() {
                Some(machine) => machine.dispatch(&action),
                None => self.reject_pre_game(&action, RejectReason::RoomClosed),
            };
            self.dispatcher.dispatch(&rejection.events);
        }
        self.broadcaster.close_all();
    }

    fn accept_pre_game(&mut self, action: &QueuedAction, payload: GameEvent) -> DispatchResult {
        let event = self.pre_game_event(payload, EventAudience::Room, Some(action.action_id));
        DispatchResult { status: DispatchStatus::Accepted, events: vec![event] }
    }

    fn reject_pre_game(&mut self, action: &QueuedAction, reason: RejectReason) -> DispatchResult {
        let events = match action.origin.seat() {
            Some(seat) => vec![self.pre_game_event(
                GameEvent::ActionRejected {
                    action_id: action.action_id,
                    seat: Some(seat),
                    reason,
                },
                EventAudience::SeatOnly(seat),
                Some(action.action_id),
            )],
            None => vec![],
        };
        DispatchResult { status: DispatchStatus::Rejected(reason), events }
    }

    /// Membership events before the game exists share the room's sequence
    /// space; the game's counter picks up from here.
    fn pre_game_event(
        &mut self,
        payload: GameEvent,
        audience: EventAudience,
        causing_action: Option<ActionId>,
    ) -> EventEnvelope {
        self.pre_game_sequence += 1;
        EventEnvelope {
            sequence: self.pre_game_sequence,
            phase: GamePhase::Preparation,
            room_id: self.room.id,
            payload,
            display: None,
            causing_action,
            timestamp_ms: now_ms(),
            audience,
        }
    }
}
