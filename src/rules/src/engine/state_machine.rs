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

use std::collections::VecDeque;

use data::actions::game_action::{GameAction, QueuedAction};
use data::core::primitives::{ActionId, Seat, SeatMap};
use data::events::game_event::{
    EventAudience, EventEnvelope, GameEvent, RejectReason, SeatSummary,
};
use data::game_states::game_state::GameState;
use tracing::{debug, error, instrument};
use utils::outcome::{Outcome, StopCondition};
use utils::{outcome, verify};

use crate::engine::emit::{now_ms, EventSink, PendingEvent};
use crate::engine::invariants;
use crate::phases;
use crate::phases::PhaseUpdate;

/// Number of handled action ids remembered for duplicate detection.
const DEDUP_WINDOW: usize = 64;

/// Upper bound on chained transitions within one action handling.
const MAX_TRANSITIONS: usize = 8;

/// How one dispatched action fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The mutation was applied and events were emitted.
    Accepted,

    /// The action was refused; the origin was told why and nothing changed.
    Rejected(RejectReason),

    /// The action id was already handled; the earlier result stands.
    Duplicate,

    /// An internal invariant failed; the action was rolled back.
    Failed,
}

/// The events and status produced by handling one action.
#[derive(Debug)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    pub events: Vec<EventEnvelope>,
}

/// Owner of the authoritative [GameState] for one room.
///
/// Handling an action follows a fixed protocol: validate against the active
/// phase, mutate a staged copy, perform any queued transition synchronously
/// (exit hook, then enter hook), re-check the structural invariants, and
/// only then commit and stamp the collected events with sequence numbers.
/// A failure at any point discards the staged copy, so a rejected or failed
/// action leaves no trace beyond its own notification.
pub struct StateMachine {
    game: GameState,
    recent_actions: VecDeque<(ActionId, DispatchStatus)>,
    stopped: bool,
}

impl StateMachine {
    pub fn new(game: GameState) -> Self {
        Self { game, recent_actions: VecDeque::with_capacity(DEDUP_WINDOW), stopped: false }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Announces the game and runs Preparation's enter hook, chaining
    /// onwards if the deal produced no weak hands.
    #[instrument(level = "debug", skip(self))]
    pub fn start(&mut self, causing_action: Option<ActionId>) -> DispatchResult {
        let mut staged = self.game.clone();
        let mut sink = EventSink::new();
        sink.push(GameEvent::GameStarted { seats: seat_summaries(&staged) });

        let started = phases::behavior(staged.phase)
            .on_enter(&mut staged, &mut sink)
            .and_then(|_| run_transitions(&mut staged, &mut sink))
            .and_then(|_| invariants::check(&staged));
        match started {
            Ok(()) => {
                self.game = staged;
                let events = self.finalize(sink.take(), causing_action);
                DispatchResult { status: DispatchStatus::Accepted, events }
            }
            Err(stop) => self.internal_error(stop, causing_action),
        }
    }

    /// Drives the current phase with one queued action.
    #[instrument(level = "debug", skip(self, action), fields(action_id = ?action.action_id))]
    pub fn dispatch(&mut self, action: &QueuedAction) -> DispatchResult {
        if self.stopped {
            return self.reject(action, RejectReason::RoomClosed);
        }
        if let Some(result) = self.check_duplicate(action) {
            return result;
        }

        let result = match &action.action {
            GameAction::Leave => self.handle_leave(action),
            GameAction::StartGame | GameAction::HostReplaceSeat { .. } => {
                self.reject(action, RejectReason::GameAlreadyStarted)
            }
            _ => self.handle_phase_action(action),
        };
        self.record(action.action_id, result.status);
        result
    }

    /// Marks the room closed and produces the closing notification. Any
    /// action dispatched afterwards is rejected.
    pub fn stop(&mut self, reason: &str) -> Vec<EventEnvelope> {
        if self.stopped {
            return vec![];
        }
        self.stopped = true;
        let mut sink = EventSink::new();
        sink.push(GameEvent::RoomClosed { reason: reason.to_string() });
        self.finalize(sink.take(), None)
    }

    fn handle_phase_action(&mut self, action: &QueuedAction) -> DispatchResult {
        let behavior = phases::behavior(self.game.phase);
        if !behavior.allowed_actions(&self.game).contains(action.action.kind()) {
            return self.reject(action, RejectReason::WrongPhase);
        }

        let mut staged = self.game.clone();
        let mut sink = EventSink::new();
        let handled =
            behavior.handle(&mut staged, action.origin, &action.action, &mut sink).and_then(
                |update| match update {
                    PhaseUpdate::Rejected(reason) => Ok(Some(reason)),
                    PhaseUpdate::Applied => {
                        run_transitions(&mut staged, &mut sink)?;
                        invariants::check(&staged)?;
                        Ok(None)
                    }
                },
            );

        match handled {
            Ok(Some(reason)) => self.reject(action, reason),
            Ok(None) => {
                self.game = staged;
                let events = self.finalize(sink.take(), Some(action.action_id));
                DispatchResult { status: DispatchStatus::Accepted, events }
            }
            Err(stop) => self.internal_error(stop, Some(action.action_id)),
        }
    }

    /// A departing human's seat plays on as a bot. Legal in every phase.
    fn handle_leave(&mut self, action: &QueuedAction) -> DispatchResult {
        let Some(seat) = action.origin.seat() else {
            return self.reject(action, RejectReason::WrongPhase);
        };
        let mut staged = self.game.clone();
        let player = staged.player_mut(seat);
        player.is_bot = true;

        let mut sink = EventSink::new();
        sink.push(GameEvent::PlayerLeft { seat, replaced_by_bot: true });
        match invariants::check(&staged) {
            Ok(()) => {
                self.game = staged;
                let events = self.finalize(sink.take(), Some(action.action_id));
                DispatchResult { status: DispatchStatus::Accepted, events }
            }
            Err(stop) => self.internal_error(stop, Some(action.action_id)),
        }
    }

    fn check_duplicate(&mut self, action: &QueuedAction) -> Option<DispatchResult> {
        let previous = self
            .recent_actions
            .iter()
            .find(|(id, _)| *id == action.action_id)
            .map(|(_, status)| *status)?;
        debug!(?action.action_id, ?previous, "Duplicate action id, replaying earlier result");

        // Idempotent reply: a previously rejected action is re-answered with
        // the same reason; an accepted one needs no further events.
        let events = match (previous, action.origin.seat()) {
            (DispatchStatus::Rejected(reason), Some(seat)) => self.finalize(
                vec![PendingEvent {
                    payload: GameEvent::ActionRejected {
                        action_id: action.action_id,
                        seat: Some(seat),
                        reason,
                    },
                    display: None,
                    audience: EventAudience::SeatOnly(seat),
                }],
                Some(action.action_id),
            ),
            _ => vec![],
        };
        Some(DispatchResult { status: DispatchStatus::Duplicate, events })
    }

    fn reject(&mut self, action: &QueuedAction, reason: RejectReason) -> DispatchResult {
        let events = match action.origin.seat() {
            Some(seat) => {
                debug!(%seat, %reason, "Action rejected");
                self.finalize(
                    vec![PendingEvent {
                        payload: GameEvent::ActionRejected {
                            action_id: action.action_id,
                            seat: Some(seat),
                            reason,
                        },
                        display: None,
                        audience: EventAudience::SeatOnly(seat),
                    }],
                    Some(action.action_id),
                )
            }
            // System-originated actions have nobody to notify.
            None => {
                debug!(%reason, "System action rejected");
                vec![]
            }
        };
        DispatchResult { status: DispatchStatus::Rejected(reason), events }
    }

    fn internal_error(
        &mut self,
        stop: StopCondition,
        causing_action: Option<ActionId>,
    ) -> DispatchResult {
        let message = match stop {
            StopCondition::GameOver => "game is over".to_string(),
            StopCondition::Error(report) => format!("{report:#}"),
        };
        error!(message, "Rolled back action after internal error");
        let events = self.finalize(
            vec![PendingEvent {
                payload: GameEvent::InternalError { message },
                display: None,
                audience: EventAudience::Room,
            }],
            causing_action,
        );
        DispatchResult { status: DispatchStatus::Failed, events }
    }

    fn record(&mut self, action_id: ActionId, status: DispatchStatus) {
        if status == DispatchStatus::Duplicate {
            return;
        }
        if self.recent_actions.len() == DEDUP_WINDOW {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back((action_id, status));
    }

    /// Stamps collected events with sequence numbers, the committed phase,
    /// and emission metadata, in push order.
    fn finalize(
        &mut self,
        pending: Vec<PendingEvent>,
        causing_action: Option<ActionId>,
    ) -> Vec<EventEnvelope> {
        let timestamp_ms = now_ms();
        pending
            .into_iter()
            .map(|event| EventEnvelope {
                sequence: self.game.next_event_sequence(),
                phase: self.game.phase,
                room_id: self.game.id,
                payload: event.payload,
                display: event.display,
                causing_action,
                timestamp_ms,
                audience: event.audience,
            })
            .collect()
    }
}

/// Performs every transition queued by the last mutation, synchronously:
/// exit hook of the current phase, then the enter hook of the next, which
/// may itself queue a further transition (a fresh deal with no weak hands
/// proceeds straight to Declaration).
fn run_transitions(game: &mut GameState, sink: &mut EventSink) -> Outcome {
    let mut steps = 0;
    while let Some(next) = phases::behavior(game.phase).next_phase(game) {
        verify!(steps < MAX_TRANSITIONS, "transition chain exceeded {MAX_TRANSITIONS} steps");
        steps += 1;
        game.queued_transition = None;

        let from = game.phase;
        phases::behavior(from).on_exit(game, sink)?;
        game.phase = next;
        sink.push(GameEvent::PhaseChanged { from, to: next });
        phases::behavior(next).on_enter(game, sink)?;
        debug!(%from, %next, "Phase transition");
    }
    outcome::OK
}

fn seat_summaries(game: &GameState) -> SeatMap<SeatSummary> {
    let mut seats: SeatMap<SeatSummary> = SeatMap::default();
    for seat in enum_iterator::all::<Seat>() {
        let player = game.player(seat);
        seats[seat] = SeatSummary {
            player_id: Some(player.id),
            display_name: player.display_name.clone(),
            is_bot: player.is_bot,
        };
    }
    seats
}
