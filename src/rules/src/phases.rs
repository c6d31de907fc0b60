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

use data::actions::game_action::{ActionKind, ActionOrigin, GameAction};
use data::events::game_event::RejectReason;
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use enumset::EnumSet;
use utils::outcome::{Outcome, Value};

use crate::engine::emit::EventSink;
use crate::phases::declaration::DeclarationPhase;
use crate::phases::game_end::GameEndPhase;
use crate::phases::preparation::PreparationPhase;
use crate::phases::scoring::ScoringPhase;
use crate::phases::turn::TurnPhase;

pub mod declaration;
pub mod game_end;
pub mod preparation;
pub mod scoring;
pub mod turn;

/// Result of a phase handling one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PhaseUpdate {
    /// The mutation was applied; any events were pushed to the sink.
    Applied,

    /// The action was refused with no state change.
    Rejected(RejectReason),
}

/// The contract every phase implements.
///
/// The state machine drives exactly one active phase at a time: it gates
/// actions on [PhaseBehavior::allowed_actions], applies mutations through
/// [PhaseBehavior::handle], and performs any transition the handler queued
/// before control returns to the queue.
pub trait PhaseBehavior: Sync {
    /// Action kinds this phase will consider in the current state.
    fn allowed_actions(&self, game: &GameState) -> EnumSet<ActionKind>;

    /// Idempotent setup run on entering the phase, before any external side
    /// effect of the transition.
    fn on_enter(&self, game: &mut GameState, events: &mut EventSink) -> Outcome;

    /// Validates and applies one action.
    fn handle(
        &self,
        game: &mut GameState,
        origin: ActionOrigin,
        action: &GameAction,
        events: &mut EventSink,
    ) -> Value<PhaseUpdate>;

    /// The transition to perform now, if the last mutation queued one.
    ///
    /// Handlers and enter hooks request transitions by setting
    /// `queued_transition`; the state machine consumes it synchronously.
    fn next_phase(&self, game: &GameState) -> Option<GamePhase> {
        game.queued_transition
    }

    /// Cleanup run when leaving the phase.
    fn on_exit(&self, game: &mut GameState, events: &mut EventSink) -> Outcome {
        let _ = (game, events);
        utils::outcome::OK
    }
}

/// The active behavior for a phase.
pub fn behavior(phase: GamePhase) -> &'static dyn PhaseBehavior {
    match phase {
        GamePhase::Preparation => &PreparationPhase,
        GamePhase::Declaration => &DeclarationPhase,
        GamePhase::Turn => &TurnPhase,
        GamePhase::Scoring => &ScoringPhase,
        GamePhase::GameEnd => &GameEndPhase,
    }
}
