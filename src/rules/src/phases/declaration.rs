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
use data::core::numerics::{PileCount, HAND_SIZE};
use data::events::game_event::{GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use enumset::{enum_set, EnumSet};
use tracing::debug;
use utils::outcome::{Outcome, Value};
use utils::{outcome, verify};

use crate::engine::emit::EventSink;
use crate::phases::{PhaseBehavior, PhaseUpdate};

/// Collects one declaration per seat, starting from the turn starter and
/// proceeding in ascending seat order.
///
/// The fourth declarer may not bring the round total to the hand size, and
/// a seat that declared zero in both prior rounds must declare at least one.
pub struct DeclarationPhase;

impl PhaseBehavior for DeclarationPhase {
    fn allowed_actions(&self, _game: &GameState) -> EnumSet<ActionKind> {
        enum_set!(ActionKind::Declare | ActionKind::Leave)
    }

    fn on_enter(&self, game: &mut GameState, _events: &mut EventSink) -> Outcome {
        game.declaration_order = game.turn_starter.in_order_from().collect();
        game.current_seat = Some(game.turn_starter);
        outcome::OK
    }

    fn handle(
        &self,
        game: &mut GameState,
        origin: ActionOrigin,
        action: &GameAction,
        events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        let GameAction::Declare { value } = action else {
            return Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase));
        };
        let value = *value;
        if origin.seat() != game.current_seat {
            return Ok(PhaseUpdate::Rejected(RejectReason::NotYourTurn));
        }
        let Some(seat) = origin.seat() else {
            return Ok(PhaseUpdate::Rejected(RejectReason::NotYourTurn));
        };

        if value > HAND_SIZE as PileCount {
            return Ok(PhaseUpdate::Rejected(RejectReason::ValueOutOfRange));
        }
        if value == 0 && game.player(seat).zero_declare_streak >= 2 {
            return Ok(PhaseUpdate::Rejected(RejectReason::MustDeclareNonZero));
        }
        if game.declarations_made() == 3
            && game.declaration_total() + value == HAND_SIZE as PileCount
        {
            return Ok(PhaseUpdate::Rejected(RejectReason::WouldSumToHandSize));
        }

        game.player_mut(seat).declared = Some(value);
        events.push(GameEvent::Declared { seat, value });
        debug!(%seat, value, "Declaration accepted");

        let made = game.declarations_made();
        if made == 4 {
            game.current_seat = None;
            game.queued_transition = Some(GamePhase::Turn);
        } else {
            verify!(made < game.declaration_order.len(), "declaration order exhausted");
            game.current_seat = Some(game.declaration_order[made]);
        }
        Ok(PhaseUpdate::Applied)
    }
}
