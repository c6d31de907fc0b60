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
use data::core::primitives::Seat;
use data::events::game_event::{GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use enumset::{enum_set, EnumSet};
use tracing::debug;
use utils::outcome::{Outcome, Value};
use utils::{outcome, verify};

use crate::engine::emit::EventSink;
use crate::mutations::deal;
use crate::phases::{PhaseBehavior, PhaseUpdate};

/// Deals hands and walks weak seats through redeal offers.
///
/// A weak seat may register a standing request at any point; offers are made
/// one seat at a time in ascending seat order from the round's turn starter.
/// Any accepted offer re-deals and re-enters this phase with the multiplier
/// incremented; once every weak seat has declined, declarations begin.
pub struct PreparationPhase;

impl PhaseBehavior for PreparationPhase {
    fn allowed_actions(&self, game: &GameState) -> EnumSet<ActionKind> {
        let mut allowed = enum_set!(ActionKind::Leave);
        if !game.weak_hand_seats.is_empty() {
            allowed |= ActionKind::RequestRedeal;
        }
        if game.current_weak_offer.is_some() {
            allowed |= ActionKind::AcceptRedeal | ActionKind::DeclineRedeal;
        }
        allowed
    }

    fn on_enter(&self, game: &mut GameState, events: &mut EventSink) -> Outcome {
        game.players.reset_for_round();
        game.redeal_requests.clear();
        let hands = deal::deal_hands(game);
        game.weak_hand_seats = deal::weak_seats_in_offer_order(game);
        events.push(GameEvent::HandsDealt {
            hands,
            weak_hand_seats: game.weak_hand_seats.clone(),
        });

        match game.weak_hand_seats.first().copied() {
            None => {
                debug!(round = game.round_number, "No weak hands, skipping redeal offers");
                game.current_weak_offer = None;
                game.current_seat = None;
                game.queued_transition = Some(GamePhase::Declaration);
            }
            Some(first) => {
                game.current_weak_offer = Some(first);
                game.current_seat = Some(first);
                events.push(GameEvent::RedealOffered { seat: first });
            }
        }
        outcome::OK
    }

    fn handle(
        &self,
        game: &mut GameState,
        origin: ActionOrigin,
        action: &GameAction,
        events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        let Some(seat) = origin.seat() else {
            return Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase));
        };

        match action {
            GameAction::RequestRedeal => {
                if !game.weak_hand_seats.contains(&seat) {
                    return Ok(PhaseUpdate::Rejected(RejectReason::NotWeakHand));
                }
                if !game.redeal_requests.contains(&seat) {
                    game.redeal_requests.push(seat);
                    events.push(GameEvent::RedealRequested { seat });
                }
                Ok(PhaseUpdate::Applied)
            }
            GameAction::AcceptRedeal => {
                if game.current_weak_offer != Some(seat) {
                    return Ok(PhaseUpdate::Rejected(RejectReason::NoPendingOffer));
                }
                game.redeal_multiplier += 1;
                events.push(GameEvent::RedealDecision { seat, accepted: true });
                game.queued_transition = Some(GamePhase::Preparation);
                Ok(PhaseUpdate::Applied)
            }
            GameAction::DeclineRedeal => {
                if game.current_weak_offer != Some(seat) {
                    return Ok(PhaseUpdate::Rejected(RejectReason::NoPendingOffer));
                }
                events.push(GameEvent::RedealDecision { seat, accepted: false });
                self.advance_offer(game, seat, events)?;
                Ok(PhaseUpdate::Applied)
            }
            _ => Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase)),
        }
    }

    fn on_exit(&self, game: &mut GameState, _events: &mut EventSink) -> Outcome {
        game.current_weak_offer = None;
        outcome::OK
    }
}

impl PreparationPhase {
    /// Moves the offer to the next weak seat, or closes the offer round and
    /// queues the transition to Declaration.
    fn advance_offer(&self, game: &mut GameState, declined: Seat, events: &mut EventSink) -> Outcome {
        let position = game.weak_hand_seats.iter().position(|&s| s == declined);
        verify!(position.is_some(), "declining seat is not weak");
        match game.weak_hand_seats.get(position.unwrap_or_default() + 1).copied() {
            Some(next) => {
                game.current_weak_offer = Some(next);
                game.current_seat = Some(next);
                events.push(GameEvent::RedealOffered { seat: next });
            }
            None => {
                game.current_weak_offer = None;
                game.current_seat = None;
                game.queued_transition = Some(GamePhase::Declaration);
            }
        }
        outcome::OK
    }
}
