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

use std::cmp::Reverse;

use data::actions::game_action::{ActionKind, ActionOrigin, GameAction};
use data::core::numerics::Score;
use data::core::primitives::{Seat, SeatMap};
use data::events::display::{DisplayMetadata, DisplayType};
use data::events::game_event::{GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::{GameState, PendingAdvance, PendingDisplay};
use enumset::{enum_set, EnumSet};
use tracing::info;
use utils::outcome::{Outcome, Value};
use utils::{fail, outcome};

use crate::engine::emit::EventSink;
use crate::phases::{PhaseBehavior, PhaseUpdate};
use crate::scoring;

/// Applies round deltas on entry and paces the room through the scoring
/// display; advancing either deals the next round or ends the game.
pub struct ScoringPhase;

impl PhaseBehavior for ScoringPhase {
    fn allowed_actions(&self, _game: &GameState) -> EnumSet<ActionKind> {
        enum_set!(ActionKind::AdvanceDisplay | ActionKind::Leave)
    }

    fn on_enter(&self, game: &mut GameState, events: &mut EventSink) -> Outcome {
        let multiplier = game.redeal_multiplier;
        let mut deltas: SeatMap<Score> = SeatMap::default();
        for seat in enum_iterator::all::<Seat>() {
            let player = game.player_mut(seat);
            let declared = player.declared.unwrap_or(0);
            let delta = scoring::score_round(declared, player.captured_piles, multiplier);
            player.cumulative_score += delta;
            if declared == 0 {
                player.zero_declare_streak += 1;
            } else {
                player.zero_declare_streak = 0;
            }
            deltas[seat] = delta;
        }

        let totals = cumulative_totals(game);
        let champion = round_champion(game, &totals);
        let (advance, next_phase) = match champion {
            Some(winner) => (PendingAdvance::EndGame { winner }, GamePhase::GameEnd),
            None => (PendingAdvance::NextRound, GamePhase::Preparation),
        };
        info!(round = game.round_number, multiplier, ?champion, "Round scored");

        game.pending_display =
            Some(PendingDisplay { display_type: DisplayType::ScoringDisplay, advance });
        game.current_seat = None;

        events.push_with_display(
            GameEvent::ScoringApplied {
                round_number: game.round_number,
                redeal_multiplier: multiplier,
                deltas,
                totals,
            },
            DisplayMetadata {
                display_type: DisplayType::ScoringDisplay,
                show_for_seconds: game.configuration.scoring_display_seconds,
                auto_advance: true,
                can_skip: true,
                next_phase,
            },
        );
        outcome::OK
    }

    fn handle(
        &self,
        game: &mut GameState,
        _origin: ActionOrigin,
        action: &GameAction,
        _events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        let GameAction::AdvanceDisplay { of } = action else {
            return Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase));
        };
        let Some(pending) = game.pending_display else {
            return Ok(PhaseUpdate::Rejected(RejectReason::NoPendingDisplay));
        };
        if *of != pending.display_type {
            return Ok(PhaseUpdate::Rejected(RejectReason::DisplayMismatch));
        }

        match pending.advance {
            PendingAdvance::NextRound => {
                game.round_number += 1;
                game.turn_number = 1;
                game.redeal_multiplier = 1;
                game.turn_starter = game.turn_starter.next();
                game.pending_display = None;
                game.queued_transition = Some(GamePhase::Preparation);
            }
            PendingAdvance::EndGame { .. } => {
                // The pending display stays in place: GameEnd's enter hook
                // consumes it to learn the winner fixed at scoring time.
                game.queued_transition = Some(GamePhase::GameEnd);
            }
            _ => fail!("scoring display resolved to a turn advance"),
        }
        Ok(PhaseUpdate::Applied)
    }
}

/// Everyone's cumulative score after the round's deltas.
pub fn cumulative_totals(game: &GameState) -> SeatMap<Score> {
    let mut totals: SeatMap<Score> = SeatMap::default();
    for seat in enum_iterator::all::<Seat>() {
        totals[seat] = game.player(seat).cumulative_score;
    }
    totals
}

/// The winner, once any seat has reached the configured threshold: highest
/// total, ties to the lowest seat index.
fn round_champion(game: &GameState, totals: &SeatMap<Score>) -> Option<Seat> {
    enum_iterator::all::<Seat>()
        .filter(|&seat| totals[seat] >= game.configuration.winning_score_threshold)
        .max_by_key(|&seat| (totals[seat], Reverse(seat.index())))
}
