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

use data::actions::game_action::GameAction;
use data::core::numerics::Points;
use data::core::primitives::Seat;
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use data::pieces::piece::Piece;
use rules::plays::{classify, ranking};
use rules::queries::legal_actions;
use utils::outcome::Value;
use utils::with_error::WithError;

use crate::core::strategy::BotStrategy;

/// A hand whose best piece is at or below this accepts a redeal.
const REDEAL_APPETITE: Points = 7;

/// Default strategy: declares to measured hand strength, spends strength
/// while piles are still owed, and dumps the cheapest pieces afterwards.
#[derive(Debug, Clone)]
pub struct Balanced;

impl BotStrategy for Balanced {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn select(&self, game: &GameState, seat: Seat) -> Value<GameAction> {
        match game.phase {
            GamePhase::Preparation => self.select_preparation(game, seat),
            GamePhase::Declaration => self.select_declaration(game, seat),
            GamePhase::Turn => self.select_turn(game, seat),
            _ => first_legal(game, seat),
        }
    }
}

impl Balanced {
    fn select_preparation(&self, game: &GameState, seat: Seat) -> Value<GameAction> {
        let best = best_point(&game.player(seat).hand);
        if game.current_weak_offer == Some(seat) {
            return Ok(if best <= REDEAL_APPETITE {
                GameAction::AcceptRedeal
            } else {
                GameAction::DeclineRedeal
            });
        }
        if game.weak_hand_seats.contains(&seat)
            && !game.redeal_requests.contains(&seat)
            && best <= REDEAL_APPETITE
        {
            return Ok(GameAction::RequestRedeal);
        }
        first_legal(game, seat)
    }

    fn select_declaration(&self, game: &GameState, seat: Seat) -> Value<GameAction> {
        // One declared pile per piece strong enough to expect a capture.
        let target =
            game.player(seat).hand.iter().filter(|p| p.point_value() >= 11).count() as i64;
        legal_actions::compute(game, seat)
            .into_iter()
            .filter_map(|action| match action {
                GameAction::Declare { value } => Some((value, (value as i64 - target).abs())),
                _ => None,
            })
            .min_by_key(|&(value, distance)| (distance, value))
            .map(|(value, _)| GameAction::Declare { value })
            .with_error(|| format!("No legal declaration for {seat}"))
    }

    fn select_turn(&self, game: &GameState, seat: Seat) -> Value<GameAction> {
        let player = game.player(seat);
        let hungry = player.declared.unwrap_or(0) > player.captured_piles;
        let candidates: Vec<(Vec<usize>, Vec<Piece>)> = legal_actions::compute(game, seat)
            .into_iter()
            .filter_map(|action| match action {
                GameAction::PlayPieces { piece_indices } => {
                    let pieces =
                        piece_indices.iter().map(|&i| player.hand[i]).collect::<Vec<_>>();
                    Some((piece_indices, pieces))
                }
                _ => None,
            })
            .collect();
        if candidates.is_empty() {
            return first_legal(game, seat);
        }

        let chosen = match game.turn_plays.first() {
            // Opening: spend strength while piles are owed, shed otherwise.
            None => {
                if hungry {
                    candidates.iter().max_by_key(|(_, pieces)| {
                        (pieces.len(), ranking::play_points(pieces))
                    })
                } else {
                    candidates.iter().min_by_key(|(_, pieces)| {
                        (pieces.len(), ranking::play_points(pieces))
                    })
                }
            }
            // Following: the weakest play that still takes the lead, else
            // the cheapest discard.
            Some(opener) => {
                let lead = game
                    .turn_plays
                    .iter()
                    .filter(|play| play.play_type == opener.play_type)
                    .map(|play| ranking::play_points(&play.pieces))
                    .max()
                    .unwrap_or(0);
                let winning = candidates
                    .iter()
                    .filter(|(_, pieces)| {
                        classify::validate_play(opener.play_type, pieces)
                            && ranking::play_points(pieces) > lead
                    })
                    .min_by_key(|(_, pieces)| ranking::play_points(pieces));
                match winning {
                    Some(play) if hungry => Some(play),
                    _ => candidates.iter().min_by_key(|(_, pieces)| ranking::play_points(pieces)),
                }
            }
        };

        chosen
            .map(|(indices, _)| GameAction::PlayPieces { piece_indices: indices.clone() })
            .with_error(|| format!("No legal play for {seat}"))
    }
}

fn best_point(hand: &[Piece]) -> Points {
    hand.iter().map(Piece::point_value).max().unwrap_or(0)
}

fn first_legal(game: &GameState, seat: Seat) -> Value<GameAction> {
    legal_actions::compute(game, seat)
        .into_iter()
        .next()
        .with_error(|| format!("No legal actions for {seat}"))
}
