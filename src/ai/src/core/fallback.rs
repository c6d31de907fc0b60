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
use data::game_states::game_state::GameState;
use rules::plays::ranking;
use rules::queries::legal_actions;

/// Deterministic safe choice used when a strategy fails: the lowest legal
/// declaration, the cheapest legal play, a declined redeal offer. Never
/// panics; returns `None` only when the seat has no legal action at all.
pub fn safe_action(game: &GameState, seat: Seat) -> Option<GameAction> {
    let legal = legal_actions::compute(game, seat);

    if let Some(lowest) = legal
        .iter()
        .filter_map(|action| match action {
            GameAction::Declare { value } => Some((*value, action)),
            _ => None,
        })
        .min_by_key(|(value, _)| *value)
    {
        return Some(lowest.1.clone());
    }

    if let Some(cheapest) = legal
        .iter()
        .filter_map(|action| match action {
            GameAction::PlayPieces { piece_indices } => {
                Some((play_cost(game, seat, piece_indices), action))
            }
            _ => None,
        })
        .min_by_key(|(cost, _)| *cost)
    {
        return Some(cheapest.1.clone());
    }

    if legal.contains(&GameAction::DeclineRedeal) {
        return Some(GameAction::DeclineRedeal);
    }
    legal.into_iter().next()
}

fn play_cost(game: &GameState, seat: Seat, indices: &[usize]) -> (usize, Points) {
    let hand = &game.player(seat).hand;
    let pieces: Vec<_> = indices.iter().filter_map(|&i| hand.get(i).copied()).collect();
    (pieces.len(), ranking::play_points(&pieces))
}
