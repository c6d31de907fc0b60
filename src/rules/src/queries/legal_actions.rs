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
use data::core::numerics::MAX_PLAY_SIZE;
use data::core::primitives::Seat;
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use itertools::Itertools;

use crate::plays::classify;
use crate::queries::declarations;

/// All legal game actions the named seat can take in the current state.
///
/// Used by bot strategies to pick a move and by tests as a turn oracle; the
/// state machine re-validates every submitted action independently.
pub fn compute(game: &GameState, seat: Seat) -> Vec<GameAction> {
    match game.phase {
        GamePhase::Preparation => preparation_actions(game, seat),
        GamePhase::Declaration => declaration_actions(game, seat),
        GamePhase::Turn => turn_actions(game, seat),
        GamePhase::Scoring => display_actions(game),
        GamePhase::GameEnd => vec![],
    }
}

/// Returns true if the seat can currently legally take the provided action.
pub fn can_take_action(game: &GameState, seat: Seat, action: &GameAction) -> bool {
    compute(game, seat).iter().any(|a| a == action)
}

/// The seat currently on the clock, if a single seat is.
pub fn next_to_act(game: &GameState) -> Option<Seat> {
    game.current_seat
}

fn preparation_actions(game: &GameState, seat: Seat) -> Vec<GameAction> {
    let mut actions = vec![];
    if game.weak_hand_seats.contains(&seat) && !game.redeal_requests.contains(&seat) {
        actions.push(GameAction::RequestRedeal);
    }
    if game.current_weak_offer == Some(seat) {
        actions.push(GameAction::AcceptRedeal);
        actions.push(GameAction::DeclineRedeal);
    }
    actions
}

fn declaration_actions(game: &GameState, seat: Seat) -> Vec<GameAction> {
    if game.current_seat != Some(seat) {
        return vec![];
    }
    declarations::allowed_declarations(game, seat)
        .into_iter()
        .map(|value| GameAction::Declare { value })
        .collect()
}

fn turn_actions(game: &GameState, seat: Seat) -> Vec<GameAction> {
    if game.pending_display.is_some() {
        return display_actions(game);
    }
    if game.current_seat != Some(seat) {
        return vec![];
    }

    let hand = &game.player(seat).hand;
    let mut actions = vec![];
    match game.required_piece_count {
        None => {
            // Opening a turn: any recognized shape of 1..=6 pieces.
            for count in 1..=MAX_PLAY_SIZE.min(hand.len()) {
                for indices in (0..hand.len()).combinations(count) {
                    let pieces: Vec<_> = indices.iter().map(|&i| hand[i]).collect();
                    if classify::classify_play(&pieces).is_valid() {
                        actions.push(GameAction::PlayPieces { piece_indices: indices });
                    }
                }
            }
        }
        Some(required) => {
            // Following: every combination of the required size is
            // submittable, matching shape or not.
            let count = required.min(hand.len());
            for indices in (0..hand.len()).combinations(count) {
                actions.push(GameAction::PlayPieces { piece_indices: indices });
            }
        }
    }
    actions
}

fn display_actions(game: &GameState) -> Vec<GameAction> {
    match game.pending_display {
        Some(pending) => vec![GameAction::AdvanceDisplay { of: pending.display_type }],
        None => vec![],
    }
}
