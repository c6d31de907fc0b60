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

use data::core::numerics::{PileCount, HAND_SIZE};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::GameState;
use utils::outcome::Outcome;
use utils::{outcome, verify};

/// Validates the structural invariants which must hold between actions.
///
/// Run against the staged copy after every mutation; a failure rolls the
/// action back and surfaces as `InternalError` without a phase change.
pub fn check(game: &GameState) -> Outcome {
    verify!(game.redeal_multiplier >= 1, "redeal multiplier below 1");
    verify!(game.queued_transition.is_none(), "unconsumed phase transition");

    for player in game.players.iter() {
        verify!(
            player.hand.len() <= HAND_SIZE,
            "{} holds {} pieces",
            player.seat,
            player.hand.len()
        );
    }

    if game.declarations_made() == 4 {
        verify!(
            game.declaration_total() != HAND_SIZE as PileCount,
            "declarations sum to hand size"
        );
    }

    if let Some(required) = game.required_piece_count {
        for play in &game.turn_plays {
            verify!(
                play.pieces.len() == required
                    || (play.pieces.len() < required && game.player(play.seat).hand_empty()),
                "play size {} does not match required {}",
                play.pieces.len(),
                required
            );
        }
    }

    if game.phase == GamePhase::Turn && game.pending_display.is_none() {
        if let Some(seat) = game.current_seat {
            verify!(!game.player(seat).hand_empty(), "{seat} is on the clock with no pieces");
        }
    }

    if game.phase == GamePhase::GameEnd {
        verify!(game.pending_display.is_none(), "display pending after game end");
    }

    outcome::OK
}
