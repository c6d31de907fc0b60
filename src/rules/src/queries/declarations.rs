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
use data::core::primitives::Seat;
use data::game_states::game_state::GameState;

/// The single value the fourth declarer may not pick: whatever would make
/// the round's declarations sum to the hand size. `None` while fewer than
/// three declarations have been made, or when no value could reach the sum.
pub fn forbidden_last_value(game: &GameState) -> Option<PileCount> {
    if game.declarations_made() != 3 {
        return None;
    }
    let total = game.declaration_total();
    (total <= HAND_SIZE as PileCount).then(|| HAND_SIZE as PileCount - total)
}

/// Every declaration value the seat may legally make right now.
///
/// The range is `[0, hand_size]`, minus the forbidden last value, minus zero
/// for a seat that declared zero in both prior completed rounds.
pub fn allowed_declarations(game: &GameState, seat: Seat) -> Vec<PileCount> {
    let forbidden = forbidden_last_value(game);
    let must_declare = game.player(seat).zero_declare_streak >= 2;
    (0..=HAND_SIZE as PileCount)
        .filter(|&value| Some(value) != forbidden)
        .filter(|&value| !(must_declare && value == 0))
        .collect()
}
