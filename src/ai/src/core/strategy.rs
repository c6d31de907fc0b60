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
use data::core::primitives::Seat;
use data::game_states::game_state::GameState;
use utils::outcome::Value;

/// A bot strategy: any system capable of selecting a legal game action for
/// a seat in a given game state.
///
/// Strategies are pure with respect to the game state they are handed; the
/// coordinator owns pacing (decision delay) and failure recovery (the safe
/// fallback when a strategy returns an error).
pub trait BotStrategy: Send + Sync {
    /// Name of this strategy, used for debugging.
    fn name(&self) -> &'static str;

    /// Select an action for `seat` to take in `game`.
    fn select(&self, game: &GameState, seat: Seat) -> Value<GameAction>;
}
