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
use rules::queries::legal_actions;
use utils::outcome::Value;
use utils::with_error::WithError;

use crate::core::strategy::BotStrategy;

/// Baseline strategy: takes the first legal action, every time.
#[derive(Debug, Clone)]
pub struct FirstAvailable;

impl BotStrategy for FirstAvailable {
    fn name(&self) -> &'static str {
        "first_available"
    }

    fn select(&self, game: &GameState, seat: Seat) -> Value<GameAction> {
        legal_actions::compute(game, seat)
            .into_iter()
            .next()
            .with_error(|| format!("No legal actions for {seat}"))
    }
}
