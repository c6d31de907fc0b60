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

use std::fmt::Display;

use enum_iterator::Sequence;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

/// Phases of one game.
///
/// A round runs Preparation → Declaration → Turn (repeating) → Scoring;
/// Scoring either loops back to Preparation for the next round or ends the
/// game. Exactly one phase is active at any time.
#[derive(Debug, Hash, Ord, PartialOrd, Serialize, Deserialize, EnumSetType, Sequence)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Deal hands, resolve weak-hand redeal offers.
    Preparation,

    /// Each seat declares a target pile count, in order.
    Declaration,

    /// Seats play pieces in turns; each resolved turn awards piles.
    Turn,

    /// Round deltas are computed and applied to cumulative scores.
    Scoring,

    /// A seat reached the winning threshold. Terminal.
    GameEnd,
}

impl Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GamePhase::Preparation => write!(f, "preparation"),
            GamePhase::Declaration => write!(f, "declaration"),
            GamePhase::Turn => write!(f, "turn"),
            GamePhase::Scoring => write!(f, "scoring"),
            GamePhase::GameEnd => write!(f, "game_end"),
        }
    }
}
