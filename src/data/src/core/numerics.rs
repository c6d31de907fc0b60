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

/// Strength value of a piece. Higher is stronger.
pub type Points = u32;

/// A player's cumulative score across rounds. May go negative.
pub type Score = i64;

/// Number of captured or declared piles within a round.
pub type PileCount = u32;

/// 1-based turn number within a round.
pub type TurnNumber = u32;

/// 1-based round number within a game.
pub type RoundNumber = u32;

/// Number of pieces dealt to each seat at the start of a round.
pub const HAND_SIZE: usize = 8;

/// Maximum number of pieces a turn opener may put down.
pub const MAX_PLAY_SIZE: usize = 6;

/// A hand with no piece above this point value is a weak hand.
pub const WEAK_HAND_THRESHOLD: Points = 9;
