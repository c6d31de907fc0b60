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

use data::core::numerics::{PileCount, Score};

/// Score delta for one seat at the close of a round.
///
/// Hitting a declaration exactly is rewarded, missing it costs the
/// difference, and a declared zero is a gamble: a bonus when kept clean, a
/// penalty per captured pile when broken. The redeal multiplier scales the
/// whole round.
pub fn score_round(declared: PileCount, captured: PileCount, multiplier: u32) -> Score {
    let base: Score = if declared == 0 {
        if captured == 0 {
            3
        } else {
            -(captured as Score)
        }
    } else if declared == captured {
        declared as Score + 5
    } else {
        -((declared as Score - captured as Score).abs())
    };
    base * multiplier as Score
}
