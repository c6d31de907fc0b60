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

use data::core::numerics::Points;
use data::core::primitives::Seat;
use data::game_states::game_state::TurnPlay;
use data::pieces::piece::Piece;

/// Total strength of a set of pieces.
pub fn play_points(pieces: &[Piece]) -> Points {
    pieces.iter().map(Piece::point_value).sum()
}

/// Determines the winner of a resolved turn.
///
/// The opener's play type is authoritative: only plays classified to the
/// same type compete. The strongest competing play by total point value
/// wins; on equal strength the earlier play holds. The opener always
/// competes against itself, so a turn always has a winner.
pub fn rank_plays(plays: &[TurnPlay]) -> Seat {
    let opener = &plays[0];
    let mut winner = opener;
    for play in &plays[1..] {
        if play.play_type == opener.play_type
            && opener.play_type.is_valid()
            && play_points(&play.pieces) > play_points(&winner.pieces)
        {
            winner = play;
        }
    }
    winner.seat
}
