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

use serde::{Deserialize, Serialize};

use crate::core::numerics::{PileCount, Score};
use crate::core::primitives::{PlayerId, Seat};
use crate::pieces::piece::Piece;

/// Represents the state of the four players within a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Players {
    seat_1: PlayerState,
    seat_2: PlayerState,
    seat_3: PlayerState,
    seat_4: PlayerState,
}

impl Players {
    pub fn new(players: [PlayerState; 4]) -> Self {
        let [seat_1, seat_2, seat_3, seat_4] = players;
        Self { seat_1, seat_2, seat_3, seat_4 }
    }

    /// Looks up a player by seat
    pub fn get(&self, seat: Seat) -> &PlayerState {
        match seat {
            Seat::One => &self.seat_1,
            Seat::Two => &self.seat_2,
            Seat::Three => &self.seat_3,
            Seat::Four => &self.seat_4,
        }
    }

    /// Mutable reference to a player by seat
    pub fn get_mut(&mut self, seat: Seat) -> &mut PlayerState {
        match seat {
            Seat::One => &mut self.seat_1,
            Seat::Two => &mut self.seat_2,
            Seat::Three => &mut self.seat_3,
            Seat::Four => &mut self.seat_4,
        }
    }

    /// Iterates over all players in seat order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        [&self.seat_1, &self.seat_2, &self.seat_3, &self.seat_4].into_iter()
    }

    /// Resets all per-round player state ahead of a fresh deal.
    ///
    /// Cumulative scores and declaration streaks persist across rounds.
    pub fn reset_for_round(&mut self) {
        for seat in enum_iterator::all::<Seat>() {
            let player = self.get_mut(seat);
            player.hand.clear();
            player.declared = None;
            player.captured_piles = 0;
        }
    }
}

/// Represents the state of a single participant within a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Stable identity of this participant. Survives disconnects and seat
    /// handoffs to bots keep a fresh id.
    pub id: PlayerId,

    /// Name shown to other players
    pub display_name: String,

    /// Whether this seat is played by the bot coordinator
    pub is_bot: bool,

    /// Seat this player occupies
    pub seat: Seat,

    /// Pieces currently held, in deal order
    pub hand: Vec<Piece>,

    /// Pile count declared for the current round, once made
    pub declared: Option<PileCount>,

    /// Piles captured so far in the current round
    pub captured_piles: PileCount,

    /// Score accumulated across all completed rounds
    pub cumulative_score: Score,

    /// Number of consecutive completed rounds in which this player declared
    /// zero. Two in a row forbids a third.
    pub zero_declare_streak: u8,
}

impl PlayerState {
    pub fn new(seat: Seat, display_name: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id: PlayerId::generate(),
            display_name: display_name.into(),
            is_bot,
            seat,
            hand: vec![],
            declared: None,
            captured_piles: 0,
            cumulative_score: 0,
            zero_declare_streak: 0,
        }
    }

    /// True when every piece has been played out for the current round.
    pub fn hand_empty(&self) -> bool {
        self.hand.is_empty()
    }
}
