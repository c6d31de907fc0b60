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

use data::core::primitives::{RoomId, Seat, SeatMap};
use data::player_states::player_state::{PlayerState, Players};

/// Who occupies a seat before (and independent of) any game.
#[derive(Debug, Clone, Default)]
pub struct SeatAssignment {
    pub display_name: String,
    pub is_bot: bool,
}

impl SeatAssignment {
    pub fn human(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), is_bot: false }
    }

    pub fn bot(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), is_bot: true }
    }
}

/// One room: exactly four seats, a host, and at most one running game.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,

    /// Seat whose occupant controls pre-game actions
    pub host_seat: Seat,

    /// True once `start_game` has been accepted
    pub started: bool,

    pub seats: SeatMap<SeatAssignment>,
}

impl Room {
    pub fn new(id: RoomId, host_seat: Seat, seats: SeatMap<SeatAssignment>) -> Self {
        Self { id, host_seat, started: false, seats }
    }

    /// A room where the host sits at seat one and bots fill the rest.
    pub fn with_bots(id: RoomId, host_name: impl Into<String>) -> Self {
        let mut seats: SeatMap<SeatAssignment> = SeatMap::default();
        seats[Seat::One] = SeatAssignment::human(host_name);
        for seat in [Seat::Two, Seat::Three, Seat::Four] {
            seats[seat] = SeatAssignment::bot(format!("Bot {}", seat.index() + 1));
        }
        Self::new(id, Seat::One, seats)
    }

    /// Builds the in-game player set from the current seat assignments.
    pub fn players(&self) -> Players {
        Players::new([Seat::One, Seat::Two, Seat::Three, Seat::Four].map(|seat| {
            let assignment = &self.seats[seat];
            PlayerState::new(seat, assignment.display_name.clone(), assignment.is_bot)
        }))
    }
}
