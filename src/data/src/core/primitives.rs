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
use enum_map::Enum;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one of the four seats at the table.
///
/// Seats are fixed positions; the player (human or bot) occupying a seat may
/// change over the life of a room, but the seat identity does not. Turn order
/// always proceeds in ascending seat order, wrapping after [Seat::Four].
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Enum, Ord, PartialOrd, Sequence)]
pub enum Seat {
    One,
    Two,
    Three,
    Four,
}

impl Seat {
    /// 0-based index of this seat within table order.
    pub fn index(&self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
            Seat::Three => 2,
            Seat::Four => 3,
        }
    }

    /// Seat for a 0-based index, wrapping modulo 4.
    pub fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Seat::One,
            1 => Seat::Two,
            2 => Seat::Three,
            _ => Seat::Four,
        }
    }

    /// The seat which acts after this one in table order.
    pub fn next(&self) -> Self {
        Seat::from_index(self.index() + 1)
    }

    /// All four seats starting from `self`, in table order.
    pub fn in_order_from(self) -> impl Iterator<Item = Seat> {
        (0..4).map(move |offset| Seat::from_index(self.index() + offset))
    }
}

/// A table keyed by [Seat], with an entry for every seat.
pub type SeatMap<T> = enum_map::EnumMap<Seat, T>;

impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seat {}", self.index())
    }
}

/// Unique identifier for a room.
///
/// Each room hosts at most one game at a time; the game state machine is
/// owned by its room.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for a participant.
///
/// A 'player' is a participant within a game, human or bot. Identity is
/// stable across disconnects and reconnects.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for a transport connection.
///
/// Connections are transient; a player may hold zero or more live
/// connections at any moment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique identifier for an inbound action, assigned by its producer.
///
/// Used for duplicate detection: re-submitting an action with an already
/// handled id within the dedup window is an idempotent no-op.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}
