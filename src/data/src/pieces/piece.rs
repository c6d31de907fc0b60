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

use crate::core::numerics::Points;

/// Possible colors of pieces.
#[derive(Debug, Hash, Ord, PartialOrd, Serialize, Deserialize, EnumSetType, Sequence)]
pub enum PieceColor {
    Red,
    Black,
}

impl Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceColor::Red => write!(f, "Red"),
            PieceColor::Black => write!(f, "Black"),
        }
    }
}

/// Kinds of pieces in the deck.
///
/// Ordered strongest to weakest; within a kind the red piece outranks the
/// black one. See [Piece::point_value].
#[derive(Debug, Hash, Ord, PartialOrd, Serialize, Deserialize, EnumSetType, Sequence)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Chariot,
    Horse,
    Cannon,
    Soldier,
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceKind::General => write!(f, "General"),
            PieceKind::Advisor => write!(f, "Advisor"),
            PieceKind::Elephant => write!(f, "Elephant"),
            PieceKind::Chariot => write!(f, "Chariot"),
            PieceKind::Horse => write!(f, "Horse"),
            PieceKind::Cannon => write!(f, "Cannon"),
            PieceKind::Soldier => write!(f, "Soldier"),
        }
    }
}

/// A single immutable piece.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// Strength of this piece.
    ///
    /// Values run from the red general (14) down to the black soldier (1),
    /// alternating red above black within each kind. Point values determine
    /// play ranking and weak-hand detection.
    pub fn point_value(&self) -> Points {
        let base = match self.kind {
            PieceKind::General => 13,
            PieceKind::Advisor => 11,
            PieceKind::Elephant => 9,
            PieceKind::Chariot => 7,
            PieceKind::Horse => 5,
            PieceKind::Cannon => 3,
            PieceKind::Soldier => 1,
        };
        match self.color {
            PieceColor::Red => base + 1,
            PieceColor::Black => base,
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}
