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

use enum_iterator::all;

use crate::pieces::piece::{Piece, PieceColor, PieceKind};

/// Total number of pieces in the deck.
pub const DECK_SIZE: usize = 32;

/// Number of copies of each kind present per color.
pub fn copies_per_color(kind: PieceKind) -> usize {
    match kind {
        PieceKind::General => 1,
        PieceKind::Advisor
        | PieceKind::Elephant
        | PieceKind::Chariot
        | PieceKind::Horse
        | PieceKind::Cannon => 2,
        PieceKind::Soldier => 5,
    }
}

/// Builds the fixed deck multiset in a canonical (unshuffled) order.
pub fn build() -> Vec<Piece> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for color in all::<PieceColor>() {
        for kind in all::<PieceKind>() {
            for _ in 0..copies_per_color(kind) {
                deck.push(Piece::new(kind, color));
            }
        }
    }
    deck
}
