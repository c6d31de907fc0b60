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

use data::core::numerics::{HAND_SIZE, WEAK_HAND_THRESHOLD};
use data::core::primitives::{Seat, SeatMap};
use data::game_states::game_state::GameState;
use data::pieces::deck;
use data::pieces::piece::Piece;
use rand::seq::SliceRandom;

/// Shuffles the deck with the room's generator and deals a fresh hand of
/// [HAND_SIZE] pieces to every seat, replacing whatever was held before.
///
/// Returns the dealt hands for inclusion in the `HandsDealt` event.
pub fn deal_hands(game: &mut GameState) -> SeatMap<Vec<Piece>> {
    let mut pieces = match game.stacked_decks.pop_front() {
        Some(stacked) if stacked.len() == deck::DECK_SIZE => stacked,
        _ => {
            let mut shuffled = deck::build();
            shuffled.shuffle(&mut game.rng);
            shuffled
        }
    };

    let mut hands: SeatMap<Vec<Piece>> = SeatMap::default();
    for seat in enum_iterator::all::<Seat>() {
        let hand: Vec<Piece> = pieces.drain(..HAND_SIZE).collect();
        game.player_mut(seat).hand = hand.clone();
        hands[seat] = hand;
    }
    hands
}

/// A hand with nothing stronger than [WEAK_HAND_THRESHOLD] is weak and
/// entitles its holder to a redeal offer.
pub fn is_weak_hand(hand: &[Piece]) -> bool {
    hand.iter().all(|piece| piece.point_value() <= WEAK_HAND_THRESHOLD)
}

/// Seats holding weak hands, in ascending seat order starting from the
/// round's turn starter. This is also the order redeal offers are made in.
pub fn weak_seats_in_offer_order(game: &GameState) -> Vec<Seat> {
    game.turn_starter
        .in_order_from()
        .filter(|&seat| is_weak_hand(&game.player(seat).hand))
        .collect()
}
