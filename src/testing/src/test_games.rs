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

use data::actions::game_action::{ActionOrigin, GameAction, QueuedAction};
use data::core::numerics::HAND_SIZE;
use data::core::primitives::{ActionId, RoomId, Seat};
use data::events::game_event::{EventAudience, EventEnvelope, GameEvent};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::{GameConfiguration, GameState};
use data::pieces::deck;
use data::pieces::piece::{Piece, PieceColor, PieceKind};
use data::player_states::player_state::{PlayerState, Players};
use rules::engine::state_machine::{DispatchResult, StateMachine};

pub fn red(kind: PieceKind) -> Piece {
    Piece::new(kind, PieceColor::Red)
}

pub fn black(kind: PieceKind) -> Piece {
    Piece::new(kind, PieceColor::Black)
}

/// The eight pieces with `point_value > 9`: both generals, all advisors and
/// the red elephants.
pub fn strong_pieces() -> Vec<Piece> {
    vec![
        red(PieceKind::General),
        black(PieceKind::General),
        red(PieceKind::Advisor),
        red(PieceKind::Advisor),
        black(PieceKind::Advisor),
        black(PieceKind::Advisor),
        red(PieceKind::Elephant),
        red(PieceKind::Elephant),
    ]
}

/// The remaining 24 pieces of the deck, all at or below the weak-hand
/// threshold.
pub fn weak_pieces() -> Vec<Piece> {
    let strong = strong_pieces();
    deck::build().into_iter().filter(|piece| !strong.contains(piece)).collect()
}

/// A full deck whose consecutive 8-piece slices are exactly these hands.
/// Seat One receives the first slice.
pub fn deck_from_hands(hands: [Vec<Piece>; 4]) -> Vec<Piece> {
    let deck: Vec<Piece> = hands.into_iter().flatten().collect();
    assert_eq!(deck.len(), deck::DECK_SIZE, "hands must cover the whole deck");
    deck
}

/// Hands giving every seat two strong pieces, so no hand is weak.
pub fn strong_everywhere_hands() -> [Vec<Piece>; 4] {
    let strong = strong_pieces();
    let weak = weak_pieces();
    let mut hands: [Vec<Piece>; 4] = Default::default();
    for (index, hand) in hands.iter_mut().enumerate() {
        hand.extend_from_slice(&strong[index * 2..index * 2 + 2]);
        hand.extend_from_slice(&weak[index * 6..index * 6 + 6]);
    }
    hands
}

/// Hands where seat Two holds every strong piece and the other three seats
/// are weak.
pub fn strong_at_seat_two_hands() -> [Vec<Piece>; 4] {
    let weak = weak_pieces();
    [
        weak[0..8].to_vec(),
        strong_pieces(),
        weak[8..16].to_vec(),
        weak[16..24].to_vec(),
    ]
}

pub fn players() -> Players {
    Players::new([Seat::One, Seat::Two, Seat::Three, Seat::Four].map(|seat| {
        PlayerState::new(seat, format!("Player {}", seat.index() + 1), false)
    }))
}

/// A fresh game in its initial (pre-deal) Preparation phase.
pub fn new_game(seed: u64) -> GameState {
    GameState::new(RoomId::generate(), players(), GameConfiguration::default(), seed)
}

/// A game mid-Declaration with the given hands, seat One to declare first.
pub fn game_in_declaration(hands: [Vec<Piece>; 4]) -> GameState {
    let mut game = new_game(0);
    set_hands(&mut game, hands);
    game.phase = GamePhase::Declaration;
    game.declaration_order = game.turn_starter.in_order_from().collect();
    game.current_seat = Some(game.turn_starter);
    game
}

/// A game at the start of turn 1 with the given hands and declarations,
/// seat One to open.
pub fn game_in_turn(hands: [Vec<Piece>; 4], declarations: [u32; 4]) -> GameState {
    let mut game = new_game(0);
    set_hands(&mut game, hands);
    for (index, declared) in declarations.into_iter().enumerate() {
        game.player_mut(Seat::from_index(index)).declared = Some(declared);
    }
    game.phase = GamePhase::Turn;
    game.current_seat = Some(game.turn_starter);
    game
}

pub fn set_hands(game: &mut GameState, hands: [Vec<Piece>; 4]) {
    for (index, hand) in hands.into_iter().enumerate() {
        assert_eq!(hand.len(), HAND_SIZE);
        game.player_mut(Seat::from_index(index)).hand = hand;
    }
}

/// Submits one action from a seat with a fresh action id.
pub fn submit(machine: &mut StateMachine, seat: Seat, action: GameAction) -> DispatchResult {
    submit_with_id(machine, ActionId::generate(), seat, action)
}

/// A bare room-wide envelope for driving dispatcher and broadcast tests.
pub fn envelope(sequence: u64, payload: GameEvent) -> EventEnvelope {
    EventEnvelope {
        sequence,
        phase: GamePhase::Turn,
        room_id: RoomId::generate(),
        payload,
        display: None,
        causing_action: None,
        timestamp_ms: 0,
        audience: EventAudience::Room,
    }
}

pub fn submit_with_id(
    machine: &mut StateMachine,
    action_id: ActionId,
    seat: Seat,
    action: GameAction,
) -> DispatchResult {
    machine.dispatch(&QueuedAction {
        action_id,
        origin: ActionOrigin::Seat(seat),
        action,
        arrival_sequence: 0,
    })
}
