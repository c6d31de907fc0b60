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

use data::core::primitives::Seat;
use data::game_states::game_state::TurnPlay;
use data::pieces::piece::PieceKind;
use data::pieces::play_type::PlayType;
use rules::mutations::deal;
use rules::plays::classify::{classify_play, validate_play};
use rules::plays::ranking::rank_plays;
use rules::queries::declarations;
use rules::scoring::score_round;
use testing::test_games;
use testing::test_games::{black, red};

#[test]
fn classification_covers_the_play_families() {
    assert_eq!(classify_play(&[red(PieceKind::General)]), PlayType::Single);
    assert_eq!(
        classify_play(&[red(PieceKind::Advisor), red(PieceKind::Advisor)]),
        PlayType::Pair
    );
    assert_eq!(
        classify_play(&[red(PieceKind::Advisor), black(PieceKind::Advisor)]),
        PlayType::Invalid
    );
    assert_eq!(
        classify_play(&[
            black(PieceKind::Soldier),
            black(PieceKind::Soldier),
            black(PieceKind::Soldier)
        ]),
        PlayType::ThreeOfAKind
    );
    assert_eq!(
        classify_play(&[
            red(PieceKind::Chariot),
            red(PieceKind::Horse),
            red(PieceKind::Cannon)
        ]),
        PlayType::Straight
    );
    assert_eq!(
        classify_play(&[
            red(PieceKind::Chariot),
            red(PieceKind::Chariot),
            red(PieceKind::Horse),
            red(PieceKind::Cannon)
        ]),
        PlayType::ExtendedStraight
    );
    assert_eq!(
        classify_play(&[
            black(PieceKind::Soldier),
            black(PieceKind::Soldier),
            black(PieceKind::Soldier),
            black(PieceKind::Soldier),
            black(PieceKind::Soldier)
        ]),
        PlayType::FiveOfAKind
    );
    assert_eq!(
        classify_play(&[
            red(PieceKind::Chariot),
            red(PieceKind::Chariot),
            red(PieceKind::Horse),
            red(PieceKind::Horse),
            red(PieceKind::Cannon),
            red(PieceKind::Cannon)
        ]),
        PlayType::DoubleStraight
    );
    // Mixed colors never form a multi-piece shape.
    assert_eq!(
        classify_play(&[
            red(PieceKind::Chariot),
            black(PieceKind::Horse),
            red(PieceKind::Cannon)
        ]),
        PlayType::Invalid
    );
}

#[test]
fn only_matching_shapes_compete_for_a_turn() {
    assert!(validate_play(PlayType::Pair, &[black(PieceKind::Horse), black(PieceKind::Horse)]));
    assert!(!validate_play(PlayType::Pair, &[black(PieceKind::Horse), red(PieceKind::Horse)]));
    assert!(!validate_play(PlayType::Invalid, &[red(PieceKind::General)]));

    let plays = vec![
        TurnPlay {
            seat: Seat::One,
            pieces: vec![black(PieceKind::Cannon), black(PieceKind::Cannon)],
            play_type: PlayType::Pair,
        },
        // Stronger pieces, but the wrong shape: cannot take the turn.
        TurnPlay {
            seat: Seat::Two,
            pieces: vec![red(PieceKind::General), black(PieceKind::General)],
            play_type: PlayType::Invalid,
        },
        TurnPlay {
            seat: Seat::Three,
            pieces: vec![red(PieceKind::Cannon), red(PieceKind::Cannon)],
            play_type: PlayType::Pair,
        },
        TurnPlay {
            seat: Seat::Four,
            pieces: vec![black(PieceKind::Soldier), black(PieceKind::Soldier)],
            play_type: PlayType::Pair,
        },
    ];
    assert_eq!(rank_plays(&plays), Seat::Three);
}

#[test]
fn equal_strength_goes_to_the_earlier_play() {
    let plays = vec![
        TurnPlay { seat: Seat::Two, pieces: vec![black(PieceKind::Horse)], play_type: PlayType::Single },
        TurnPlay { seat: Seat::Three, pieces: vec![black(PieceKind::Horse)], play_type: PlayType::Single },
        TurnPlay { seat: Seat::Four, pieces: vec![black(PieceKind::Soldier)], play_type: PlayType::Single },
    ];
    assert_eq!(rank_plays(&plays), Seat::Two);
}

#[test]
fn scoring_rewards_exact_declarations_and_punishes_broken_zeros() {
    // Clean zero.
    assert_eq!(score_round(0, 0, 1), 3);
    // Broken zero costs each captured pile.
    assert_eq!(score_round(0, 3, 1), -3);
    // Exact hit earns the declaration plus the bonus.
    assert_eq!(score_round(4, 4, 1), 9);
    // A miss costs the distance, either direction.
    assert_eq!(score_round(5, 2, 1), -3);
    assert_eq!(score_round(2, 5, 1), -3);
    // The redeal multiplier scales the whole round.
    assert_eq!(score_round(0, 0, 2), 6);
    assert_eq!(score_round(3, 1, 3), -6);
}

#[test]
fn weak_hands_have_nothing_above_nine_points() {
    assert!(deal::is_weak_hand(&test_games::weak_pieces()[0..8]));
    let mut strong = test_games::weak_pieces()[0..7].to_vec();
    strong.push(red(PieceKind::Elephant));
    assert!(!deal::is_weak_hand(&strong));
}

#[test]
fn last_declarer_loses_exactly_one_value() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut game = test_games::game_in_declaration(hands);
    game.player_mut(Seat::One).declared = Some(3);
    game.player_mut(Seat::Two).declared = Some(2);
    game.player_mut(Seat::Three).declared = Some(2);
    game.current_seat = Some(Seat::Four);

    assert_eq!(declarations::forbidden_last_value(&game), Some(1));
    let allowed = declarations::allowed_declarations(&game, Seat::Four);
    assert!(!allowed.contains(&1));
    assert_eq!(allowed.len(), 8);
}
