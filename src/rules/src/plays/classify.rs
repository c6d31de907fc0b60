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

use data::pieces::piece::{Piece, PieceKind};
use data::pieces::play_type::PlayType;
use itertools::Itertools;

/// Classifies a set of pieces put down together into its [PlayType].
///
/// Multi-piece shapes require a single color throughout. The "of a kind"
/// family is built from soldiers; the straight family from the chariot,
/// horse and cannon kinds.
pub fn classify_play(pieces: &[Piece]) -> PlayType {
    match pieces.len() {
        1 => PlayType::Single,
        2 => classify_two(pieces),
        3 => classify_three(pieces),
        4 => classify_four(pieces),
        5 => classify_five(pieces),
        6 => classify_six(pieces),
        _ => PlayType::Invalid,
    }
}

/// Returns true if `play` competes against an opener of type `opener`.
///
/// A play of the wrong shape may still be put down when a seat has nothing
/// matching, but it can never win the turn.
pub fn validate_play(opener: PlayType, play: &[Piece]) -> bool {
    opener.is_valid() && classify_play(play) == opener
}

fn one_color(pieces: &[Piece]) -> bool {
    pieces.iter().map(|p| p.color).all_equal()
}

fn all_soldiers(pieces: &[Piece]) -> bool {
    pieces.iter().all(|p| p.kind == PieceKind::Soldier)
}

/// The straight kinds: chariot, horse, cannon.
fn straight_kinds(pieces: &[Piece]) -> bool {
    pieces
        .iter()
        .all(|p| matches!(p.kind, PieceKind::Chariot | PieceKind::Horse | PieceKind::Cannon))
}

/// True when chariot, horse and cannon are each present at least once.
fn covers_straight(pieces: &[Piece]) -> bool {
    let kinds = pieces.iter().map(|p| p.kind).collect::<Vec<_>>();
    kinds.contains(&PieceKind::Chariot)
        && kinds.contains(&PieceKind::Horse)
        && kinds.contains(&PieceKind::Cannon)
}

fn classify_two(pieces: &[Piece]) -> PlayType {
    if pieces[0] == pieces[1] {
        PlayType::Pair
    } else {
        PlayType::Invalid
    }
}

fn classify_three(pieces: &[Piece]) -> PlayType {
    if !one_color(pieces) {
        PlayType::Invalid
    } else if all_soldiers(pieces) {
        PlayType::ThreeOfAKind
    } else if straight_kinds(pieces) && covers_straight(pieces) {
        PlayType::Straight
    } else {
        PlayType::Invalid
    }
}

fn classify_four(pieces: &[Piece]) -> PlayType {
    if !one_color(pieces) {
        PlayType::Invalid
    } else if all_soldiers(pieces) {
        PlayType::FourOfAKind
    } else if straight_kinds(pieces) && covers_straight(pieces) {
        PlayType::ExtendedStraight
    } else {
        PlayType::Invalid
    }
}

fn classify_five(pieces: &[Piece]) -> PlayType {
    if !one_color(pieces) {
        PlayType::Invalid
    } else if all_soldiers(pieces) {
        PlayType::FiveOfAKind
    } else if straight_kinds(pieces) && covers_straight(pieces) {
        PlayType::ExtendedStraightFive
    } else {
        PlayType::Invalid
    }
}

fn classify_six(pieces: &[Piece]) -> PlayType {
    let double_straight = one_color(pieces)
        && straight_kinds(pieces)
        && [PieceKind::Chariot, PieceKind::Horse, PieceKind::Cannon]
            .iter()
            .all(|kind| pieces.iter().filter(|p| p.kind == *kind).count() == 2);
    if double_straight {
        PlayType::DoubleStraight
    } else {
        PlayType::Invalid
    }
}
