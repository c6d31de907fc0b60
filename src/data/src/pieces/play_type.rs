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

use serde::{Deserialize, Serialize};

/// Shape of a set of pieces put down together in one play.
///
/// The opener of a turn establishes a play type; later plays compete for the
/// turn only when they produce the same type. Classification logic lives in
/// the rules crate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PlayType {
    /// One piece.
    Single,

    /// Two pieces of the same kind and color.
    Pair,

    /// Three soldiers of one color.
    ThreeOfAKind,

    /// Chariot, horse and cannon of one color.
    Straight,

    /// Four soldiers of one color.
    FourOfAKind,

    /// Four pieces from {chariot, horse, cannon} of one color, covering all
    /// three kinds.
    ExtendedStraight,

    /// Five soldiers of one color.
    FiveOfAKind,

    /// Five pieces from {chariot, horse, cannon} of one color, covering all
    /// three kinds.
    ExtendedStraightFive,

    /// Both chariots, both horses and both cannons of one color.
    DoubleStraight,

    /// Any other combination. Playable when forced, but can never win a
    /// turn.
    Invalid,
}

impl PlayType {
    /// Whether a play of this type is eligible to win a turn.
    pub fn is_valid(&self) -> bool {
        !matches!(self, PlayType::Invalid)
    }
}

impl Display for PlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayType::Single => write!(f, "single"),
            PlayType::Pair => write!(f, "pair"),
            PlayType::ThreeOfAKind => write!(f, "three of a kind"),
            PlayType::Straight => write!(f, "straight"),
            PlayType::FourOfAKind => write!(f, "four of a kind"),
            PlayType::ExtendedStraight => write!(f, "extended straight"),
            PlayType::FiveOfAKind => write!(f, "five of a kind"),
            PlayType::ExtendedStraightFive => write!(f, "extended straight of five"),
            PlayType::DoubleStraight => write!(f, "double straight"),
            PlayType::Invalid => write!(f, "invalid"),
        }
    }
}
