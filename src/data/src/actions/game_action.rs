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

use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

use crate::core::numerics::PileCount;
use crate::core::primitives::{ActionId, Seat};
use crate::events::display::DisplayType;

/// An externally originated intent to mutate game state.
///
/// The transport layer decodes free-form client payloads into these tagged
/// variants before anything reaches the action queue; the core never sees
/// undecoded input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "payload")]
pub enum GameAction {
    /// Begin the game. Legal only before the first deal, from the host.
    StartGame,

    /// Declare a target pile count for the round.
    Declare { value: PileCount },

    /// Play the pieces at these positions of the acting seat's hand.
    ///
    /// Indices refer to the hand as it stands when the action is handled;
    /// accepted pieces are removed atomically with acceptance.
    PlayPieces { piece_indices: Vec<usize> },

    /// Register a standing redeal request for a weak hand.
    RequestRedeal,

    /// Accept the redeal offer currently presented to this seat.
    AcceptRedeal,

    /// Decline the redeal offer currently presented to this seat.
    DeclineRedeal,

    /// Apply the transition waiting behind a metered display.
    ///
    /// Sent by a client when its display timer elapses or the user skips;
    /// sent by the engine itself when the safety deadline fires.
    AdvanceDisplay { of: DisplayType },

    /// Leave the room. The seat is handed to a bot mid-game.
    Leave,

    /// Replace the (non-host) player at `seat` with a bot.
    HostReplaceSeat { seat: Seat },
}

impl GameAction {
    /// Critical actions are never dropped for backpressure.
    pub fn is_critical(&self) -> bool {
        matches!(self, GameAction::Leave | GameAction::HostReplaceSeat { .. })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            GameAction::StartGame => ActionKind::StartGame,
            GameAction::Declare { .. } => ActionKind::Declare,
            GameAction::PlayPieces { .. } => ActionKind::PlayPieces,
            GameAction::RequestRedeal => ActionKind::RequestRedeal,
            GameAction::AcceptRedeal => ActionKind::AcceptRedeal,
            GameAction::DeclineRedeal => ActionKind::DeclineRedeal,
            GameAction::AdvanceDisplay { .. } => ActionKind::AdvanceDisplay,
            GameAction::Leave => ActionKind::Leave,
            GameAction::HostReplaceSeat { .. } => ActionKind::HostReplaceSeat,
        }
    }
}

/// Payload-free tags for [GameAction] variants, usable in per-phase
/// allow-lists.
#[derive(Debug, Hash, Ord, PartialOrd, Serialize, Deserialize, EnumSetType)]
pub enum ActionKind {
    StartGame,
    Declare,
    PlayPieces,
    RequestRedeal,
    AcceptRedeal,
    DeclineRedeal,
    AdvanceDisplay,
    Leave,
    HostReplaceSeat,
}

/// Where an action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOrigin {
    /// A player action submitted over a connection bound to this seat, or a
    /// bot decision for it.
    Seat(Seat),

    /// An engine-originated action, e.g. a display safety advance.
    System,
}

impl ActionOrigin {
    pub fn seat(&self) -> Option<Seat> {
        match self {
            ActionOrigin::Seat(seat) => Some(*seat),
            ActionOrigin::System => None,
        }
    }
}

/// An action as it travels through the queue: the intent plus the identity
/// and ordering metadata stamped at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    /// Producer-assigned id, used for duplicate detection
    pub action_id: ActionId,

    /// Originating seat, or the engine itself
    pub origin: ActionOrigin,

    /// The decoded intent
    pub action: GameAction,

    /// Queue-assigned arrival stamp; ties between producers are broken by
    /// this value
    pub arrival_sequence: u64,
}
