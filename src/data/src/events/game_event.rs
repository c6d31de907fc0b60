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

use enumset::EnumSetType;
use serde::{Deserialize, Serialize};

use crate::core::numerics::{PileCount, RoundNumber, Score, TurnNumber};
use crate::core::primitives::{ActionId, PlayerId, RoomId, Seat, SeatMap};
use crate::events::display::DisplayMetadata;
use crate::game_states::game_phase::GamePhase;
use crate::game_states::game_state::TurnPlay;
use crate::pieces::piece::Piece;
use crate::pieces::play_type::PlayType;

/// An internally originated, ordered notification of state change.
///
/// Everything clients learn about a game arrives as one of these, wrapped in
/// an [EventEnvelope].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "data")]
pub enum GameEvent {
    /// The state machine moved between phases.
    PhaseChanged { from: GamePhase, to: GamePhase },

    /// The host started the game.
    GameStarted { seats: SeatMap<SeatSummary> },

    /// Hands were dealt (or re-dealt) for the current round.
    HandsDealt { hands: SeatMap<Vec<Piece>>, weak_hand_seats: Vec<Seat> },

    /// A weak seat is being prompted for a redeal decision.
    RedealOffered { seat: Seat },

    /// A weak seat registered a standing redeal request.
    RedealRequested { seat: Seat },

    /// The prompted seat accepted or declined its offer.
    RedealDecision { seat: Seat, accepted: bool },

    /// A seat declared its target pile count.
    Declared { seat: Seat, value: PileCount },

    /// A seat's play was accepted.
    Played { seat: Seat, pieces: Vec<Piece>, play_type: PlayType, required_count: usize },

    /// All four seats have played; the turn has a winner.
    TurnResolved { turn_number: TurnNumber, winner: Seat, piles_won: PileCount, plays: Vec<TurnPlay> },

    /// Round deltas were applied to cumulative scores.
    ScoringApplied {
        round_number: RoundNumber,
        redeal_multiplier: u32,
        deltas: SeatMap<Score>,
        totals: SeatMap<Score>,
    },

    /// A seat reached the winning threshold. Terminal.
    GameEnded { winner: Seat, totals: SeatMap<Score> },

    /// An action was refused. Delivered to the origin seat only.
    ActionRejected { action_id: ActionId, seat: Option<Seat>, reason: RejectReason },

    /// An internal invariant failed while handling an action; the action was
    /// rolled back and the room remains in its prior phase.
    InternalError { message: String },

    /// A human left; their seat plays on as a bot.
    PlayerLeft { seat: Seat, replaced_by_bot: bool },

    /// The host replaced a seat with a bot.
    SeatReplaced { seat: Seat, bot_name: String },

    /// The room is shutting down.
    RoomClosed { reason: String },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::PhaseChanged { .. } => EventKind::PhaseChanged,
            GameEvent::GameStarted { .. } => EventKind::GameStarted,
            GameEvent::HandsDealt { .. } => EventKind::HandsDealt,
            GameEvent::RedealOffered { .. } => EventKind::RedealOffered,
            GameEvent::RedealRequested { .. } => EventKind::RedealRequested,
            GameEvent::RedealDecision { .. } => EventKind::RedealDecision,
            GameEvent::Declared { .. } => EventKind::Declared,
            GameEvent::Played { .. } => EventKind::Played,
            GameEvent::TurnResolved { .. } => EventKind::TurnResolved,
            GameEvent::ScoringApplied { .. } => EventKind::ScoringApplied,
            GameEvent::GameEnded { .. } => EventKind::GameEnded,
            GameEvent::ActionRejected { .. } => EventKind::ActionRejected,
            GameEvent::InternalError { .. } => EventKind::InternalError,
            GameEvent::PlayerLeft { .. } => EventKind::PlayerLeft,
            GameEvent::SeatReplaced { .. } => EventKind::SeatReplaced,
            GameEvent::RoomClosed { .. } => EventKind::RoomClosed,
        }
    }
}

/// Payload-free tags for [GameEvent] variants, usable in subscription masks.
#[derive(Debug, Hash, Ord, PartialOrd, Serialize, Deserialize, EnumSetType)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PhaseChanged,
    GameStarted,
    HandsDealt,
    RedealOffered,
    RedealRequested,
    RedealDecision,
    Declared,
    Played,
    TurnResolved,
    ScoringApplied,
    GameEnded,
    ActionRejected,
    InternalError,
    PlayerLeft,
    SeatReplaced,
    RoomClosed,
}

/// Identity snapshot of one seat, included in `GameStarted`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatSummary {
    pub player_id: Option<PlayerId>,
    pub display_name: String,
    pub is_bot: bool,
}

/// Who should receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAudience {
    /// Every connection bound to the room.
    Room,

    /// Connections bound to this seat only (e.g. `ActionRejected`).
    SeatOnly(Seat),
}

/// The authoritative wrapper around every outbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Room-monotonic sequence number; strictly increasing with no gaps
    pub sequence: u64,

    /// Phase the room is in after the change this event describes
    pub phase: GamePhase,

    pub room_id: RoomId,

    pub payload: GameEvent,

    /// Pacing hints for metered events, absent otherwise
    pub display: Option<DisplayMetadata>,

    /// The player action this event resulted from, if any
    pub causing_action: Option<ActionId>,

    /// Milliseconds since the Unix epoch at emission
    pub timestamp_ms: u64,

    /// Delivery scope. Defaults to the whole room.
    pub audience: EventAudience,
}

impl EventEnvelope {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// True for events which must survive transient connection loss.
    pub fn is_critical(&self) -> bool {
        self.kind() == EventKind::PhaseChanged
    }
}

/// Reason codes attached to `ActionRejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The action is not accepted in the current phase.
    WrongPhase,

    /// Another seat is on the clock.
    NotYourTurn,

    /// Declaration would make the round total equal the hand size.
    WouldSumToHandSize,

    /// Declaration outside `[0, hand_size]`.
    ValueOutOfRange,

    /// Third consecutive zero declaration.
    MustDeclareNonZero,

    /// Play size does not match the count set by the turn opener.
    PieceCountMismatch,

    /// A played piece is not in the acting seat's hand.
    PiecesNotInHand,

    /// The opening play of a turn does not form a recognized shape.
    InvalidPlay,

    /// Duplicate or out-of-range hand indices.
    InvalidPieceIndices,

    /// The acting seat does not hold a weak hand.
    NotWeakHand,

    /// No offer is currently presented to the acting seat.
    NoPendingOffer,

    /// No metered display is currently pacing the room.
    NoPendingDisplay,

    /// The advance names a different display than the pending one.
    DisplayMismatch,

    /// Only the host may take this action.
    NotHost,

    /// The host seat cannot be bot-replaced.
    CannotReplaceHost,

    /// The game has already started.
    GameAlreadyStarted,

    /// The game has not started yet.
    GameNotStarted,

    /// The queue is over its soft cap.
    QueueFull,

    /// The room is closed; no further actions are accepted.
    RoomClosed,

    /// The same action id was already handled.
    DuplicateAction,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::WrongPhase => write!(f, "action not valid in this phase"),
            RejectReason::NotYourTurn => write!(f, "not this seat's turn"),
            RejectReason::WouldSumToHandSize => write!(f, "would sum to hand_size"),
            RejectReason::ValueOutOfRange => write!(f, "declaration out of range"),
            RejectReason::MustDeclareNonZero => {
                write!(f, "must declare at least 1 after two zero rounds")
            }
            RejectReason::PieceCountMismatch => write!(f, "piece_count_mismatch"),
            RejectReason::PiecesNotInHand => write!(f, "pieces not in hand"),
            RejectReason::InvalidPlay => write!(f, "pieces do not form a playable shape"),
            RejectReason::InvalidPieceIndices => write!(f, "invalid piece indices"),
            RejectReason::NotWeakHand => write!(f, "hand is not weak"),
            RejectReason::NoPendingOffer => write!(f, "no redeal offer pending for this seat"),
            RejectReason::NoPendingDisplay => write!(f, "no display pending"),
            RejectReason::DisplayMismatch => write!(f, "advance names the wrong display"),
            RejectReason::NotHost => write!(f, "only the host may do this"),
            RejectReason::CannotReplaceHost => write!(f, "cannot replace the host seat"),
            RejectReason::GameAlreadyStarted => write!(f, "game already started"),
            RejectReason::GameNotStarted => write!(f, "game not started"),
            RejectReason::QueueFull => write!(f, "action queue is full"),
            RejectReason::RoomClosed => write!(f, "room is closed"),
            RejectReason::DuplicateAction => write!(f, "duplicate action"),
        }
    }
}
