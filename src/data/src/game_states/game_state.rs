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

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::core::numerics::{PileCount, RoundNumber, Score, TurnNumber};
use crate::core::primitives::{RoomId, Seat};
use crate::events::display::DisplayType;
use crate::game_states::game_phase::GamePhase;
use crate::pieces::piece::Piece;
use crate::pieces::play_type::PlayType;
use crate::player_states::player_state::{PlayerState, Players};

/// This is the authoritative state of a single ongoing game within a room.
///
/// Mutated only by the state machine while handling one action at a time;
/// every other component observes it through dispatched events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Room this game belongs to
    pub id: RoomId,

    /// Currently active phase
    pub phase: GamePhase,

    /// 1-based round counter
    pub round_number: RoundNumber,

    /// Scoring multiplier for the current round. Starts at 1 and increments
    /// each time a redeal is accepted.
    pub redeal_multiplier: u32,

    /// 1-based turn counter within the current round
    pub turn_number: TurnNumber,

    /// Seat which opens turn 1 of the current round
    pub turn_starter: Seat,

    /// Seat currently allowed to act, if any.
    ///
    /// `None` outside the phases where a single seat is on the clock (for
    /// example while a turn-results display is pending).
    pub current_seat: Option<Seat>,

    /// Ordered plays made in the current turn
    pub turn_plays: Vec<TurnPlay>,

    /// Piece count set by the first play of the current turn. Subsequent
    /// plays must match it exactly.
    pub required_piece_count: Option<usize>,

    /// The order in which seats declare this round
    pub declaration_order: Vec<Seat>,

    /// Seats eligible to request a redeal this round
    pub weak_hand_seats: Vec<Seat>,

    /// The weak seat currently being prompted, if any
    pub current_weak_offer: Option<Seat>,

    /// Weak seats which have registered a standing redeal request this
    /// round. Cleared on every fresh deal.
    pub redeal_requests: Vec<Seat>,

    /// Sequence number of the most recently emitted event. Strictly
    /// increasing; every outbound event increments it.
    pub last_event_sequence: u64,

    /// The follow-up transition computed for a metered display event,
    /// waiting on an `advance_display` action (or the safety deadline).
    pub pending_display: Option<PendingDisplay>,

    /// Phase transition requested by the current handler, consumed by the
    /// state machine's transition loop before control returns. Always `None`
    /// between actions.
    pub queued_transition: Option<GamePhase>,

    /// State for the players within this game
    pub players: Players,

    /// Options controlling overall gameplay
    pub configuration: GameConfiguration,

    /// Random number generator to use for this game. Seeded at room
    /// creation, so a deal sequence can be replayed deterministically.
    pub rng: Xoshiro256StarStar,

    /// Pre-arranged decks consumed by upcoming deals, in push order.
    ///
    /// Empty in normal play (deals shuffle with the room generator);
    /// scripted games and tests stack the exact deals they need.
    pub stacked_decks: VecDeque<Vec<Piece>>,
}

impl GameState {
    pub fn new(id: RoomId, players: Players, configuration: GameConfiguration, seed: u64) -> Self {
        Self {
            id,
            phase: GamePhase::Preparation,
            round_number: 1,
            redeal_multiplier: 1,
            turn_number: 1,
            turn_starter: Seat::One,
            current_seat: None,
            turn_plays: vec![],
            required_piece_count: None,
            declaration_order: vec![],
            weak_hand_seats: vec![],
            current_weak_offer: None,
            redeal_requests: vec![],
            last_event_sequence: 0,
            pending_display: None,
            queued_transition: None,
            players,
            configuration,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            stacked_decks: VecDeque::new(),
        }
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        self.players.get(seat)
    }

    pub fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        self.players.get_mut(seat)
    }

    /// Sum of all declarations made so far this round.
    pub fn declaration_total(&self) -> PileCount {
        self.players.iter().filter_map(|p| p.declared).sum()
    }

    /// Number of seats which have declared this round.
    pub fn declarations_made(&self) -> usize {
        self.players.iter().filter(|p| p.declared.is_some()).count()
    }

    /// True once every seat has played out its hand for the round.
    pub fn all_hands_empty(&self) -> bool {
        self.players.iter().all(|p| p.hand_empty())
    }

    /// Claims the next event sequence number.
    pub fn next_event_sequence(&mut self) -> u64 {
        self.last_event_sequence += 1;
        self.last_event_sequence
    }
}

/// One seat's play within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlay {
    pub seat: Seat,

    /// The pieces put down, removed from the seat's hand on acceptance
    pub pieces: Vec<Piece>,

    /// Shape of the play as classified on acceptance. Only plays matching
    /// the opener's type compete for the turn.
    pub play_type: PlayType,
}

/// The transition which will be applied when a pending display advances.
///
/// Computed eagerly when the metered event is emitted; the engine never
/// sleeps while a client paces its visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAdvance {
    /// Start the next turn of the current round with this opener.
    NextTurn { starter: Seat },

    /// All hands are empty; move to Scoring.
    EnterScoring,

    /// Scores applied, nobody at threshold; deal the next round.
    NextRound,

    /// Scores applied and this seat reached the winning threshold.
    EndGame { winner: Seat },
}

/// A metered display currently pacing the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDisplay {
    /// Which visual clients are showing
    pub display_type: DisplayType,

    /// The already-computed follow-up transition
    pub advance: PendingAdvance,
}

/// Options controlling overall gameplay
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfiguration {
    /// A game ends at the close of any round where a seat reaches this
    /// cumulative score.
    pub winning_score_threshold: Score,

    /// Suggested client display duration for turn results
    pub turn_results_display_seconds: f64,

    /// Suggested client display duration for round scoring
    pub scoring_display_seconds: f64,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        Self {
            winning_score_threshold: 50,
            turn_results_display_seconds: 5.0,
            scoring_display_seconds: 8.0,
        }
    }
}
