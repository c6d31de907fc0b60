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

use data::actions::game_action::{ActionKind, ActionOrigin, GameAction};
use data::core::numerics::{PileCount, MAX_PLAY_SIZE};
use data::core::primitives::Seat;
use data::events::display::{DisplayMetadata, DisplayType};
use data::events::game_event::{GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use data::game_states::game_state::{GameState, PendingAdvance, PendingDisplay, TurnPlay};
use enumset::{enum_set, EnumSet};
use tracing::debug;
use utils::outcome::{Outcome, Value};
use utils::{fail, outcome, verify};

use crate::engine::emit::EventSink;
use crate::phases::{PhaseBehavior, PhaseUpdate};
use crate::plays::classify;
use crate::plays::ranking;

/// Runs turns until all hands are played out.
///
/// The opener of a turn sets `required_piece_count`; every later seat plays
/// exactly that many pieces, falling back to its entire hand when fewer
/// remain. Resolution awards piles to the strongest matching play and paces
/// the room through a `turn_results` display before the next turn opens.
pub struct TurnPhase;

impl PhaseBehavior for TurnPhase {
    fn allowed_actions(&self, game: &GameState) -> EnumSet<ActionKind> {
        if game.pending_display.is_some() {
            enum_set!(ActionKind::AdvanceDisplay | ActionKind::Leave)
        } else {
            enum_set!(ActionKind::PlayPieces | ActionKind::Leave)
        }
    }

    fn on_enter(&self, game: &mut GameState, _events: &mut EventSink) -> Outcome {
        // Entering from Declaration: the round's starter opens turn 1. On
        // Turn → Turn re-entry the advance handler has already seated the
        // previous winner.
        if game.current_seat.is_none() {
            game.current_seat = Some(game.turn_starter);
        }
        game.turn_plays.clear();
        game.required_piece_count = None;
        outcome::OK
    }

    fn handle(
        &self,
        game: &mut GameState,
        origin: ActionOrigin,
        action: &GameAction,
        events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        match action {
            GameAction::PlayPieces { piece_indices } => {
                self.handle_play(game, origin, piece_indices, events)
            }
            GameAction::AdvanceDisplay { of } => advance_display(game, *of),
            _ => Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase)),
        }
    }

    fn on_exit(&self, game: &mut GameState, _events: &mut EventSink) -> Outcome {
        game.turn_plays.clear();
        outcome::OK
    }
}

impl TurnPhase {
    fn handle_play(
        &self,
        game: &mut GameState,
        origin: ActionOrigin,
        piece_indices: &[usize],
        events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        let Some(seat) = origin.seat() else {
            return Ok(PhaseUpdate::Rejected(RejectReason::NotYourTurn));
        };
        if game.current_seat != Some(seat) {
            return Ok(PhaseUpdate::Rejected(RejectReason::NotYourTurn));
        }

        let hand_len = game.player(seat).hand.len();
        let mut sorted = piece_indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != piece_indices.len() || sorted.iter().any(|&i| i >= hand_len) {
            return Ok(PhaseUpdate::Rejected(RejectReason::InvalidPieceIndices));
        }

        let count = sorted.len();
        let pieces: Vec<_> = sorted.iter().map(|&i| game.player(seat).hand[i]).collect();
        match game.required_piece_count {
            None => {
                if count == 0 || count > MAX_PLAY_SIZE {
                    return Ok(PhaseUpdate::Rejected(RejectReason::PieceCountMismatch));
                }
                if !classify::classify_play(&pieces).is_valid() {
                    return Ok(PhaseUpdate::Rejected(RejectReason::InvalidPlay));
                }
            }
            Some(required) => {
                // Forced degenerate play: a short hand goes down in full.
                if count != required.min(hand_len) {
                    return Ok(PhaseUpdate::Rejected(RejectReason::PieceCountMismatch));
                }
            }
        }

        // Validation is done; remove the pieces atomically with acceptance.
        let hand = &mut game.player_mut(seat).hand;
        for &index in sorted.iter().rev() {
            hand.remove(index);
        }

        let play_type = classify::classify_play(&pieces);
        if game.required_piece_count.is_none() {
            game.required_piece_count = Some(count);
        }
        let required = game.required_piece_count.unwrap_or(count);
        game.turn_plays.push(TurnPlay { seat, pieces: pieces.clone(), play_type });
        events.push(GameEvent::Played { seat, pieces, play_type, required_count: required });

        match next_actor(game) {
            Some(next) => {
                game.current_seat = Some(next);
                Ok(PhaseUpdate::Applied)
            }
            None => {
                self.resolve_turn(game, events)?;
                Ok(PhaseUpdate::Applied)
            }
        }
    }

    /// All seats able to play have played; pick the winner, award piles and
    /// pace the room through the turn-results display.
    fn resolve_turn(&self, game: &mut GameState, events: &mut EventSink) -> Outcome {
        verify!(!game.turn_plays.is_empty(), "resolving a turn with no plays");
        let winner = ranking::rank_plays(&game.turn_plays);
        let piles = game.required_piece_count.unwrap_or(1) as PileCount;
        game.player_mut(winner).captured_piles += piles;
        debug!(%winner, piles, turn = game.turn_number, "Turn resolved");

        let (advance, next_phase) = if game.all_hands_empty() {
            (PendingAdvance::EnterScoring, GamePhase::Scoring)
        } else {
            (PendingAdvance::NextTurn { starter: next_starter(game, winner) }, GamePhase::Turn)
        };
        game.pending_display =
            Some(PendingDisplay { display_type: DisplayType::TurnResults, advance });
        game.current_seat = None;

        events.push_with_display(
            GameEvent::TurnResolved {
                turn_number: game.turn_number,
                winner,
                piles_won: piles,
                plays: game.turn_plays.clone(),
            },
            DisplayMetadata {
                display_type: DisplayType::TurnResults,
                show_for_seconds: game.configuration.turn_results_display_seconds,
                auto_advance: true,
                can_skip: true,
                next_phase,
            },
        );
        outcome::OK
    }
}

/// Applies the transition waiting behind the turn-results display.
fn advance_display(game: &mut GameState, of: DisplayType) -> Value<PhaseUpdate> {
    let Some(pending) = game.pending_display else {
        return Ok(PhaseUpdate::Rejected(RejectReason::NoPendingDisplay));
    };
    if of != pending.display_type {
        return Ok(PhaseUpdate::Rejected(RejectReason::DisplayMismatch));
    }
    match pending.advance {
        PendingAdvance::NextTurn { starter } => {
            game.turn_number += 1;
            game.turn_plays.clear();
            game.required_piece_count = None;
            game.current_seat = Some(starter);
            game.pending_display = None;
            game.queued_transition = Some(GamePhase::Turn);
        }
        PendingAdvance::EnterScoring => {
            game.pending_display = None;
            game.current_seat = None;
            game.queued_transition = Some(GamePhase::Scoring);
        }
        _ => fail!("turn display resolved to a scoring advance"),
    }
    Ok(PhaseUpdate::Applied)
}

/// The next seat to put pieces down this turn, if any seat with a non-empty
/// hand has yet to play.
fn next_actor(game: &GameState) -> Option<Seat> {
    let opener = game.turn_plays.first()?.seat;
    opener.in_order_from().find(|&seat| {
        !game.turn_plays.iter().any(|play| play.seat == seat)
            && !game.player(seat).hand_empty()
    })
}

/// The winner opens the next turn; when its hand is already empty, the next
/// seat in table order holding pieces opens instead.
fn next_starter(game: &GameState, winner: Seat) -> Seat {
    winner
        .in_order_from()
        .find(|&seat| !game.player(seat).hand_empty())
        .unwrap_or(winner)
}
