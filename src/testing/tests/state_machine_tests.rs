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

use data::actions::game_action::GameAction;
use data::core::primitives::{ActionId, Seat};
use data::events::display::DisplayType;
use data::events::game_event::{EventAudience, EventKind, GameEvent, RejectReason};
use data::game_states::game_phase::GamePhase;
use rules::engine::state_machine::{DispatchStatus, StateMachine};
use testing::test_games;
use testing::test_games::{deck_from_hands, submit, submit_with_id};

fn kinds(events: &[data::events::game_event::EventEnvelope]) -> Vec<EventKind> {
    events.iter().map(|event| event.kind()).collect()
}

#[test]
fn no_weak_hands_skips_straight_to_declaration() {
    let mut game = test_games::new_game(7);
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_everywhere_hands()));
    let mut machine = StateMachine::new(game);

    let result = machine.start(None);
    assert_eq!(result.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().phase, GamePhase::Declaration);

    // The transition happens within the same action handling as the start,
    // with no redeal prompts in between.
    let kinds = kinds(&result.events);
    assert!(kinds.contains(&EventKind::PhaseChanged));
    assert!(!kinds.contains(&EventKind::RedealOffered));
    let change = result
        .events
        .iter()
        .find(|event| event.kind() == EventKind::PhaseChanged)
        .expect("phase change");
    assert_eq!(
        change.payload,
        GameEvent::PhaseChanged { from: GamePhase::Preparation, to: GamePhase::Declaration }
    );
}

#[test]
fn accepted_redeal_increments_multiplier_and_redeals() {
    let mut game = test_games::new_game(11);
    game.turn_starter = Seat::Four;
    // First deal: every seat except Two is weak. Second deal: nobody is.
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_at_seat_two_hands()));
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_everywhere_hands()));
    let mut machine = StateMachine::new(game);

    let started = machine.start(None);
    assert_eq!(machine.game().weak_hand_seats, vec![Seat::Four, Seat::One, Seat::Three]);
    assert_eq!(machine.game().current_weak_offer, Some(Seat::Four));
    assert!(kinds(&started.events).contains(&EventKind::RedealOffered));

    // Seat Three registers its request while the offer is elsewhere.
    let result = submit(&mut machine, Seat::Three, GameAction::RequestRedeal);
    assert_eq!(result.status, DispatchStatus::Accepted);

    let result = submit(&mut machine, Seat::Four, GameAction::DeclineRedeal);
    assert_eq!(result.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().current_weak_offer, Some(Seat::One));

    let result = submit(&mut machine, Seat::One, GameAction::DeclineRedeal);
    assert_eq!(result.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().current_weak_offer, Some(Seat::Three));

    // Seat Three accepts its own offer: multiplier bumps, Preparation
    // re-enters, and the strong second deal flows on to Declaration.
    let result = submit(&mut machine, Seat::Three, GameAction::AcceptRedeal);
    assert_eq!(result.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().redeal_multiplier, 2);
    assert_eq!(machine.game().phase, GamePhase::Declaration);

    let kinds = kinds(&result.events);
    assert_eq!(
        kinds,
        vec![
            EventKind::RedealDecision,
            EventKind::PhaseChanged,
            EventKind::HandsDealt,
            EventKind::PhaseChanged,
        ]
    );
}

#[test]
fn last_declarer_may_not_sum_to_hand_size() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut machine = StateMachine::new(test_games::game_in_declaration(hands));

    assert_eq!(submit(&mut machine, Seat::One, GameAction::Declare { value: 3 }).status, DispatchStatus::Accepted);
    assert_eq!(submit(&mut machine, Seat::Two, GameAction::Declare { value: 2 }).status, DispatchStatus::Accepted);
    assert_eq!(submit(&mut machine, Seat::Three, GameAction::Declare { value: 2 }).status, DispatchStatus::Accepted);

    // 3 + 2 + 2 + 1 would equal the hand size.
    let rejected = submit(&mut machine, Seat::Four, GameAction::Declare { value: 1 });
    assert_eq!(rejected.status, DispatchStatus::Rejected(RejectReason::WouldSumToHandSize));
    assert_eq!(rejected.events.len(), 1);
    assert_eq!(rejected.events[0].audience, EventAudience::SeatOnly(Seat::Four));
    assert_eq!(machine.game().phase, GamePhase::Declaration);

    let accepted = submit(&mut machine, Seat::Four, GameAction::Declare { value: 0 });
    assert_eq!(accepted.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().phase, GamePhase::Turn);
    assert_eq!(machine.game().current_seat, Some(Seat::One));
    assert_ne!(machine.game().declaration_total(), 8);
}

#[test]
fn zero_streak_forces_nonzero_declaration() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut game = test_games::game_in_declaration(hands);
    game.player_mut(Seat::One).zero_declare_streak = 2;
    let mut machine = StateMachine::new(game);

    let rejected = submit(&mut machine, Seat::One, GameAction::Declare { value: 0 });
    assert_eq!(rejected.status, DispatchStatus::Rejected(RejectReason::MustDeclareNonZero));

    let accepted = submit(&mut machine, Seat::One, GameAction::Declare { value: 1 });
    assert_eq!(accepted.status, DispatchStatus::Accepted);
}

#[test]
fn follower_must_match_required_piece_count() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut machine = StateMachine::new(test_games::game_in_turn(hands, [2, 2, 2, 1]));

    // Seat One opens with the red advisor pair.
    let opened = submit(&mut machine, Seat::One, GameAction::PlayPieces { piece_indices: vec![1, 2] });
    assert_eq!(opened.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().required_piece_count, Some(2));
    assert_eq!(machine.game().current_seat, Some(Seat::Two));

    // Seat Two tries a triple.
    let mismatched =
        submit(&mut machine, Seat::Two, GameAction::PlayPieces { piece_indices: vec![0, 1, 2] });
    assert_eq!(mismatched.status, DispatchStatus::Rejected(RejectReason::PieceCountMismatch));
    assert_eq!(machine.game().current_seat, Some(Seat::Two));
    assert_eq!(machine.game().turn_plays.len(), 1);

    let matched =
        submit(&mut machine, Seat::Two, GameAction::PlayPieces { piece_indices: vec![1, 2] });
    assert_eq!(matched.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().current_seat, Some(Seat::Three));
}

#[test]
fn played_pieces_leave_the_hand_atomically() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let expected = vec![hands[0][1], hands[0][2]];
    let mut machine = StateMachine::new(test_games::game_in_turn(hands, [2, 2, 2, 1]));

    let result = submit(&mut machine, Seat::One, GameAction::PlayPieces { piece_indices: vec![1, 2] });
    assert_eq!(result.status, DispatchStatus::Accepted);

    let hand = &machine.game().player(Seat::One).hand;
    assert_eq!(hand.len(), 6);
    for piece in &expected {
        assert!(!hand.contains(piece));
    }
    match &result.events[0].payload {
        GameEvent::Played { pieces, .. } => assert_eq!(pieces, &expected),
        other => panic!("expected Played, got {other:?}"),
    }
}

#[test]
fn resolved_turn_awards_piles_and_paces_through_display() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut machine = StateMachine::new(test_games::game_in_turn(hands, [2, 2, 2, 1]));

    // One: red advisor pair. Two: red cannon pair. Three and Four: black
    // filler pairs from their canonical hands.
    assert_eq!(submit(&mut machine, Seat::One, GameAction::PlayPieces { piece_indices: vec![1, 2] }).status, DispatchStatus::Accepted);
    assert_eq!(submit(&mut machine, Seat::Two, GameAction::PlayPieces { piece_indices: vec![1, 2] }).status, DispatchStatus::Accepted);
    assert_eq!(submit(&mut machine, Seat::Three, GameAction::PlayPieces { piece_indices: vec![1, 2] }).status, DispatchStatus::Accepted);
    let resolved =
        submit(&mut machine, Seat::Four, GameAction::PlayPieces { piece_indices: vec![1, 2] });
    assert_eq!(resolved.status, DispatchStatus::Accepted);

    // Advisors outrank every other pair on the table.
    let event = resolved
        .events
        .iter()
        .find(|event| event.kind() == EventKind::TurnResolved)
        .expect("turn resolved");
    match &event.payload {
        GameEvent::TurnResolved { winner, piles_won, plays, .. } => {
            assert_eq!(*winner, Seat::One);
            assert_eq!(*piles_won, 2);
            assert_eq!(plays.len(), 4);
        }
        other => panic!("expected TurnResolved, got {other:?}"),
    }
    let display = event.display.expect("display metadata");
    assert_eq!(display.display_type, DisplayType::TurnResults);
    assert!(display.auto_advance);
    assert!(display.can_skip);
    assert_eq!(display.next_phase, GamePhase::Turn);
    assert_eq!(machine.game().player(Seat::One).captured_piles, 2);
    assert_eq!(machine.game().current_seat, None);

    // Nobody can play while the display is pending.
    let blocked = submit(&mut machine, Seat::One, GameAction::PlayPieces { piece_indices: vec![0] });
    assert_eq!(blocked.status, DispatchStatus::Rejected(RejectReason::WrongPhase));

    // Advancing opens the next turn with the winner on the clock.
    let advanced = submit(
        &mut machine,
        Seat::Two,
        GameAction::AdvanceDisplay { of: DisplayType::TurnResults },
    );
    assert_eq!(advanced.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().turn_number, 2);
    assert_eq!(machine.game().current_seat, Some(Seat::One));
    assert_eq!(machine.game().required_piece_count, None);
    assert!(machine.game().turn_plays.is_empty());
    assert!(advanced
        .events
        .iter()
        .any(|event| event.payload
            == GameEvent::PhaseChanged { from: GamePhase::Turn, to: GamePhase::Turn }));
}

#[test]
fn duplicate_action_id_is_idempotent() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut machine = StateMachine::new(test_games::game_in_declaration(hands));

    let id = ActionId::generate();
    let first = submit_with_id(&mut machine, id, Seat::One, GameAction::Declare { value: 3 });
    assert_eq!(first.status, DispatchStatus::Accepted);
    assert_eq!(machine.game().player(Seat::One).declared, Some(3));
    let sequence_after_first = machine.game().last_event_sequence;

    // Same id again, even with a different payload: no mutation, no events.
    let replay = submit_with_id(&mut machine, id, Seat::One, GameAction::Declare { value: 5 });
    assert_eq!(replay.status, DispatchStatus::Duplicate);
    assert!(replay.events.is_empty());
    assert_eq!(machine.game().player(Seat::One).declared, Some(3));
    assert_eq!(machine.game().last_event_sequence, sequence_after_first);
    assert_eq!(machine.game().current_seat, Some(Seat::Two));

    // A duplicate of a rejected action replays the rejection.
    let bad = ActionId::generate();
    let rejected =
        submit_with_id(&mut machine, bad, Seat::One, GameAction::Declare { value: 4 });
    assert_eq!(rejected.status, DispatchStatus::Rejected(RejectReason::NotYourTurn));
    let replayed = submit_with_id(&mut machine, bad, Seat::One, GameAction::Declare { value: 4 });
    assert_eq!(replayed.status, DispatchStatus::Duplicate);
    assert_eq!(replayed.events.len(), 1);
    match &replayed.events[0].payload {
        GameEvent::ActionRejected { reason, .. } => {
            assert_eq!(*reason, RejectReason::NotYourTurn)
        }
        other => panic!("expected ActionRejected, got {other:?}"),
    }
}

#[test]
fn event_sequences_increase_strictly_across_actions() {
    let mut game = test_games::new_game(3);
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_everywhere_hands()));
    let mut machine = StateMachine::new(game);

    let mut sequences: Vec<u64> = vec![];
    sequences.extend(machine.start(None).events.iter().map(|event| event.sequence));
    for (seat, value) in [(Seat::One, 2), (Seat::Two, 2), (Seat::Three, 2), (Seat::Four, 1)] {
        let result = submit(&mut machine, seat, GameAction::Declare { value });
        sequences.extend(result.events.iter().map(|event| event.sequence));
    }

    assert!(!sequences.is_empty());
    for pair in sequences.windows(2) {
        assert!(pair[1] > pair[0], "sequence regressed: {pair:?}");
    }
    assert_eq!(*sequences.last().expect("events"), machine.game().last_event_sequence);
}

#[test]
fn full_round_reaches_scoring_and_next_round() {
    let mut game = test_games::new_game(99);
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_everywhere_hands()));
    let mut machine = StateMachine::new(game);
    machine.start(None);
    assert_eq!(machine.game().phase, GamePhase::Declaration);

    let mut scoring_seen = false;
    // Drive with the deterministic fallback until the round closes.
    for _ in 0..200 {
        let game = machine.game();
        if let Some(pending) = game.pending_display {
            if pending.display_type == DisplayType::ScoringDisplay {
                scoring_seen = true;
            }
            let result = submit(
                &mut machine,
                Seat::One,
                GameAction::AdvanceDisplay { of: pending.display_type },
            );
            assert_eq!(result.status, DispatchStatus::Accepted);
        } else if let Some(seat) = game.current_seat {
            let action = ai::core::fallback::safe_action(game, seat).expect("legal action");
            let result = submit(&mut machine, seat, action);
            assert_eq!(result.status, DispatchStatus::Accepted);
        } else {
            panic!("nobody to act and no display pending");
        }
        if machine.game().round_number == 2 {
            break;
        }
    }

    assert!(scoring_seen, "round never reached scoring");
    let game = machine.game();
    assert_eq!(game.round_number, 2);
    assert_eq!(game.redeal_multiplier, 1);
    assert_eq!(game.turn_starter, Seat::Two);
    // Everyone declared zero this round, so every streak advanced.
    for seat in [Seat::One, Seat::Two, Seat::Three, Seat::Four] {
        assert_eq!(game.player(seat).zero_declare_streak, 1);
    }
}

#[test]
fn game_ends_at_threshold() {
    let mut game = test_games::new_game(42);
    game.configuration.winning_score_threshold = -1000;
    game.stacked_decks.push_back(deck_from_hands(test_games::strong_everywhere_hands()));
    let mut machine = StateMachine::new(game);
    machine.start(None);

    let mut ended = false;
    for _ in 0..200 {
        let game = machine.game();
        if game.phase == GamePhase::GameEnd {
            ended = true;
            break;
        }
        if let Some(pending) = game.pending_display {
            let result = submit(
                &mut machine,
                Seat::One,
                GameAction::AdvanceDisplay { of: pending.display_type },
            );
            assert_eq!(result.status, DispatchStatus::Accepted);
            if result.events.iter().any(|event| event.kind() == EventKind::GameEnded) {
                ended = true;
                break;
            }
        } else if let Some(seat) = game.current_seat {
            let action = ai::core::fallback::safe_action(game, seat).expect("legal action");
            submit(&mut machine, seat, action);
        } else {
            panic!("nobody to act and no display pending");
        }
    }

    assert!(ended, "game never reached GameEnd");
    assert_eq!(machine.game().phase, GamePhase::GameEnd);

    // Terminal: everything is refused now.
    let refused = submit(&mut machine, Seat::One, GameAction::Declare { value: 1 });
    assert_eq!(refused.status, DispatchStatus::Rejected(RejectReason::WrongPhase));
}

#[test]
fn outbound_envelope_serde_round_trip() {
    let deck = data::pieces::deck::build();
    let hands =
        [deck[0..8].to_vec(), deck[8..16].to_vec(), deck[16..24].to_vec(), deck[24..32].to_vec()];
    let mut machine = StateMachine::new(test_games::game_in_turn(hands, [2, 2, 2, 1]));
    for seat in [Seat::One, Seat::Two, Seat::Three, Seat::Four] {
        submit(&mut machine, seat, GameAction::PlayPieces { piece_indices: vec![1, 2] });
    }

    let game = machine.game();
    assert!(game.pending_display.is_some());
    let advanced = submit(
        &mut machine,
        Seat::One,
        GameAction::AdvanceDisplay { of: DisplayType::TurnResults },
    );
    for envelope in advanced.events {
        let json = serde_json::to_string(&envelope).expect("serialize");
        let back: data::events::game_event::EventEnvelope =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, envelope);
    }
}
