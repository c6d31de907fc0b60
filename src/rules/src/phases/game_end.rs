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
use data::events::game_event::{GameEvent, RejectReason};
use data::game_states::game_state::{GameState, PendingAdvance, PendingDisplay};
use enumset::{enum_set, EnumSet};
use tracing::info;
use utils::outcome::{Outcome, Value};
use utils::{fail, outcome};

use crate::engine::emit::EventSink;
use crate::phases::scoring::cumulative_totals;
use crate::phases::{PhaseBehavior, PhaseUpdate};

/// Terminal phase: announces the winner and refuses all further play.
pub struct GameEndPhase;

impl PhaseBehavior for GameEndPhase {
    fn allowed_actions(&self, _game: &GameState) -> EnumSet<ActionKind> {
        enum_set!(ActionKind::Leave)
    }

    fn on_enter(&self, game: &mut GameState, events: &mut EventSink) -> Outcome {
        // The winner was fixed when the final round was scored; the only
        // path here is the scoring display's end-game advance.
        let winner = match game.pending_display.take() {
            Some(PendingDisplay { advance: PendingAdvance::EndGame { winner }, .. }) => winner,
            other => fail!("entered game end without an end-game advance: {other:?}"),
        };

        game.current_seat = None;
        info!(%winner, "Game over");
        events.push(GameEvent::GameEnded { winner, totals: cumulative_totals(game) });
        outcome::OK
    }

    fn handle(
        &self,
        _game: &mut GameState,
        _origin: ActionOrigin,
        _action: &GameAction,
        _events: &mut EventSink,
    ) -> Value<PhaseUpdate> {
        Ok(PhaseUpdate::Rejected(RejectReason::WrongPhase))
    }
}
