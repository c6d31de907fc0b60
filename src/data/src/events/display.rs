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

use serde::{Deserialize, Serialize};

use crate::game_states::game_phase::GamePhase;

/// Visual categories which clients pace on their own clock.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    TurnResults,
    ScoringDisplay,
}

/// Pacing hints attached by the engine to an outbound event.
///
/// The engine never sleeps for `show_for_seconds`: by the time an event
/// carrying this block is emitted, the follow-up transition has already been
/// computed and is waiting for an `advance_display` action. Clients are
/// authoritative for pacing the visual; a server-side safety deadline
/// prevents a room from pausing indefinitely when no client advances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    /// The visual category being shown.
    #[serde(rename = "type")]
    pub display_type: DisplayType,

    /// Suggested display duration in seconds.
    pub show_for_seconds: f64,

    /// Whether the client should request the next transition when the timer
    /// elapses.
    pub auto_advance: bool,

    /// Whether the client may short-circuit the timer with a user action.
    pub can_skip: bool,

    /// The phase that will follow when the client advances.
    pub next_phase: GamePhase,
}
