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

use crate::core::numerics::Score;
use crate::game_states::game_state::GameConfiguration;

/// Inclusive range of milliseconds a bot waits before submitting a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRangeMs {
    pub min: u64,
    pub max: u64,
}

/// All tunable knobs of the engine, loaded once at startup and shared by
/// every room the process hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A game ends at the close of any round where a seat reaches this
    /// cumulative score.
    pub winning_score_threshold: Score,

    /// Humanization delay applied to bot decisions
    pub bot_decision_delay_ms: DelayRangeMs,

    /// `show_for_seconds` attached to `TurnResolved`
    pub turn_results_display_seconds: f64,

    /// `show_for_seconds` attached to `ScoringApplied`
    pub scoring_display_seconds: f64,

    /// How long an in-game seat's outbound queue survives a disconnect
    pub broadcast_grace_ms_game: u64,

    /// How long an observer connection's outbound queue survives a
    /// disconnect
    pub broadcast_grace_ms_lobby: u64,

    /// Non-critical actions beyond this queue depth are rejected
    pub action_queue_soft_cap: usize,

    /// The engine advances a pending display on its own after
    /// `show_for_seconds` multiplied by this factor
    pub display_server_safety_multiplier: f64,

    /// Number of recent events replayed to a freshly opened connection.
    /// Zero disables replay.
    pub replay_last_n_events: usize,

    /// Fixed RNG seed for every room created by this process. Useful for
    /// tests and deterministic replay; normally unset.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            winning_score_threshold: 50,
            bot_decision_delay_ms: DelayRangeMs { min: 500, max: 1500 },
            turn_results_display_seconds: 5.0,
            scoring_display_seconds: 8.0,
            broadcast_grace_ms_game: 30_000,
            broadcast_grace_ms_lobby: 5_000,
            action_queue_soft_cap: 256,
            display_server_safety_multiplier: 2.0,
            replay_last_n_events: 0,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// The subset of configuration owned by a game's [GameConfiguration].
    pub fn game_configuration(&self) -> GameConfiguration {
        GameConfiguration {
            winning_score_threshold: self.winning_score_threshold,
            turn_results_display_seconds: self.turn_results_display_seconds,
            scoring_display_seconds: self.scoring_display_seconds,
        }
    }
}
