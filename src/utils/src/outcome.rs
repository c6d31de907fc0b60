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

use color_eyre::Report;

/// Possible reasons why the engine should halt
#[derive(Debug)]
#[must_use]
pub enum StopCondition {
    /// The game has ended and no further mutations may be applied.
    GameOver,

    /// An internal invariant was violated or an unexpected error occurred.
    /// The action being handled must be rolled back.
    Error(Report),
}

/// Represents the result of some engine mutation.
///
/// The "outcome" system is a wrapper around [Result] that adds additional
/// cases where the engine should halt, but which are not necessarily
/// traditional errors. The [StopCondition] enum describes these in more
/// detail.
///
/// Note that an *illegal player action* is not an outcome error: rejections
/// are ordinary return values which become `ActionRejected` events. Outcome
/// errors are reserved for internal failures.
pub type Outcome = Result<(), StopCondition>;

/// Equivalent alias to [Outcome] which wraps a returned value
pub type Value<T> = Result<T, StopCondition>;

/// Mutation completed successfully, execution can continue
pub const OK: Outcome = Ok(());

/// Mutation resulted in the game being over, execution should halt.
pub const GAME_OVER: Outcome = Err(StopCondition::GameOver);
