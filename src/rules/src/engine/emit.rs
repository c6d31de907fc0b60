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

use std::time::{SystemTime, UNIX_EPOCH};

use data::core::primitives::Seat;
use data::events::display::DisplayMetadata;
use data::events::game_event::{EventAudience, GameEvent};

/// An event recorded during action handling, before the envelope fields
/// (sequence, phase, timestamp) are stamped at commit time.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub payload: GameEvent,
    pub display: Option<DisplayMetadata>,
    pub audience: EventAudience,
}

/// Collects the events produced while one action is handled.
///
/// Handlers push payloads in the order they should be observed; the state
/// machine assigns sequence numbers only once the staged mutation commits,
/// so a rolled-back action claims no sequence numbers.
#[derive(Debug, Default)]
pub struct EventSink {
    pending: Vec<PendingEvent>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event for every connection in the room.
    pub fn push(&mut self, payload: GameEvent) {
        self.pending.push(PendingEvent { payload, display: None, audience: EventAudience::Room });
    }

    /// Records a metered event carrying display pacing hints.
    pub fn push_with_display(&mut self, payload: GameEvent, display: DisplayMetadata) {
        self.pending.push(PendingEvent {
            payload,
            display: Some(display),
            audience: EventAudience::Room,
        });
    }

    /// Records an event visible to a single seat only.
    pub fn push_for_seat(&mut self, seat: Seat, payload: GameEvent) {
        self.pending.push(PendingEvent {
            payload,
            display: None,
            audience: EventAudience::SeatOnly(seat),
        });
    }

    pub fn take(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }
}

/// Milliseconds since the Unix epoch, stamped on every envelope.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
