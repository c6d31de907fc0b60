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

use std::panic::{catch_unwind, AssertUnwindSafe};

use data::events::game_event::{EventEnvelope, EventKind};
use enumset::EnumSet;
use tracing::{error, warn};

pub type SubscriberFn = Box<dyn Fn(&EventEnvelope) + Send>;

/// One registered subscriber.
pub struct Subscription {
    /// Label used in logs when the subscriber misbehaves
    pub label: String,

    /// Event kinds this subscriber wants; everything else is skipped
    pub kinds: EnumSet<EventKind>,

    /// Lower priorities are invoked first
    pub priority: i32,

    pub callback: SubscriberFn,
}

/// In-process synchronous pub-sub for one room.
///
/// Dispatch runs on the room's serialization path: every subscriber has
/// observed an event before the next action is dequeued. Delivery is
/// ordered and at-least-once — a subscriber that panics is retried once
/// and may therefore see the same event twice.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Vec<Subscription>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber, keeping the list in priority order.
    pub fn subscribe(&mut self, subscription: Subscription) {
        let position = self
            .subscribers
            .iter()
            .position(|existing| existing.priority > subscription.priority)
            .unwrap_or(self.subscribers.len());
        self.subscribers.insert(position, subscription);
    }

    /// Fans one batch of events out to every interested subscriber.
    pub fn dispatch(&self, events: &[EventEnvelope]) {
        for event in events {
            for subscriber in &self.subscribers {
                if !subscriber.kinds.contains(event.kind()) {
                    continue;
                }
                self.invoke(subscriber, event);
            }
        }
    }

    /// Invokes one subscriber, isolating panics: one retry, then skip.
    fn invoke(&self, subscriber: &Subscription, event: &EventEnvelope) {
        for attempt in 0..2 {
            let outcome = catch_unwind(AssertUnwindSafe(|| (subscriber.callback)(event)));
            match outcome {
                Ok(()) => return,
                Err(_) if attempt == 0 => {
                    warn!(
                        subscriber = subscriber.label,
                        sequence = event.sequence,
                        "Subscriber panicked, retrying once"
                    );
                }
                Err(_) => {
                    error!(
                        subscriber = subscriber.label,
                        sequence = event.sequence,
                        "Subscriber panicked twice, skipping event"
                    );
                }
            }
        }
    }
}
