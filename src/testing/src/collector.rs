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

use std::sync::{Arc, Mutex};

use data::events::game_event::{EventEnvelope, EventKind};
use enumset::EnumSet;
use server::event_dispatcher::Subscription;

/// Records every event a dispatcher hands it, for later assertions.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A subscription delivering all events to this collector.
    pub fn subscription(&self, label: &str, priority: i32) -> Subscription {
        let events = self.events.clone();
        Subscription {
            label: label.to_string(),
            kinds: EnumSet::all(),
            priority,
            callback: Box::new(move |event| {
                events.lock().expect("collector lock").push(event.clone());
            }),
        }
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().expect("collector lock").clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|event| event.kind()).collect()
    }

    pub fn sequences(&self) -> Vec<u64> {
        self.events().iter().map(|event| event.sequence).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|event| event.kind() == kind).count()
    }

    /// The most recent event of this kind, if any was seen.
    pub fn last_of(&self, kind: EventKind) -> Option<EventEnvelope> {
        self.events().into_iter().rev().find(|event| event.kind() == kind)
    }
}
