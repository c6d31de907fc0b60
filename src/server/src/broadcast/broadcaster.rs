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
use std::sync::{Arc, Mutex};
use std::time::Duration;

use data::config::engine_config::EngineConfig;
use data::core::primitives::{ConnectionId, Seat};
use data::events::game_event::{EventAudience, EventEnvelope};
use tracing::{error, trace};

use crate::broadcast::connections::{ConnectionRegistry, ConnectionRole, OutboundFrame};
use crate::transport::{SendStatus, Transport};

/// Serializes outgoing events and fans them out per connection.
///
/// Sends are non-blocking and never stall the action-handling path: a dead
/// connection is marked lost and its frames are queued through the grace
/// window instead. Seats with zero live connections accumulate frames in a
/// per-seat hold which a fresh connection drains on bind, preserving the
/// original sequence numbers and display metadata.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    transport: Arc<dyn Transport>,
    replay: Mutex<VecDeque<OutboundFrame>>,
    replay_cap: usize,
    grace_game: Duration,
    grace_lobby: Duration,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            replay: Mutex::new(VecDeque::new()),
            replay_cap: config.replay_last_n_events,
            grace_game: Duration::from_millis(config.broadcast_grace_ms_game),
            grace_lobby: Duration::from_millis(config.broadcast_grace_ms_lobby),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Sends one event to its audience.
    pub fn broadcast(&self, envelope: &EventEnvelope) {
        let body = match serde_json::to_string(envelope) {
            Ok(body) => body,
            Err(err) => {
                error!(sequence = envelope.sequence, %err, "Failed to serialize event");
                return;
            }
        };
        let frame = OutboundFrame {
            sequence: envelope.sequence,
            critical: envelope.is_critical(),
            body,
        };

        self.registry.expire(self.grace_game, self.grace_lobby);
        match envelope.audience {
            EventAudience::Room => {
                self.remember(&frame);
                for seat in enum_iterator::all::<Seat>() {
                    self.deliver_to_seat(seat, &frame);
                }
                for (connection, role) in self.registry.live_connections() {
                    if role == ConnectionRole::Observer {
                        self.send_or_hold(connection, &frame);
                    }
                }
            }
            EventAudience::SeatOnly(seat) => self.deliver_to_seat(seat, &frame),
        }
    }

    /// Binds a new connection and brings it up to date: the replay ring (if
    /// enabled) plus anything held for its seat, in sequence order.
    pub fn attach(&self, connection: ConnectionId, role: ConnectionRole) {
        let held = self.registry.bind(connection, role);
        let mut frames: Vec<OutboundFrame> = vec![];
        if self.replay_cap > 0 {
            let replay = self.lock_replay();
            frames.extend(replay.iter().cloned());
        }
        frames.extend(held);
        frames.sort_by_key(|frame| frame.sequence);
        frames.dedup_by_key(|frame| frame.sequence);
        for frame in frames {
            self.send_or_hold(connection, &frame);
        }
    }

    /// A lost connection came back within grace: drains its queue.
    pub fn resume(&self, connection: ConnectionId) {
        let Some(frames) = self.registry.resume(connection) else {
            return;
        };
        for frame in frames {
            self.send_or_hold(connection, &frame);
        }
    }

    /// Marks a connection lost, retaining its queue for the grace window.
    pub fn detach(&self, connection: ConnectionId) {
        self.registry.disconnect(connection);
    }

    /// Drops everything at room shutdown.
    pub fn close_all(&self) -> Vec<ConnectionId> {
        self.registry.clear()
    }

    fn deliver_to_seat(&self, seat: Seat, frame: &OutboundFrame) {
        let live = self.registry.live_for_seat(seat);
        if live.is_empty() {
            self.registry.hold_for_seat(seat, frame.clone());
            trace!(%seat, sequence = frame.sequence, "No live connection, holding frame");
            return;
        }
        for connection in live {
            if self.transport.send(connection, &frame.body) == SendStatus::Closed {
                self.registry.disconnect(connection);
                self.registry.hold_for_connection(connection, frame.clone());
                if self.registry.live_for_seat(seat).is_empty() {
                    self.registry.hold_for_seat(seat, frame.clone());
                }
            }
        }
    }

    fn send_or_hold(&self, connection: ConnectionId, frame: &OutboundFrame) {
        if self.transport.send(connection, &frame.body) == SendStatus::Closed {
            self.registry.disconnect(connection);
            self.registry.hold_for_connection(connection, frame.clone());
        }
    }

    fn remember(&self, frame: &OutboundFrame) {
        if self.replay_cap == 0 {
            return;
        }
        let mut replay = self.lock_replay();
        replay.push_back(frame.clone());
        while replay.len() > self.replay_cap {
            replay.pop_front();
        }
    }

    fn lock_replay(&self) -> std::sync::MutexGuard<'_, VecDeque<OutboundFrame>> {
        self.replay.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
