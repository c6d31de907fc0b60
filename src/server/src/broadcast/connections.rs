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

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use data::core::primitives::{ConnectionId, Seat, SeatMap};
use tracing::debug;

/// Frames a seat can hold while it has no live connection, before the
/// oldest non-critical ones start falling off.
const SEAT_HOLD_CAP: usize = 512;

/// What a connection is bound to within its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Plays (or watches over the shoulder of) one seat.
    Seat(Seat),

    /// Watches the room without a seat.
    Observer,
}

/// One serialized outbound message.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    /// Sequence of the originating event, echoed in the message body
    pub sequence: u64,

    /// Whether the originating event must survive transient loss
    pub critical: bool,

    /// The serialized envelope
    pub body: String,
}

struct ConnectionEntry {
    role: ConnectionRole,
    live: bool,
    disconnected_at: Option<Instant>,
    /// Frames addressed to this connection while it is within grace
    queue: Vec<OutboundFrame>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    /// Frames held for seats with zero live connections
    seat_pending: SeatMap<Vec<OutboundFrame>>,
    /// When each seat last lost its final live connection
    seat_lost_at: SeatMap<Option<Instant>>,
}

/// Maps connection handles to their room roles and holds pending-broadcast
/// queues through brief disconnects.
///
/// All methods take a short critical section; binds and removals are safe
/// concurrent with broadcasts.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a fresh connection, returning any frames held for its seat
    /// while nobody was listening, oldest first.
    pub fn bind(&self, connection: ConnectionId, role: ConnectionRole) -> Vec<OutboundFrame> {
        let mut inner = self.lock();
        inner.connections.insert(
            connection,
            ConnectionEntry { role, live: true, disconnected_at: None, queue: vec![] },
        );
        match role {
            ConnectionRole::Seat(seat) => {
                inner.seat_lost_at[seat] = None;
                std::mem::take(&mut inner.seat_pending[seat])
            }
            ConnectionRole::Observer => vec![],
        }
    }

    /// A previously disconnected connection returned within grace: marks it
    /// live again and returns its queued frames.
    pub fn resume(&self, connection: ConnectionId) -> Option<Vec<OutboundFrame>> {
        let mut inner = self.lock();
        let entry = inner.connections.get_mut(&connection)?;
        entry.live = true;
        entry.disconnected_at = None;
        let queued = std::mem::take(&mut entry.queue);
        if let ConnectionRole::Seat(seat) = entry.role {
            inner.seat_lost_at[seat] = None;
            let mut held = std::mem::take(&mut inner.seat_pending[seat]);
            let mut frames = queued;
            frames.append(&mut held);
            frames.sort_by_key(|frame| frame.sequence);
            frames.dedup_by_key(|frame| frame.sequence);
            return Some(frames);
        }
        Some(queued)
    }

    /// Marks a connection lost. Its queue is retained for the grace window.
    pub fn disconnect(&self, connection: ConnectionId) {
        let now = Instant::now();
        let mut inner = self.lock();
        let Some(entry) = inner.connections.get_mut(&connection) else {
            return;
        };
        entry.live = false;
        entry.disconnected_at = Some(now);
        let role = entry.role;
        if let ConnectionRole::Seat(seat) = role {
            if !inner.seat_has_live(seat) {
                inner.seat_lost_at[seat] = Some(now);
            }
        }
        debug!(?connection, "Connection lost, holding queue for grace window");
    }

    /// Removes a connection outright, dropping whatever it had queued.
    pub fn remove(&self, connection: ConnectionId) {
        let mut inner = self.lock();
        if let Some(entry) = inner.connections.remove(&connection) {
            if let ConnectionRole::Seat(seat) = entry.role {
                if !inner.seat_has_live(seat) && inner.seat_lost_at[seat].is_none() {
                    inner.seat_lost_at[seat] = Some(Instant::now());
                }
            }
        }
    }

    /// Live connections currently bound to the seat.
    pub fn live_for_seat(&self, seat: Seat) -> Vec<ConnectionId> {
        let inner = self.lock();
        inner
            .connections
            .iter()
            .filter(|(_, entry)| entry.live && entry.role == ConnectionRole::Seat(seat))
            .map(|(&id, _)| id)
            .collect()
    }

    /// All live connections in the room.
    pub fn live_connections(&self) -> Vec<(ConnectionId, ConnectionRole)> {
        let inner = self.lock();
        inner
            .connections
            .iter()
            .filter(|(_, entry)| entry.live)
            .map(|(&id, entry)| (id, entry.role))
            .collect()
    }

    /// Queues a frame for a seat with no live connection.
    ///
    /// Critical frames are always kept; when the hold overflows, the oldest
    /// non-critical frame is evicted first.
    pub fn hold_for_seat(&self, seat: Seat, frame: OutboundFrame) {
        let mut inner = self.lock();
        if inner.seat_lost_at[seat].is_none() && !inner.seat_has_live(seat) {
            // Nothing was ever bound to this seat (all-bot rooms); the
            // grace clock starts at the first held frame.
            inner.seat_lost_at[seat] = Some(Instant::now());
        }
        let pending = &mut inner.seat_pending[seat];
        pending.push(frame);
        if pending.len() > SEAT_HOLD_CAP {
            if let Some(drop_at) = pending.iter().position(|f| !f.critical) {
                pending.remove(drop_at);
            }
        }
    }

    /// Queues a frame on a lost connection awaiting [Self::resume].
    pub fn hold_for_connection(&self, connection: ConnectionId, frame: OutboundFrame) {
        let mut inner = self.lock();
        if let Some(entry) = inner.connections.get_mut(&connection) {
            entry.queue.push(frame);
        }
    }

    /// Drops connections and held frames whose grace window has passed.
    /// Returns the expired connection ids.
    pub fn expire(&self, grace_game: Duration, grace_lobby: Duration) -> Vec<ConnectionId> {
        let now = Instant::now();
        let mut inner = self.lock();

        let expired: Vec<ConnectionId> = inner
            .connections
            .iter()
            .filter(|(_, entry)| {
                let grace = match entry.role {
                    ConnectionRole::Seat(_) => grace_game,
                    ConnectionRole::Observer => grace_lobby,
                };
                matches!(entry.disconnected_at, Some(at) if now.duration_since(at) > grace)
            })
            .map(|(&id, _)| id)
            .collect();
        for id in &expired {
            inner.connections.remove(id);
        }

        for seat in enum_iterator::all::<Seat>() {
            if matches!(inner.seat_lost_at[seat], Some(at) if now.duration_since(at) > grace_game)
            {
                inner.seat_pending[seat].clear();
                inner.seat_lost_at[seat] = None;
            }
        }
        expired
    }

    /// Drops every connection and held frame. Used at room shutdown.
    pub fn clear(&self) -> Vec<ConnectionId> {
        let mut inner = self.lock();
        let all = inner.connections.keys().copied().collect();
        inner.connections.clear();
        for seat in enum_iterator::all::<Seat>() {
            inner.seat_pending[seat].clear();
            inner.seat_lost_at[seat] = None;
        }
        all
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned registry lock would mean a panic mid-bookkeeping; the
        // registry state is still structurally sound, so broadcasting
        // continues.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn seat_has_live(&self, seat: Seat) -> bool {
        self.connections
            .values()
            .any(|entry| entry.live && entry.role == ConnectionRole::Seat(seat))
    }
}
