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

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use data::actions::game_action::{ActionOrigin, GameAction, QueuedAction};
use data::core::primitives::ActionId;
use data::events::game_event::RejectReason;
use tokio::sync::mpsc;
use tracing::debug;

enum QueueEntry {
    Action(QueuedAction),

    /// Terminal sentinel: everything queued behind it is drained and
    /// rejected.
    Shutdown,
}

/// Why a submission was turned away at the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Non-critical action over the soft cap.
    QueueFull,

    /// The room is closed.
    RoomClosed,
}

impl SubmitError {
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            SubmitError::QueueFull => RejectReason::QueueFull,
            SubmitError::RoomClosed => RejectReason::RoomClosed,
        }
    }
}

struct Shared {
    depth: AtomicUsize,
    arrivals: AtomicU64,
    closed: AtomicBool,
    soft_cap: usize,
}

/// Multi-producer handle to a room's action queue.
///
/// Cloneable and cheap; transports, bot tasks and safety deadlines all feed
/// the same FIFO through one of these.
#[derive(Clone)]
pub struct ActionSubmitter {
    tx: mpsc::UnboundedSender<QueueEntry>,
    shared: Arc<Shared>,
}

impl ActionSubmitter {
    /// Stamps the action with its arrival sequence and enqueues it.
    ///
    /// Backpressure applies to ordinary actions only; critical control
    /// actions (leave, host replacement) are accepted regardless of depth.
    pub fn submit(
        &self,
        action_id: ActionId,
        origin: ActionOrigin,
        action: GameAction,
    ) -> Result<u64, SubmitError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(SubmitError::RoomClosed);
        }
        if !action.is_critical() && self.shared.depth.load(Ordering::Acquire) >= self.shared.soft_cap
        {
            debug!(?action_id, "Action dropped at soft cap");
            return Err(SubmitError::QueueFull);
        }

        let arrival_sequence = self.shared.arrivals.fetch_add(1, Ordering::AcqRel);
        self.shared.depth.fetch_add(1, Ordering::AcqRel);
        let queued = QueuedAction { action_id, origin, action, arrival_sequence };
        self.tx.send(QueueEntry::Action(queued)).map_err(|_| {
            self.shared.depth.fetch_sub(1, Ordering::AcqRel);
            SubmitError::RoomClosed
        })?;
        Ok(arrival_sequence)
    }

    /// Marks the queue closed and posts the terminal sentinel. Submissions
    /// racing past the flag are drained and rejected by the consumer.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(QueueEntry::Shutdown);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

/// Single-consumer side, owned by the room actor.
///
/// Guarantees serialization (one action at a time) and arrival ordering;
/// the actor never observes a second action until the prior one has been
/// fully handled, transitioned and emitted.
pub struct ActionQueue {
    rx: mpsc::UnboundedReceiver<QueueEntry>,
    shared: Arc<Shared>,
    /// Actions received after the close flag was raised, awaiting rejection
    stash: Vec<QueuedAction>,
}

impl ActionQueue {
    pub fn new(soft_cap: usize) -> (ActionSubmitter, ActionQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            depth: AtomicUsize::new(0),
            arrivals: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            soft_cap,
        });
        (ActionSubmitter { tx, shared: shared.clone() }, ActionQueue { rx, shared, stash: vec![] })
    }

    /// The next action to handle, or `None` once the queue has shut down.
    ///
    /// Actions still in flight when the room closes are not handled; they
    /// land in the drain set and are rejected with a fatal error.
    pub async fn next(&mut self) -> Option<QueuedAction> {
        if self.shared.closed.load(Ordering::Acquire) {
            return None;
        }
        match self.rx.recv().await? {
            QueueEntry::Action(action) => {
                self.shared.depth.fetch_sub(1, Ordering::AcqRel);
                if self.shared.closed.load(Ordering::Acquire) {
                    self.stash.push(action);
                    return None;
                }
                Some(action)
            }
            QueueEntry::Shutdown => None,
        }
    }

    /// Empties whatever is still queued after shutdown, so each pending
    /// action can be rejected with a fatal error.
    pub fn drain(&mut self) -> Vec<QueuedAction> {
        let mut drained = std::mem::take(&mut self.stash);
        while let Ok(entry) = self.rx.try_recv() {
            if let QueueEntry::Action(action) = entry {
                self.shared.depth.fetch_sub(1, Ordering::AcqRel);
                drained.push(action);
            }
        }
        drained
    }
}
