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

use std::sync::Arc;

use ai::core::balanced::Balanced;
use ai::core::strategy::BotStrategy;
use dashmap::DashMap;
use data::config::engine_config::EngineConfig;
use data::core::primitives::{RoomId, Seat, SeatMap};
use enumset::EnumSet;
use tokio::task::JoinHandle;
use tracing::info;

use crate::action_queue::{ActionQueue, ActionSubmitter};
use crate::bot_coordinator::BotCoordinator;
use crate::broadcast::broadcaster::Broadcaster;
use crate::broadcast::connections::ConnectionRegistry;
use crate::event_dispatcher::{EventDispatcher, Subscription};
use crate::room_actor::RoomActor;
use crate::rooms::room::{Room, SeatAssignment};
use crate::transport::Transport;

/// Everything a caller needs to talk to a running room.
pub struct RoomHandle {
    pub id: RoomId,
    pub submitter: ActionSubmitter,
    pub broadcaster: Arc<Broadcaster>,
    task: JoinHandle<()>,
}

/// Process-wide directory of rooms.
///
/// The owning container for room lifecycle: `create` spawns the room's
/// actor task, `lookup` hands out submitter/broadcaster handles, `close`
/// tears the room down and waits for its actor to finish. Rooms share no
/// mutable state; the directory itself is the only cross-room structure.
pub struct RoomDirectory {
    config: EngineConfig,
    transport: Arc<dyn Transport>,
    strategy: Arc<dyn BotStrategy>,
    rooms: DashMap<RoomId, RoomHandle>,
}

impl RoomDirectory {
    pub fn new(config: EngineConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_strategy(config, transport, Arc::new(Balanced))
    }

    pub fn with_strategy(
        config: EngineConfig,
        transport: Arc<dyn Transport>,
        strategy: Arc<dyn BotStrategy>,
    ) -> Self {
        Self { config, transport, strategy, rooms: DashMap::new() }
    }

    /// Creates a room with the host at seat one and bots elsewhere.
    pub fn create(&self, host_name: &str) -> RoomId {
        let id = RoomId::generate();
        self.spawn_room(Room::with_bots(id, host_name), vec![])
    }

    /// Creates a room with explicit seat assignments and any additional
    /// event subscribers (tests register collectors this way).
    pub fn create_with(
        &self,
        host_seat: Seat,
        seats: SeatMap<SeatAssignment>,
        subscriptions: Vec<Subscription>,
    ) -> RoomId {
        let id = RoomId::generate();
        self.spawn_room(Room::new(id, host_seat, seats), subscriptions)
    }

    fn spawn_room(&self, room: Room, subscriptions: Vec<Subscription>) -> RoomId {
        let id = room.id;
        let (submitter, queue) = ActionQueue::new(self.config.action_queue_soft_cap);
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster =
            Arc::new(Broadcaster::new(registry, self.transport.clone(), &self.config));

        let mut dispatcher = EventDispatcher::new();
        let sink = broadcaster.clone();
        dispatcher.subscribe(Subscription {
            label: "broadcaster".to_string(),
            kinds: EnumSet::all(),
            priority: 0,
            callback: Box::new(move |event| sink.broadcast(event)),
        });
        for subscription in subscriptions {
            dispatcher.subscribe(subscription);
        }

        let bots = BotCoordinator::new(
            self.strategy.clone(),
            submitter.clone(),
            self.config.bot_decision_delay_ms,
        );
        let actor = RoomActor::new(
            room,
            self.config.clone(),
            queue,
            submitter.clone(),
            dispatcher,
            bots,
            broadcaster.clone(),
        );
        let task = tokio::spawn(actor.run());
        self.rooms.insert(id, RoomHandle { id, submitter, broadcaster, task });
        info!(room = ?id, "Room created");
        id
    }

    pub fn submitter(&self, id: RoomId) -> Option<ActionSubmitter> {
        self.rooms.get(&id).map(|handle| handle.submitter.clone())
    }

    pub fn broadcaster(&self, id: RoomId) -> Option<Arc<Broadcaster>> {
        self.rooms.get(&id).map(|handle| handle.broadcaster.clone())
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    /// Shuts the room down and waits for its actor to drain and exit.
    pub async fn close(&self, id: RoomId) {
        if let Some((_, handle)) = self.rooms.remove(&id) {
            handle.submitter.close();
            let _ = handle.task.await;
            info!(room = ?id, "Room closed");
        }
    }

    /// Closes every room. Tied to process shutdown.
    pub async fn close_all(&self) {
        let ids: Vec<RoomId> = self.rooms.iter().map(|entry| entry.id).collect();
        for id in ids {
            self.close(id).await;
        }
    }
}
