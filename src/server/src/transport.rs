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

use dashmap::DashMap;
use data::core::primitives::ConnectionId;
use tokio::sync::mpsc;

/// Result of a single non-blocking send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Sent,

    /// The connection handle is gone. Non-fatal: the frame is queued for
    /// the grace window and the room continues.
    Closed,
}

/// The seam to the real wire.
///
/// Implementations must not block: a slow or dead connection returns
/// [SendStatus::Closed] (or buffers internally) rather than stalling the
/// caller, because sends happen on the room's serialization path.
pub trait Transport: Send + Sync {
    fn send(&self, connection: ConnectionId, frame: &str) -> SendStatus;
}

/// In-process transport delivering frames over unbounded channels.
///
/// Serves the demo binary and the test suite; a WebSocket transport plugs
/// in at the same trait without touching the core.
#[derive(Default)]
pub struct ChannelTransport {
    channels: DashMap<ConnectionId, mpsc::UnboundedSender<String>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a channel for a connection and returns its receiving half.
    pub fn register(&self, connection: ConnectionId) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.insert(connection, tx);
        rx
    }

    /// Drops the sending half, so subsequent sends observe a closed
    /// connection.
    pub fn close(&self, connection: ConnectionId) {
        self.channels.remove(&connection);
    }
}

impl Transport for ChannelTransport {
    fn send(&self, connection: ConnectionId, frame: &str) -> SendStatus {
        match self.channels.get(&connection) {
            Some(channel) if channel.send(frame.to_string()).is_ok() => SendStatus::Sent,
            _ => SendStatus::Closed,
        }
    }
}
