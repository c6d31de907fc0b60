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

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use color_eyre::Result;
use data::actions::game_action::{ActionOrigin, GameAction};
use data::config::engine_config::{DelayRangeMs, EngineConfig};
use data::core::primitives::{ActionId, Seat, SeatMap};
use data::events::game_event::EventKind;
use enumset::EnumSet;
use server::event_dispatcher::Subscription;
use server::rooms::registry::RoomDirectory;
use server::rooms::room::SeatAssignment;
use server::transport::ChannelTransport;
use tracing::info;

mod logging;

/// Runs one room of four bots to completion and prints the event stream.
///
/// The transport seam stays in-process; point a WebSocket layer at the same
/// [RoomDirectory] to serve real clients.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a configuration file layered under LIAP_* environment
    /// variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. "debug" or "server=debug,rules=info"
    #[arg(long)]
    log: Option<String>,

    /// Keep the configured display and bot pacing instead of the quick
    /// demo pacing
    #[arg(long)]
    realtime: bool,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = &args.config {
        builder = builder.add_source(config::File::from(path.clone()));
    }
    builder = builder.add_source(config::Environment::with_prefix("LIAP"));
    let mut engine: EngineConfig = builder.build()?.try_deserialize()?;

    if args.seed.is_some() {
        engine.rng_seed = args.seed;
    }
    if !args.realtime {
        // Demo pacing: let the safety deadline advance displays promptly
        // and keep bots snappy.
        engine.turn_results_display_seconds = 0.05;
        engine.scoring_display_seconds = 0.05;
        engine.bot_decision_delay_ms = DelayRangeMs { min: 1, max: 10 };
    }
    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::initialize(args.log.as_deref());
    let engine = load_config(&args)?;

    let transport = Arc::new(ChannelTransport::new());
    let directory = RoomDirectory::new(engine, transport);

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let done_tx = Mutex::new(Some(done_tx));
    let printer = Subscription {
        label: "demo".to_string(),
        kinds: EnumSet::all(),
        priority: 10,
        callback: Box::new(move |event| {
            info!(
                sequence = event.sequence,
                phase = %event.phase,
                kind = ?event.kind(),
                "event"
            );
            if event.kind() == EventKind::GameEnded {
                if let Some(done) = done_tx.lock().unwrap_or_else(|p| p.into_inner()).take() {
                    let _ = done.send(());
                }
            }
        }),
    };

    let mut seats: SeatMap<SeatAssignment> = SeatMap::default();
    for seat in [Seat::One, Seat::Two, Seat::Three, Seat::Four] {
        seats[seat] = SeatAssignment::bot(format!("Bot {}", seat.index() + 1));
    }
    let room = directory.create_with(Seat::One, seats, vec![printer]);
    let submitter = directory.submitter(room).expect("room just created");
    submitter
        .submit(ActionId::generate(), ActionOrigin::Seat(Seat::One), GameAction::StartGame)
        .expect("queue just created");

    done_rx.await?;
    directory.close(room).await;
    info!("Demo game complete");
    Ok(())
}
