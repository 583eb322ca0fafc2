//! Meeting Engine - Binary Entry Point
//!
//! Inspect and edit persisted meeting logs from the command line.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use meeting_engine::{
    Actor, ActorRole, Event, EventStoreConfig, EventType, FileStorage, KeyValueStorage,
    MeetingEngine, MeetingSnapshot, PayloadMap,
};

#[derive(Parser)]
#[command(name = "meeting-engine")]
#[command(about = "Inspect and replay meeting event logs", version)]
struct Cli {
    /// Directory holding the persisted logs (overrides MEETING_ENGINE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current snapshot and the actions a moderator could take
    Show { meeting_id: String },

    /// Event timeline
    Timeline { meeting_id: String },

    /// Event counts as JSON
    Metrics { meeting_id: String },

    /// Validate and append an event
    Append {
        meeting_id: String,
        /// Event type, e.g. MEETING_STARTED
        event_type: String,
        /// Payload as a JSON object
        #[arg(long, default_value = "{}")]
        payload: String,
        #[arg(long, default_value = "系统")]
        actor: String,
        #[arg(long, default_value = "system")]
        role: String,
    },

    /// Delete a meeting's log
    Clear { meeting_id: String },

    /// Snapshot after the event at INDEX (-1 for before the first event)
    Replay {
        meeting_id: String,
        #[arg(long, allow_hyphen_values = true)]
        index: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,meeting_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EventStoreConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.into();
    }
    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let storage: Arc<dyn KeyValueStorage> = Arc::new(storage);

    let open = |meeting_id: &str| {
        MeetingEngine::open(meeting_id, Arc::clone(&storage), &config)
            .with_actor(Actor::new("cli", ActorRole::Host))
    };

    match cli.command {
        Commands::Show { meeting_id } => {
            let engine = open(&meeting_id);
            print_snapshot(&engine.snapshot());
            println!("events: {}", engine.events().len());
            for action in engine.actions() {
                if action.enabled {
                    println!("  [x] {} ({})", action.label, action.key);
                } else {
                    println!("  [ ] {} ({}): {}", action.label, action.key, action.reason);
                }
            }
        }
        Commands::Timeline { meeting_id } => {
            let engine = open(&meeting_id);
            for item in engine.timeline() {
                println!(
                    "{}  {}  {}  {}",
                    item.time_label, item.title, item.actor_label, item.detail
                );
            }
        }
        Commands::Metrics { meeting_id } => {
            let engine = open(&meeting_id);
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        }
        Commands::Append {
            meeting_id,
            event_type,
            payload,
            actor,
            role,
        } => {
            let event_type: EventType = event_type.parse()?;
            let payload: PayloadMap = match serde_json::from_str(&payload)
                .context("--payload must be valid JSON")?
            {
                Value::Object(map) => map,
                other => bail!("--payload must be a JSON object, got {}", other),
            };

            let event = Event::new(event_type, Some(Actor::new(actor, role)), payload);
            let mut engine = open(&meeting_id);
            let appended = engine.dispatch(&serde_json::to_value(&event)?)?;
            println!("{}", serde_json::to_string_pretty(&appended)?);
            println!("state: {}", engine.state_label());
        }
        Commands::Clear { meeting_id } => {
            let mut engine = open(&meeting_id);
            let removed = engine.events().len();
            engine.clear();
            println!("cleared {} events", removed);
        }
        Commands::Replay { meeting_id, index } => {
            let mut engine = open(&meeting_id);
            let index = engine.set_replay_index(index);
            println!("index: {} / {}", index, engine.events().len() as i64 - 1);
            print_snapshot(&engine.replay_snapshot());
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &MeetingSnapshot) {
    println!("state: {} ({})", snapshot.state_label, snapshot.state);
    println!("participants: {}", snapshot.participant_count);
    println!("participant mic: {}", snapshot.allow_participant_mic);
    println!("locked: {}", snapshot.meeting_locked);
}
