use clap::Subcommand;
use std::path::PathBuf;

use timegrid_core::conflict::{detect_conflicts, find_next_available_slot};
use timegrid_core::EngineConfig;

use super::{load_events, parse_instant};

#[derive(Subcommand)]
pub enum ConflictsAction {
    /// Check a proposed time range against an event file
    Check {
        /// JSON file with an array of events
        #[arg(long)]
        file: PathBuf,
        /// Proposed start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Proposed end (RFC 3339)
        #[arg(long)]
        end: String,
        /// Event id to exclude (the event being edited)
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Find the next available slot of a given duration
    NextSlot {
        #[arg(long)]
        file: PathBuf,
        /// Search start (RFC 3339)
        #[arg(long)]
        from: String,
        /// Required duration in minutes
        #[arg(long)]
        duration: i64,
    },
}

pub fn run(action: ConflictsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConflictsAction::Check {
            file,
            start,
            end,
            exclude,
        } => {
            let events = load_events(&file)?;
            let report = detect_conflicts(
                parse_instant(&start)?,
                parse_instant(&end)?,
                &events,
                exclude.as_deref(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ConflictsAction::NextSlot {
            file,
            from,
            duration,
        } => {
            let events = load_events(&file)?;
            let config = EngineConfig::load_or_default();
            match find_next_available_slot(parse_instant(&from)?, duration, &events, &config.slots)
            {
                Some(slot) => println!("{}", slot.to_rfc3339()),
                None => println!("no slot found within the search horizon"),
            }
        }
    }
    Ok(())
}
