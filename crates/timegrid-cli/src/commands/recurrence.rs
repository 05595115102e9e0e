use clap::Subcommand;
use std::path::PathBuf;

use timegrid_core::recurrence::{expand, occurs_on, related_events};

use super::{load_events, parse_instant};

#[derive(Subcommand)]
pub enum RecurrenceAction {
    /// Expand an event's occurrences within a range
    Expand {
        #[arg(long)]
        file: PathBuf,
        /// Id of the (recurring) source event
        #[arg(long)]
        id: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Check whether an event occurs on a date (YYYY-MM-DD)
    Occurs {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long)]
        date: String,
    },
    /// List the linked cohort of an event, ordered by start time
    Related {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: String,
    },
}

pub fn run(action: RecurrenceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RecurrenceAction::Expand {
            file,
            id,
            start,
            end,
        } => {
            let events = load_events(&file)?;
            let event = find(&events, &id)?;
            let occurrences = expand(event, parse_instant(&start)?, parse_instant(&end)?);
            println!("{}", serde_json::to_string_pretty(&occurrences)?);
        }
        RecurrenceAction::Occurs { file, id, date } => {
            let events = load_events(&file)?;
            let event = find(&events, &id)?;
            let date = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{date}': {e}"))?;
            println!("{}", occurs_on(event, date));
        }
        RecurrenceAction::Related { file, id } => {
            let events = load_events(&file)?;
            let event = find(&events, &id)?;
            let cohort = related_events(event, &events);
            println!("{}", serde_json::to_string_pretty(&cohort)?);
        }
    }
    Ok(())
}

fn find<'a>(
    events: &'a [timegrid_core::Event],
    id: &str,
) -> Result<&'a timegrid_core::Event, Box<dyn std::error::Error>> {
    events
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| format!("no event with id '{id}' in file").into())
}
