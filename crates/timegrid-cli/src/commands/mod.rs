pub mod config;
pub mod conflicts;
pub mod recurrence;
pub mod simulate;

use chrono::{DateTime, Utc};
use std::path::Path;

use timegrid_core::event::Event;

/// Parse an RFC 3339 instant from the command line.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))?
        .with_timezone(&Utc))
}

/// Load an event list from a JSON file.
pub fn load_events(path: &Path) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}
