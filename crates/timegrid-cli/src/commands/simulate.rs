use clap::Args;
use std::path::PathBuf;

use timegrid_core::gesture::{GestureEditor, GestureInput};
use timegrid_core::EngineConfig;

/// Replay a JSON gesture script (an array of gesture inputs) through the
/// editor and print every emitted event, one JSON object per line.
#[derive(Args)]
pub struct SimulateArgs {
    /// JSON file with an array of gesture inputs
    #[arg(long)]
    pub script: PathBuf,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("cannot read {}: {e}", args.script.display()))?;
    let inputs: Vec<GestureInput> = serde_json::from_str(&content)?;

    let config = EngineConfig::load_or_default();
    let mut editor = GestureEditor::new(config.grid);

    for input in inputs {
        if let Some(event) = editor.apply(input) {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
