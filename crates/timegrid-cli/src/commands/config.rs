use clap::Subcommand;

use timegrid_core::EngineConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default configuration to disk
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let config = EngineConfig::default();
            config.save()?;
            println!("default configuration written");
        }
    }
    Ok(())
}
