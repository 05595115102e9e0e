use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "timegrid-cli", version, about = "Timegrid scheduling engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Conflict checks against an event file
    Conflicts {
        #[command(subcommand)]
        action: commands::conflicts::ConflictsAction,
    },
    /// Recurrence expansion and cohort queries
    Recurrence {
        #[command(subcommand)]
        action: commands::recurrence::RecurrenceAction,
    },
    /// Engine configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Replay a gesture script through the editor state machine
    Simulate {
        #[command(flatten)]
        args: commands::simulate::SimulateArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Conflicts { action } => commands::conflicts::run(action),
        Commands::Recurrence { action } => commands::recurrence::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Simulate { args } => commands::simulate::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
