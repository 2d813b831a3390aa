use autoclicker_core::{Config, ConfigError};
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "autoclicker", version, about = "Auto clicker host")]
struct Cli {
    /// Enable debug logging (RUST_LOG is honoured when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve control requests from stdin and print events as JSON lines
    Run(commands::run::RunArgs),
    /// Print the current pointer position as JSON
    Position {
        /// Report from the dry-run port instead of the native binding
        #[arg(long)]
        dry_run: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let (debug, config_error) = match debug_from_config(cli.verbose) {
        Ok(debug) => (debug, None),
        Err(e) => (cli.verbose, Some(e)),
    };
    logging::init(debug);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "failed to read logging settings");
    }

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Position { dry_run } => commands::position::run(dry_run),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Whether the config file asks for debug logging. Only reads an existing
/// file; creating the defaults is left to the commands that need a config.
fn debug_from_config(verbose: bool) -> Result<bool, ConfigError> {
    if verbose {
        return Ok(true);
    }
    let config = Config::load_existing(&Config::default_path()?)?;
    Ok(config.is_some_and(|config| config.logging.debug))
}
