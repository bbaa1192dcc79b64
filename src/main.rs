//! Binary entrypoint for the wiremud CLI.
//!
//! Commands:
//! - `start` - run the MUD server
//! - `init` - create a starter `config.toml`
//! - `status` - print world statistics from the configured data dir
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use wiremud::config::Config;
use wiremud::mud::MudServer;
use wiremud::world::WorldStoreBuilder;

#[derive(Parser)]
#[command(name = "wiremud")]
#[command(about = "A multi-user text adventure server over plain TCP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MUD server
    Start,
    /// Initialize a new configuration file
    Init,
    /// Show world statistics (users, rooms, doors)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            // Init runs before a config exists.
            Config::create_default(&cli.config).await?;
            println!("Wrote starter configuration to {}", cli.config);
            println!("Edit it, then run: wiremud start");
            Ok(())
        }
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(&config, cli.verbose);
            info!("starting wiremud with config {}", cli.config);
            let server = MudServer::new(config)?;
            server.run().await
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&config, cli.verbose);
            // Report what is on disk without seeding a fresh world.
            let store = WorldStoreBuilder::new(&config.storage.data_dir)
                .without_world_seed()
                .open()?;
            let users = store.user_count().await?;
            let rooms = store.room_count().await?;
            let doors = store.door_count().await?;
            println!("world data: {}", config.storage.data_dir);
            println!("  users: {}", users);
            println!("  rooms: {}", rooms);
            println!("  doors: {}", doors);
            Ok(())
        }
    }
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;

    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    if let Some(file) = config.logging.file.clone() {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let sink = std::sync::Arc::new(std::sync::Mutex::new(f));
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = sink.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                writeln!(fmt, "{}", line)
            });
        }
    }

    builder.init();
}
