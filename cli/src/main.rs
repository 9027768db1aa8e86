//! EV reservations CLI server
//!
//! ```sh
//! # Run with default config (~/.config/ev-reservations/config.toml)
//! reservation-service
//!
//! # Custom config path and port
//! reservation-service --config /etc/ev-reservations/config.toml --port 9100
//!
//! # Validate config without starting
//! reservation-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use ev_reservations::config::{AppConfig, StoreBackend};
use ev_reservations::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "reservation-service",
    version,
    about = "Charging slot reservations for EV chargers",
    long_about = "REST API for reserving EV charging slots on a given charger \
                  or on the charger nearest to a location.\n\n\
                  Default config: ~/.config/ev-reservations/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RESERVATIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ev_reservations::default_config_path);

    let loaded = AppConfig::load(&config_path);

    if cli.check {
        let mut config = loaded?;
        apply_overrides(&cli, &mut config);
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        match config.database.backend {
            StoreBackend::Sql => println!("   Database    : {}", config.database.url),
            StoreBackend::Memory => println!("   Database    : in-memory"),
        }
        println!("   Registry    : {:?}", config.registry.kind);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let (mut config, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    apply_overrides(&cli, &mut config);
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
