use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use sessiongate::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration, then let the environment override it
    let config = if Path::new(CONFIG_PATH).exists() {
        Config::load_with_env(CONFIG_PATH)
    } else {
        eprintln!("{CONFIG_PATH} not found, using default configuration.");
        let mut config = Config::default();
        config.apply_env_overrides().map(|()| config)
    };

    let config = match config.and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = sessiongate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        sessiongate::logging::init_console_only(&config.logging.level);
    }

    info!("sessiongate {}", env!("CARGO_PKG_VERSION"));

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!(path = %config.database.path, "Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Server configured on {}", server.addr());

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Web server error: {e}");
            ExitCode::FAILURE
        }
    }
}
