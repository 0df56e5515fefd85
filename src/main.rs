//! Circulate HTTP server
//!
//! Starts an Axum web server that hands out backend endpoints on request.

use circulate::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    // A missing file means "run on defaults"; a broken one is fatal
    let config_missing = !Path::new(&cli.config).exists();
    let config = if config_missing {
        Config::default()
    } else {
        Config::from_file(&cli.config)?
    };

    telemetry::init(&config.observability.log_level);

    if config_missing {
        tracing::warn!(
            path = %cli.config,
            "Config file not found, using built-in defaults"
        );
    }

    let addr = config.server.socket_addr();
    tracing::info!(
        address = %addr,
        endpoints = config.pool.endpoints.len(),
        policy = %config.pool.policy,
        "Starting Circulate server"
    );

    let state = AppState::new(Arc::new(config))?;
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Selection available at http://{}/api/get_ip", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
