//! Command-line interface for Circulate
//!
//! Provides argument parsing and subcommand handling for the Circulate binary.

use clap::{Parser, Subcommand};

/// Backend selection service
#[derive(Parser)]
#[command(name = "circulate")]
#[command(version)]
#[command(about = "Backend selection service with pluggable selection policies")]
#[command(
    long_about = "Circulate picks one backend endpoint per request from a growing pool, \
    using round-robin, random or least-connections selection, and tracks how often \
    each endpoint has been chosen. It does not forward traffic."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Circulate Configuration
# ========================
#
# Every setting below is optional; the values shown are the defaults.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 5000

# ─────────────────────────────────────────────────────────────────────────────
# ENDPOINT POOL
# ─────────────────────────────────────────────────────────────────────────────
#
# Endpoints the pool starts with. More can be added at runtime with
# POST /api/add_ip; endpoints are never removed.

[pool]
endpoints = [
    "95.77.48.211",
    "109.170.148.204",
    "76.223.137.165",
    "122.117.19.28",
    "45.223.197.37",
]

# Selection policy at startup (change at runtime with /api/set_algorithm/<name>):
#   - "round_robin": rotate through endpoints in insertion order
#   - "random": uniform random choice
#   - "least_connections": endpoint with the fewest selections so far
policy = "round_robin"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# RUST_LOG overrides this when set.
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}
