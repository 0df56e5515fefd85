//! Circulate - backend selection service
//!
//! Chooses one endpoint per request from a growing pool using a switchable
//! policy (round-robin, random, least-connections) and tracks how many times
//! each endpoint has been chosen. It never forwards traffic itself.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod selector;
pub mod telemetry;
