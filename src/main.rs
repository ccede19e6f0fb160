//! # Filtering Forward Proxy
//!
//! A single-threaded forward HTTP proxy: it accepts a client connection,
//! frames one HTTP/1.1 request, classifies and filters its target host,
//! opens the upstream connection, forwards the request verbatim, and then
//! relays bytes until either side closes.
//!
//! ## Architecture
//!
//! - **Config**: loads `conf/proxy.config`, falling back to built-in
//!   defaults for any key left unset in the file; a missing or unreadable
//!   file is a fatal initialization error.
//! - **Logging**: a file-append `log::Log` implementation, falling back to
//!   `env_logger` on stderr if the log file can't be opened.
//! - **Rules**: the blocklist rule engine, loaded once at startup.
//! - **Engine**: the accept loop and per-connection relay logic.
//!
//! ## Lifecycle
//!
//! The process runs until SIGINT, at which point the accept loop stops
//! taking new connections and a shutdown signal is broadcast to every
//! in-flight connection task, closing all active slots rather than letting
//! them drain on their own.

mod config;
mod connection;
mod connector;
mod engine;
mod error;
mod host;
mod http;
mod logging;
mod resolver;
mod responses;
mod rules;
mod signal;

use config::Config;
use engine::Engine;
use rules::RuleSet;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[----] failed to load config from {config_path:?}: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.logger_filename);
    log::info!("starting proxy on {}", config.bind_addr());

    let rules = match RuleSet::load(&config.rules_filename) {
        Ok(rules) => rules,
        Err(e) => {
            log::error!("failed to load rules from {:?}: {e}", config.rules_filename);
            std::process::exit(1);
        }
    };

    let (running, shutdown) = signal::install();

    let engine = Arc::new(Engine::new(config, rules));
    if let Err(e) = engine.run(running, shutdown).await {
        log::error!("engine exited with error: {e}");
        std::process::exit(1);
    }

    log::info!("shutdown complete");
}
