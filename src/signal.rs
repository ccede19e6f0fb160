//! Shutdown signal handling.
//!
//! A single `Arc<AtomicBool>` "running" flag is shared between the `ctrlc`
//! handler and the accept loop. This replaces the teacher's `static mut`
//! singleton with an owned handle threaded through `main`, which is the
//! idiomatic way to share this kind of flag and avoids `unsafe` entirely.
//!
//! SIGINT also fires a `tokio::sync::watch` channel so that connections
//! already in the relay phase notice shutdown too, instead of only the
//! accept loop: per spec.md §5, "[o]n break, all active slots are closed",
//! not merely left to drain on their own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Installs a `ctrlc` handler that, on SIGINT, flips the returned flag to
/// `false` and fires the returned watch channel once. The flag starts out
/// `true`; the watch channel starts out `false`.
pub fn install() -> (Arc<AtomicBool>, watch::Receiver<bool>) {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        log::info!("SIGINT received, shutting down");
        handler_flag.store(false, Ordering::SeqCst);
        let _ = shutdown_tx.send(true);
    })
    .expect("failed to install SIGINT handler");
    (running, shutdown_rx)
}

pub fn is_running(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}
