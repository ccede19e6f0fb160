//! Connection bookkeeping (C1, C2).
//!
//! Real descriptor multiplexing is delegated to the Tokio reactor; what
//! this module tracks is the *count* and *phase* of live connections, which
//! is all the relay engine needs to enforce `max_client` admission control
//! and to log connection lifecycle events.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Where a connection is in its lifecycle. Advances forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accumulating bytes from the client until a complete request arrives.
    Reading,
    /// Shuttling bytes between client and upstream.
    Relaying,
}

#[derive(Debug, Clone)]
pub struct SlotInfo {
    pub peer: SocketAddr,
    pub phase: Phase,
}

/// Tracks the set of currently open connections, keyed by an
/// ever-increasing slot id.
pub struct ConnectionTable {
    next_id: AtomicU64,
    slots: Mutex<HashMap<u64, SlotInfo>>,
    max_client: usize,
}

impl ConnectionTable {
    pub fn new(max_client: usize) -> ConnectionTable {
        ConnectionTable {
            next_id: AtomicU64::new(1),
            slots: Mutex::new(HashMap::new()),
            max_client,
        }
    }

    /// Returns true if there is room for one more connection.
    pub fn has_capacity(&self) -> bool {
        self.slots.lock().unwrap().len() < self.max_client
    }

    /// Registers a newly accepted connection and returns its slot id.
    pub fn open(&self, peer: SocketAddr) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().unwrap().insert(id, SlotInfo { peer, phase: Phase::Reading });
        id
    }

    /// Advances a slot's phase.
    pub fn set_phase(&self, id: u64, phase: Phase) {
        if let Some(slot) = self.slots.lock().unwrap().get_mut(&id) {
            slot.phase = phase;
        }
    }

    /// Closes a slot, freeing its admission-control budget. Closing always
    /// removes the whole entry, so both sides of the connection are
    /// considered gone together -- there is no way, in this representation,
    /// for one side to be cleared while the other lingers.
    pub fn close(&self, id: u64) {
        self.slots.lock().unwrap().remove(&id);
    }

    pub fn active_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}
