//! Purpose: Set of correlation ids whose calls are currently in flight.
//! Exports: `CallIdRegistry`.
//! Role: Lets a transport reject replies for unknown, cancelled or already-completed calls.
//! Invariants: `add` and `remove` are idempotent; all operations are atomic under one mutex.
//! Invariants: Owned by the transport session and shared explicitly (e.g. via `Arc`); no globals.
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::fault::Fault;
use crate::core::xid::Xid;

#[derive(Debug)]
pub struct CallIdRegistry<K = Xid> {
    active: Mutex<HashSet<K>>,
}

impl<K> Default for CallIdRegistry<K> {
    fn default() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone + fmt::Debug> CallIdRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never leave the set half-updated; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `id` active. Returns false when it already was.
    pub fn add(&self, id: K) -> bool {
        let added = self.lock().insert(id.clone());
        debug!(?id, added, "call id registered");
        added
    }

    /// Marks `id` absent. Returns false when it already was.
    pub fn remove(&self, id: &K) -> bool {
        let removed = self.lock().remove(id);
        debug!(?id, removed, "call id released");
        removed
    }

    pub fn contains(&self, id: &K) -> bool {
        self.lock().contains(id)
    }

    /// Strict removal for reply handling: completing a call that is not active is a fault.
    pub fn complete(&self, id: &K) -> Result<(), Error> {
        if self.lock().remove(id) {
            debug!(?id, "call completed");
            return Ok(());
        }
        warn!(?id, "completion for unknown or already completed call");
        Err(Fault::invalid_call_state(format!("call {id:?} is not active")).into())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Sorted copy of the active ids.
    pub fn snapshot(&self) -> Vec<K>
    where
        K: Ord,
    {
        let mut ids: Vec<K> = self.lock().iter().cloned().collect();
        ids.sort();
        ids
    }
}

/// Classifies a reply id before the transport routes its payload.
pub fn check_reply<K: Eq + Hash + Clone + fmt::Debug>(
    registry: &CallIdRegistry<K>,
    id: &K,
) -> Result<(), Error> {
    if registry.contains(id) {
        return Ok(());
    }
    Err(Error::new(ErrorKind::InvalidCallState)
        .with_message(format!("reply for unknown call {id:?}"))
        .with_hint("the call was never issued, was cancelled, or has already completed"))
}
