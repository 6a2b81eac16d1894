//! Purpose: Map from a correlation id to the native execution contexts waiting on it.
//! Exports: `CallContextMap`, `ContextHandle`, `EMPTY_DUMP`.
//! Role: Routes a reply payload to every context that shares the reply's id.
//! Invariants: An (id, handle) pair appears at most once; an id with no handles has no entry.
//! Invariants: The debug dump is sorted by id then handle and is stable for equal contents.
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::core::xid::Xid;

/// Dump produced for a map with no entries.
pub const EMPTY_DUMP: &str = "-- empty --";

/// Native execution-context handle (thread, fiber or channel token) owned by the transport.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContextHandle(pub u64);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx:{:#018x}", self.0)
    }
}

#[derive(Debug)]
pub struct CallContextMap<K = Xid, H = ContextHandle> {
    entries: Mutex<BTreeMap<K, Vec<H>>>,
}

impl<K, H> Default for CallContextMap<K, H> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<K, H> CallContextMap<K, H>
where
    K: Ord + Clone + fmt::Display,
    H: Ord + Clone + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never leave the map half-updated; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<K, Vec<H>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Associates `handle` with `id`. Returns false when the pair was already present.
    pub fn add(&self, id: K, handle: H) -> bool {
        let mut entries = self.lock();
        let handles = entries.entry(id.clone()).or_default();
        if handles.contains(&handle) {
            return false;
        }
        debug!(id = %id, handle = %handle, "context attached");
        handles.push(handle);
        true
    }

    /// Detaches `handle` from `id`, dropping the id once its last handle is gone.
    pub fn remove(&self, id: &K, handle: &H) -> bool {
        let mut entries = self.lock();
        let Some(handles) = entries.get_mut(id) else {
            return false;
        };
        let Some(index) = handles.iter().position(|existing| existing == handle) else {
            return false;
        };
        handles.remove(index);
        if handles.is_empty() {
            entries.remove(id);
        }
        debug!(id = %id, handle = %handle, "context detached");
        true
    }

    /// Handles registered for `id`, in attach order.
    pub fn handles(&self, id: &K) -> Vec<H> {
        self.lock().get(id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.lock().contains_key(id)
    }

    /// Removes `id` entirely and returns the handles that were waiting on it.
    pub fn take(&self, id: &K) -> Vec<H> {
        let taken = self.lock().remove(id).unwrap_or_default();
        if !taken.is_empty() {
            debug!(id = %id, count = taken.len(), "contexts released");
        }
        taken
    }

    /// Number of ids with at least one handle.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn to_debug_string(&self) -> String {
        let entries = self.lock();
        if entries.is_empty() {
            return EMPTY_DUMP.to_string();
        }
        let mut out = String::new();
        for (id, handles) in entries.iter() {
            let mut sorted: Vec<&H> = handles.iter().collect();
            sorted.sort();
            let _ = writeln!(out, "{id}");
            for handle in sorted {
                let _ = writeln!(out, "    {handle}");
            }
        }
        out
    }
}
