//! Registry of in-flight tool calls, so `notifications/cancelled` can reach them.
//!
//! Entries are keyed by caller and JSON-RPC id: ids are only unique within one
//! client, so a cancellation only reaches calls made by the same caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::cancel::{self, CancelHandle, CancelSignal};
use crate::request::Caller;

type CallKey = (Caller, String);

/// Cancel handles of running calls, keyed by caller and JSON-RPC request id.
#[derive(Debug, Default)]
pub struct InFlightRequests {
    handles: Mutex<HashMap<CallKey, (u64, CancelHandle)>>,
    next_generation: AtomicU64,
}

/// Deregisters its call when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<InFlightRequests>,
    key: CallKey,
    generation: u64,
}

impl InFlightRequests {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a call. An id reused by the same caller replaces the older entry.
    pub fn register(
        self: &Arc<Self>,
        caller: Caller,
        id: &serde_json::Value,
    ) -> (InFlightGuard, CancelSignal) {
        let key = (caller, id.to_string());
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (handle, signal) = cancel::pair();

        self.handles.lock().insert(key.clone(), (generation, handle));

        (InFlightGuard { registry: Arc::clone(self), key, generation }, signal)
    }

    /// Cancel the call `caller` registered under `id`. Returns false if none is running.
    pub fn cancel(&self, caller: &Caller, id: &serde_json::Value) -> bool {
        let key = (caller.clone(), id.to_string());
        match self.handles.lock().get(&key) {
            Some((_, handle)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of running calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// True when no calls are running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut handles = self.registry.handles.lock();
        if handles.get(&self.key).is_some_and(|(generation, _)| *generation == self.generation) {
            handles.remove(&self.key);
        }
    }
}
