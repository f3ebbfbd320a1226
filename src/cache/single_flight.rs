//! Keyed in-flight gate for de-duplicating concurrent remote fetches.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Serializes work per key. Callers holding different keys run in
/// parallel; callers with the same key run one at a time.
#[derive(Debug, Default)]
pub struct KeyedGate {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn run<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let release = SlotRelease {
            gate: self,
            key,
            slot,
        };

        let _held = release.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently held or awaited.
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Drops the key's slot once its last user leaves, even when `f` unwinds.
struct SlotRelease<'a> {
    gate: &'a KeyedGate,
    key: &'a str,
    slot: Arc<Mutex<()>>,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        // Clones are only taken under the map lock, so a count of two
        // (map + ours) means nobody else is queued on this key.
        let mut slots = self.gate.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(self.key);
        }
    }
}
