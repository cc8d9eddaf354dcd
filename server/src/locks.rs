//! Per-slot serialization.
//!
//! Uploads and deletions of the same `(class, student)` slot must not
//! interleave. Each slot gets an async mutex that is held for the whole
//! pipeline. Entries are dropped once nobody holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use satchel::class::ClassId;
use satchel::student::StudentId;

type SlotKey = (ClassId, StudentId);

#[derive(Debug, Default)]
pub struct SlotLocks {
    slots: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to a slot.
pub struct SlotGuard<'a> {
    locks: &'a SlotLocks,
    key: SlotKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a slot.
    pub async fn lock(&self, class: &ClassId, student: StudentId) -> SlotGuard<'_> {
        let key = (class.clone(), student);

        let mutex = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        // Created before waiting so a cancelled wait still releases the entry
        let mut slot = SlotGuard {
            locks: self,
            key,
            guard: None,
        };
        slot.guard = Some(mutex.lock_owned().await);

        slot
    }

    /// Returns the number of slots currently tracked.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

impl<'a> Drop for SlotGuard<'a> {
    fn drop(&mut self) {
        // Release before checking whether anyone else still needs the entry
        drop(self.guard.take());

        let mut slots = self.locks.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mutex) = slots.get(&self.key) {
            // Only the map holds it
            if Arc::strong_count(mutex) == 1 {
                slots.remove(&self.key);
            }
        }
    }
}
