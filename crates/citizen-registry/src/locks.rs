//! Per-citizen exclusivity.
//!
//! Multi-step operations on one citizen (register then migrate, read then
//! append) run inside that citizen's lock for their whole duration.
//! Operations on different citizens never contend here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{RegistryError, Result};
use crate::profile::CitizenId;

/// One mutex per citizen identifier, held only while some caller uses it.
#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<CitizenId, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `citizen`'s lock.
    pub fn with_citizen<T>(&self, citizen: &CitizenId, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| RegistryError::poisoned("citizen lock table"))?;
            Arc::clone(slots.entry(citizen.clone()).or_default())
        };
        let outcome = match slot.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(RegistryError::poisoned("citizen lock")),
        };
        self.release(citizen, &slot);
        outcome
    }

    /// Drop the slot once the table and `slot` are its only holders. New
    /// holders clone under the table lock, so the count cannot grow here.
    fn release(&self, citizen: &CitizenId, slot: &Arc<Mutex<()>>) {
        if let Ok(mut slots) = self.slots.lock() {
            let idle = slots
                .get(citizen)
                .is_some_and(|held| Arc::ptr_eq(held, slot) && Arc::strong_count(slot) == 2);
            if idle {
                slots.remove(citizen);
            }
        }
    }

    /// Number of identifiers currently locked or waited on.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
