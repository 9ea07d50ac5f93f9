//! Staging area — drafts submitted for citizens who have not registered yet.
//!
//! Each unregistered identifier holds a queue of numbered drafts. Draft
//! numbers start at 1 and increase in staging order regardless of which
//! agency submitted; drafts are never merged. The coordinator drains the
//! queue into the record store on registration.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::profile::{CitizenId, Profile};

/// A profile submitted by an agency for an unregistered identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingDraft {
    /// Draft sequence number for this identifier, starting at 1.
    pub number: u64,
    pub profile: Profile,
    /// Name of the submitting organization.
    pub organization: String,
    /// Staging timestamp (microseconds since epoch).
    pub staged_at: u64,
}

/// Saved form of one identifier's draft queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedQueue {
    pub citizen: CitizenId,
    /// Next draft number to hand out.
    pub next: u64,
    pub drafts: Vec<StagingDraft>,
}

#[derive(Debug, Default)]
struct Queue {
    next: u64,
    drafts: BTreeMap<u64, StagingDraft>,
}

/// In-memory staging area.
pub struct StagingArea {
    queues: RwLock<HashMap<CitizenId, Queue>>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild the staging area from saved queues.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` if a draft number repeats
    /// or is not below the queue's `next` counter.
    pub fn from_queues(saved: Vec<StagedQueue>) -> Result<Self> {
        let mut queues = HashMap::with_capacity(saved.len());
        for q in saved {
            let mut drafts = BTreeMap::new();
            for d in q.drafts {
                if d.number == 0 || d.number >= q.next {
                    return Err(RegistryError::InvalidFileFormat(format!(
                        "draft {} for {} outside 1..{}",
                        d.number, q.citizen, q.next
                    )));
                }
                let n = d.number;
                if drafts.insert(n, d).is_some() {
                    return Err(RegistryError::InvalidFileFormat(format!(
                        "duplicate draft {n} for {}",
                        q.citizen
                    )));
                }
            }
            if !drafts.is_empty() {
                queues.insert(
                    q.citizen,
                    Queue {
                        next: q.next,
                        drafts,
                    },
                );
            }
        }
        Ok(Self {
            queues: RwLock::new(queues),
        })
    }

    /// Every non-empty queue, ordered by identifier.
    pub fn queues(&self) -> Result<Vec<StagedQueue>> {
        let queues = self.read()?;
        let mut out: Vec<StagedQueue> = queues
            .iter()
            .map(|(citizen, q)| StagedQueue {
                citizen: citizen.clone(),
                next: q.next,
                drafts: q.drafts.values().cloned().collect(),
            })
            .collect();
        out.sort_by(|a, b| a.citizen.cmp(&b.citizen));
        Ok(out)
    }

    /// Queue a draft and return its number.
    pub fn stage(&self, citizen: &CitizenId, profile: Profile, organization: &str) -> Result<u64> {
        let mut queues = self.write()?;
        let queue = queues.entry(citizen.clone()).or_insert_with(|| Queue {
            next: 1,
            drafts: BTreeMap::new(),
        });
        let number = queue.next;
        queue.next += 1;
        queue.drafts.insert(
            number,
            StagingDraft {
                number,
                profile,
                organization: organization.to_string(),
                staged_at: crate::time::now_micros(),
            },
        );
        log::debug!("staging: {organization} staged draft {number} for {citizen}");
        Ok(number)
    }

    pub fn has_pending(&self, citizen: &CitizenId) -> Result<bool> {
        Ok(self
            .read()?
            .get(citizen)
            .is_some_and(|q| !q.drafts.is_empty()))
    }

    /// Draft numbers for an identifier in ascending (staging) order.
    pub fn list_draft_numbers(&self, citizen: &CitizenId) -> Result<Vec<u64>> {
        Ok(self
            .read()?
            .get(citizen)
            .map(|q| q.drafts.keys().copied().collect())
            .unwrap_or_default())
    }

    /// Fetch one draft.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DraftNotFound` if no such draft is staged.
    pub fn get_draft(&self, citizen: &CitizenId, n: u64) -> Result<StagingDraft> {
        self.read()?
            .get(citizen)
            .and_then(|q| q.drafts.get(&n))
            .cloned()
            .ok_or_else(|| RegistryError::DraftNotFound {
                citizen: citizen.to_string(),
                draft: n,
            })
    }

    /// All drafts for an identifier in ascending order.
    pub fn drafts(&self, citizen: &CitizenId) -> Result<Vec<StagingDraft>> {
        Ok(self
            .read()?
            .get(citizen)
            .map(|q| q.drafts.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Remove every draft numbered `n` or lower. Used when a migration stops
    /// part-way so migrated drafts do not stay pending.
    pub fn remove_through(&self, citizen: &CitizenId, n: u64) -> Result<usize> {
        let mut queues = self.write()?;
        let Some(queue) = queues.get_mut(citizen) else {
            return Ok(0);
        };
        let keep = queue.drafts.split_off(&(n + 1));
        let removed = queue.drafts.len();
        queue.drafts = keep;
        if queue.drafts.is_empty() {
            queues.remove(citizen);
        }
        Ok(removed)
    }

    /// Delete all drafts for an identifier. Returns how many were removed.
    pub fn clear(&self, citizen: &CitizenId) -> Result<usize> {
        let removed = self
            .write()?
            .remove(citizen)
            .map(|q| q.drafts.len())
            .unwrap_or(0);
        if removed > 0 {
            log::debug!("staging: cleared {removed} drafts for {citizen}");
        }
        Ok(removed)
    }

    /// Total number of drafts across all identifiers.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.read()?.values().map(|q| q.drafts.len()).sum())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CitizenId, Queue>>> {
        self.queues
            .read()
            .map_err(|_| RegistryError::poisoned("staging area"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CitizenId, Queue>>> {
        self.queues
            .write()
            .map_err(|_| RegistryError::poisoned("staging area"))
    }
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new()
    }
}
