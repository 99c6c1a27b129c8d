use chrono::{DateTime, Utc};

use crate::errors::{Error, Result};
use crate::results::AnalysisResult;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    result: AnalysisResult,
}

/// Fixed-capacity ring of the most recently inserted results.
///
/// Eviction follows insertion slots, not timestamps: once full, each `add`
/// overwrites the slot under the cursor and advances it. Reads never assume
/// slot position implies recency and order by `(timestamp, insertion)`.
#[derive(Debug, Clone)]
pub struct RingStore {
    slots: Vec<Slot>,
    capacity: usize,
    cursor: usize,
    next_seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl RingStore {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_config("store capacity must be at least 1"));
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            next_seq: 0,
            last_timestamp: None,
        })
    }

    /// Inserts a result, returning the one it evicted, if any.
    pub fn add(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        self.last_timestamp = Some(match self.last_timestamp {
            Some(last) => last.max(result.timestamp),
            None => result.timestamp,
        });

        let slot = Slot {
            seq: self.next_seq,
            result,
        };
        self.next_seq += 1;

        if self.slots.len() < self.capacity {
            self.slots.push(slot);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.cursor], slot);
        self.cursor = (self.cursor + 1) % self.capacity;
        Some(evicted.result)
    }

    /// The held result with the greatest timestamp. Ties go to the later insertion.
    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.slots
            .iter()
            .max_by_key(|slot| (slot.result.timestamp, slot.seq))
            .map(|slot| &slot.result)
    }

    /// All held results, ascending by timestamp.
    pub fn all(&self) -> Vec<AnalysisResult> {
        let mut slots: Vec<&Slot> = self.slots.iter().collect();
        slots.sort_by_key(|slot| (slot.result.timestamp, slot.seq));
        slots.into_iter().map(|slot| slot.result.clone()).collect()
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Greatest timestamp ever inserted, including evicted results.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }
}
