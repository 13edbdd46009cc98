//! Per-record progress tracking.
//!
//! Each id in `1..=capacity` moves through `Unseen -> Seen -> Caught`.
//! `reset_one` returns any state straight to `Unseen`. The two totals are
//! updated on every transition and always equal the number of entries with
//! the matching flag set. Ids outside the range are ignored.
//!
//! The tracker is not synchronized. Callers sharing it between threads must
//! serialize access (the HTTP server keeps it behind a mutex).

use crate::error::ProgressError;
use crate::models::{ProgressEntry, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    entries: Vec<ProgressEntry>,
    total_encountered: u32,
    total_caught: u32,
}

impl ProgressTracker {
    /// Fresh tracker: every entry unseen, both totals zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![ProgressEntry::default(); capacity],
            total_encountered: 0,
            total_caught: 0,
        }
    }

    /// Restores a tracker from stored entries and totals.
    ///
    /// Rejects entries that are caught without being encountered and totals
    /// that disagree with the entries.
    pub fn from_parts(
        entries: Vec<ProgressEntry>,
        total_encountered: u32,
        total_caught: u32,
    ) -> Result<Self, ProgressError> {
        if let Some(slot) = entries.iter().position(|e| e.caught && !e.encountered) {
            return Err(ProgressError::CaughtNotEncountered {
                id: slot as u32 + 1,
            });
        }

        let encountered = entries.iter().filter(|e| e.encountered).count() as u32;
        if encountered != total_encountered {
            return Err(ProgressError::CounterMismatch {
                counter: "encountered",
                stored: total_encountered,
                actual: encountered,
            });
        }
        let caught = entries.iter().filter(|e| e.caught).count() as u32;
        if caught != total_caught {
            return Err(ProgressError::CounterMismatch {
                counter: "caught",
                stored: total_caught,
                actual: caught,
            });
        }

        Ok(Self {
            entries,
            total_encountered,
            total_caught,
        })
    }

    /// Marks `id` as encountered. Returns `true` if the entry changed.
    pub fn mark_encountered(&mut self, id: u32) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        self.encounter_slot(slot)
    }

    /// Marks `id` as caught, encountering it first if needed. Returns `true`
    /// if the entry changed.
    pub fn mark_caught(&mut self, id: u32) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        let encountered = self.encounter_slot(slot);

        let entry = &mut self.entries[slot];
        if entry.caught {
            return encountered;
        }
        entry.caught = true;
        self.total_caught += 1;
        true
    }

    /// Returns `id` to unseen. Returns `true` if the entry changed.
    pub fn reset_one(&mut self, id: u32) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        let entry = &mut self.entries[slot];
        let changed = entry.encountered || entry.caught;

        if entry.caught {
            entry.caught = false;
            self.total_caught -= 1;
        }
        if entry.encountered {
            entry.encountered = false;
            self.total_encountered -= 1;
        }
        changed
    }

    /// Clears every entry and zeroes both totals.
    pub fn reset_all(&mut self) {
        self.entries.fill(ProgressEntry::default());
        self.total_encountered = 0;
        self.total_caught = 0;
    }

    pub fn entry(&self, id: u32) -> Option<ProgressEntry> {
        self.slot_of(id).map(|slot| self.entries[slot])
    }

    pub fn status(&self, id: u32) -> Option<Status> {
        self.entry(id).map(|entry| entry.status())
    }

    pub fn total_encountered(&self) -> u32 {
        self.total_encountered
    }

    pub fn total_caught(&self) -> u32 {
        self.total_caught
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// All entries, indexed by `id - 1`.
    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    fn encounter_slot(&mut self, slot: usize) -> bool {
        let entry = &mut self.entries[slot];
        if entry.encountered {
            return false;
        }
        entry.encountered = true;
        self.total_encountered += 1;
        true
    }

    fn slot_of(&self, id: u32) -> Option<usize> {
        let id = id as usize;
        (1..=self.entries.len()).contains(&id).then(|| id - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(encountered: bool, caught: bool) -> ProgressEntry {
        ProgressEntry {
            encountered,
            caught,
        }
    }

    fn totals(p: &ProgressTracker) -> (u32, u32) {
        (p.total_encountered(), p.total_caught())
    }

    #[test]
    fn test_new_is_empty() {
        let p = ProgressTracker::new(151);
        assert_eq!(p.capacity(), 151);
        assert_eq!(totals(&p), (0, 0));
        assert!(p.entries().iter().all(|e| *e == ProgressEntry::default()));
    }

    #[test]
    fn test_mark_encountered_idempotent() {
        let mut p = ProgressTracker::new(10);
        assert!(p.mark_encountered(4));
        assert!(!p.mark_encountered(4));
        assert_eq!(p.entry(4), Some(entry(true, false)));
        assert_eq!(totals(&p), (1, 0));
    }

    #[test]
    fn test_mark_caught_from_unseen() {
        let mut p = ProgressTracker::new(10);
        assert!(p.mark_caught(7));
        assert_eq!(p.entry(7), Some(entry(true, true)));
        assert_eq!(totals(&p), (1, 1));
    }

    #[test]
    fn test_mark_caught_from_seen() {
        let mut p = ProgressTracker::new(10);
        p.mark_encountered(7);
        assert!(p.mark_caught(7));
        assert_eq!(totals(&p), (1, 1));
        assert!(!p.mark_caught(7));
        assert_eq!(totals(&p), (1, 1));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut p = ProgressTracker::new(10);
        for id in [0, 11, u32::MAX] {
            assert!(!p.mark_encountered(id));
            assert!(!p.mark_caught(id));
            assert!(!p.reset_one(id));
            assert!(p.entry(id).is_none());
            assert!(p.status(id).is_none());
        }
        assert_eq!(totals(&p), (0, 0));
    }

    #[test]
    fn test_reset_one_restores_counters() {
        let mut p = ProgressTracker::new(10);
        p.mark_caught(1);
        let before = totals(&p);
        p.mark_caught(2);
        assert!(p.reset_one(2));
        assert_eq!(p.entry(2), Some(entry(false, false)));
        assert_eq!(totals(&p), before);
        assert!(!p.reset_one(2));
        assert_eq!(totals(&p), before);
    }

    #[test]
    fn test_reset_one_from_seen() {
        let mut p = ProgressTracker::new(10);
        p.mark_encountered(3);
        assert!(p.reset_one(3));
        assert_eq!(p.status(3), Some(Status::Unseen));
        assert_eq!(totals(&p), (0, 0));
    }

    #[test]
    fn test_status_transitions() {
        let mut p = ProgressTracker::new(3);
        assert_eq!(p.status(1), Some(Status::Unseen));
        p.mark_encountered(1);
        assert_eq!(p.status(1), Some(Status::Seen));
        p.mark_caught(1);
        assert_eq!(p.status(1), Some(Status::Caught));
        p.reset_one(1);
        assert_eq!(p.status(1), Some(Status::Unseen));
    }

    #[test]
    fn test_reset_all_matches_reset_one() {
        let mut bulk = ProgressTracker::new(20);
        for id in 1..=20 {
            match id % 3 {
                0 => {
                    bulk.mark_caught(id);
                }
                1 => {
                    bulk.mark_encountered(id);
                }
                _ => {}
            }
        }
        let mut single = bulk.clone();

        bulk.reset_all();
        for id in 1..=20 {
            single.reset_one(id);
        }

        assert_eq!(bulk, single);
        assert_eq!(totals(&bulk), (0, 0));
        assert_eq!(bulk, ProgressTracker::new(20));
    }

    #[test]
    fn test_starter_scenario() {
        let mut p = ProgressTracker::new(3);
        p.mark_caught(2);
        assert_eq!(p.entry(2), Some(entry(true, true)));
        assert_eq!(totals(&p), (1, 1));

        p.mark_encountered(1);
        assert_eq!(p.entry(1), Some(entry(true, false)));
        assert_eq!(totals(&p), (2, 1));

        p.reset_one(2);
        assert_eq!(p.entry(2), Some(entry(false, false)));
        assert_eq!(totals(&p), (1, 0));

        p.reset_all();
        assert!(p.entries().iter().all(|e| !e.encountered && !e.caught));
        assert_eq!(totals(&p), (0, 0));
    }

    #[test]
    fn test_from_parts_accepts_consistent_state() {
        let entries = vec![entry(true, true), entry(true, false), entry(false, false)];
        let p = ProgressTracker::from_parts(entries, 2, 1).unwrap();
        assert_eq!(p.status(1), Some(Status::Caught));
        assert_eq!(p.status(2), Some(Status::Seen));
    }

    #[test]
    fn test_from_parts_rejects_caught_without_encounter() {
        let entries = vec![entry(false, false), entry(false, true)];
        let err = ProgressTracker::from_parts(entries, 0, 1).unwrap_err();
        assert_eq!(err, ProgressError::CaughtNotEncountered { id: 2 });
    }

    #[test]
    fn test_from_parts_rejects_counter_mismatch() {
        let entries = vec![entry(true, false), entry(true, true)];
        let err = ProgressTracker::from_parts(entries.clone(), 1, 1).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::CounterMismatch {
                counter: "encountered",
                stored: 1,
                actual: 2
            }
        ));
        let err = ProgressTracker::from_parts(entries, 2, 0).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::CounterMismatch {
                counter: "caught",
                ..
            }
        ));
    }
}
