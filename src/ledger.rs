//! Pending review obligations, bucketed by due date.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// One outstanding review of one item.
///
/// `item` is the position of the item in the source list the scheduler was
/// given. `review_index` is 1-based: the first review after learning is 1,
/// the last is 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReviewObligation {
    pub item: usize,
    pub due_date: NaiveDate,
    pub review_index: u8,
    sequence: u64,
}

impl ReviewObligation {
    pub fn new(item: usize, due_date: NaiveDate, review_index: u8) -> Self {
        Self {
            item,
            due_date,
            review_index,
            sequence: 0,
        }
    }

    /// Position in enqueue order. Assigned by the ledger on first enqueue and
    /// kept across deferrals.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
pub struct ReviewLedger {
    by_date: BTreeMap<NaiveDate, Vec<ReviewObligation>>,
    len: usize,
    next_sequence: u64,
}

impl ReviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, mut obligation: ReviewObligation) {
        obligation.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.insert(obligation);
    }

    fn insert(&mut self, obligation: ReviewObligation) {
        self.by_date
            .entry(obligation.due_date)
            .or_default()
            .push(obligation);
        self.len += 1;
    }

    /// Everything due on `date`, lowest review index first. Ties keep
    /// enqueue order, so earlier-learned items go first.
    pub fn due_on(&self, date: NaiveDate) -> Vec<ReviewObligation> {
        let mut due = self.by_date.get(&date).cloned().unwrap_or_default();
        due.sort_by_key(|obligation| (obligation.review_index, obligation.sequence));
        due
    }

    /// Drop the given obligations. An obligation is matched on every field,
    /// so ones not in the ledger are ignored.
    pub fn remove(&mut self, obligations: &[ReviewObligation]) {
        let mut by_date: BTreeMap<NaiveDate, HashSet<ReviewObligation>> = BTreeMap::new();
        for obligation in obligations {
            by_date
                .entry(obligation.due_date)
                .or_default()
                .insert(*obligation);
        }

        for (date, targets) in by_date {
            let Some(bucket) = self.by_date.get_mut(&date) else {
                continue;
            };
            let before = bucket.len();
            bucket.retain(|obligation| !targets.contains(obligation));
            self.len -= before - bucket.len();
            if bucket.is_empty() {
                self.by_date.remove(&date);
            }
        }
    }

    /// Move obligations to a new due date, keeping item, review index and
    /// enqueue position.
    pub fn defer(&mut self, obligations: &[ReviewObligation], new_date: NaiveDate) {
        let present: Vec<ReviewObligation> = obligations
            .iter()
            .copied()
            .filter(|obligation| self.contains(obligation))
            .collect();
        self.remove(&present);
        for obligation in present {
            self.insert(ReviewObligation {
                due_date: new_date,
                ..obligation
            });
        }
    }

    pub fn contains(&self, obligation: &ReviewObligation) -> bool {
        self.by_date
            .get(&obligation.due_date)
            .is_some_and(|bucket| bucket.contains(obligation))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn earliest_due_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }
}
