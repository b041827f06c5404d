use std::{collections::HashMap, fmt};

use strum::IntoEnumIterator;

use crate::filter::{Admission, RejectReason};

/// Running tally of admission outcomes for one crawl run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    accepted: u64,
    rejected: HashMap<RejectReason, u64>,
    // records that never reached the filter (unreadable input and the like)
    skipped: u64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, admission: Admission) {
        match admission {
            Admission::Accepted => self.accepted += 1,
            Admission::Rejected(reason) => *self.rejected.entry(reason).or_insert(0) += 1,
        }
    }

    pub fn record_skipped(&mut self, count: u64) {
        self.skipped += count;
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn total_seen(&self) -> u64 {
        self.accepted + self.total_rejected()
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "accepted={}", self.accepted)?;

        for reason in RejectReason::iter() {
            write!(f, " {}={}", reason, self.rejected(reason))?;
        }

        write!(f, " skipped={}", self.skipped)
    }
}
