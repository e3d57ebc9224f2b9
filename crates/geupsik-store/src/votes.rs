use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Good,
    Bad,
}

impl FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" | "up" | "+" | "좋아요" => Ok(VoteKind::Good),
            "bad" | "down" | "-" | "별로예요" => Ok(VoteKind::Bad),
            other => Err(format!("unknown vote {other:?}, expected good or bad")),
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteKind::Good => "good",
            VoteKind::Bad => "bad",
        })
    }
}

/// Tally for one (date, school) key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub good: u64,
    pub bad: u64,
}

impl VoteCounts {
    pub fn bump(&mut self, kind: VoteKind) {
        match kind {
            VoteKind::Good => self.good += 1,
            VoteKind::Bad => self.bad += 1,
        }
    }
}

/// Per-menu vote counters keyed by `(date, school_code)`.
pub trait VoteStore {
    /// Current counts; zero for keys never voted on.
    fn get_counts(&self, date: NaiveDate, school_code: &str) -> Result<VoteCounts, StoreError>;

    /// Add one vote and return the updated counts.
    fn increment(
        &self,
        date: NaiveDate,
        school_code: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, StoreError>;
}

/// Process-local counters. Increments hold the lock for the whole
/// read-increment-write, so concurrent voters never lose updates.
#[derive(Default)]
pub struct MemoryVoteStore {
    counts: Mutex<HashMap<(NaiveDate, String), VoteCounts>>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoteStore for MemoryVoteStore {
    fn get_counts(&self, date: NaiveDate, school_code: &str) -> Result<VoteCounts, StoreError> {
        let counts = self.counts.lock().map_err(|_| poisoned())?;
        Ok(counts
            .get(&(date, school_code.to_string()))
            .copied()
            .unwrap_or_default())
    }

    fn increment(
        &self,
        date: NaiveDate,
        school_code: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, StoreError> {
        let mut counts = self.counts.lock().map_err(|_| poisoned())?;
        let entry = counts.entry((date, school_code.to_string())).or_default();
        entry.bump(kind);
        Ok(*entry)
    }
}

pub(crate) fn poisoned() -> StoreError {
    StoreError::Other("store lock poisoned".into())
}
