//! JSON-file store for votes and favorites.
//!
//! Every operation re-reads the file, applies the change and writes it back
//! through a temp file + rename, so readers never observe a half-written
//! document. The read-modify-write is serialized within one process only:
//! two processes voting on the same file at the same moment can lose one of
//! the increments. That is accepted for a single-user tool.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use geupsik_core::SchoolCandidate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::votes::poisoned;
use crate::{StoreError, VoteCounts, VoteKind, VoteStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    votes: Vec<VoteEntry>,
    #[serde(default)]
    favorites: Vec<SchoolCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VoteEntry {
    date: NaiveDate,
    school_code: String,
    #[serde(flatten)]
    counts: VoteCounts,
}

impl Document {
    fn counts(&self, date: NaiveDate, school_code: &str) -> VoteCounts {
        self.votes
            .iter()
            .find(|v| v.date == date && v.school_code == school_code)
            .map(|v| v.counts)
            .unwrap_or_default()
    }
}

pub struct LocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Open (or lazily create) the store file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        debug!(path = %path.display(), "opened local store");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Add a favorite. Returns false if that school is already listed.
    pub fn add_favorite(&self, candidate: SchoolCandidate) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut doc = self.load()?;
        if doc.favorites.iter().any(|f| f.same_school(&candidate)) {
            return Ok(false);
        }
        info!(school = %candidate.name, "adding favorite");
        doc.favorites.push(candidate);
        self.save(&doc)?;
        Ok(true)
    }

    /// Remove a favorite by its code pair. Returns false if it was not listed.
    pub fn remove_favorite(&self, office_code: &str, school_code: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut doc = self.load()?;
        let before = doc.favorites.len();
        doc.favorites
            .retain(|f| !(f.office_code == office_code && f.school_code == school_code));
        if doc.favorites.len() == before {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }

    /// Favorites in the order they were added.
    pub fn favorites(&self) -> Result<Vec<SchoolCandidate>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.favorites)
    }

    fn load(&self) -> Result<Document, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Document::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::default()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl VoteStore for LocalStore {
    fn get_counts(&self, date: NaiveDate, school_code: &str) -> Result<VoteCounts, StoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        Ok(self.load()?.counts(date, school_code))
    }

    fn increment(
        &self,
        date: NaiveDate,
        school_code: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, StoreError> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut doc = self.load()?;
        let counts = match doc
            .votes
            .iter_mut()
            .find(|v| v.date == date && v.school_code == school_code)
        {
            Some(entry) => {
                entry.counts.bump(kind);
                entry.counts
            }
            None => {
                let mut counts = VoteCounts::default();
                counts.bump(kind);
                doc.votes.push(VoteEntry {
                    date,
                    school_code: school_code.to_string(),
                    counts,
                });
                counts
            }
        };
        self.save(&doc)?;
        info!(%date, school_code, %kind, good = counts.good, bad = counts.bad, "vote recorded");
        Ok(counts)
    }
}
