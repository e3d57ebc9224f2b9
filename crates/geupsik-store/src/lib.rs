//! Storage layer: vote counters keyed by (date, school) and the favorites list.

mod error;
pub use error::StoreError;

mod local;
pub use local::LocalStore;

mod votes;
pub use votes::{MemoryVoteStore, VoteCounts, VoteKind, VoteStore};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckVoteStore;
