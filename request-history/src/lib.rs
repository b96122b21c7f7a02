//! Persistent log of answered questions.
//!
//! Each orchestrated question is stored as one row per produced answer in the
//! `requests_history` table. Rows are never updated; the only mutation besides
//! inserts is [`HistoryStore::clear`].

mod error;
mod model;
mod store;

pub use error::HistoryError;
pub use model::{HistoryRecord, HistoryStats, JUDGE_LABEL, ModelStats, NewAnswer};
pub use store::HistoryStore;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "my_aggregator.db";

/// Database path from `HISTORY_DB_PATH`, or [`DEFAULT_DB_PATH`].
pub fn db_path_from_env() -> String {
    std::env::var("HISTORY_DB_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}
