use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("[Request History] failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("[Request History] sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("[Request History] database handle poisoned by a panicked writer")]
    Poisoned,

    #[error("[Request History] background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
