use std::time::Duration;

use lingex_core::RecordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    Invalid(#[from] RecordError),

    #[error("store rejected the save: {0}")]
    Rejected(String),

    #[error("save did not finish within {0:?}")]
    TimedOut(Duration),
}
