pub mod error;
pub mod jsonl;
pub mod memory;

use std::future::Future;

use lingex_core::TrialRecord;

pub use error::SaveError;
pub use jsonl::{JsonlStore, StoredRecord, StoredRun};
pub use memory::MemoryStore;

/// Where finished trials end up.
///
/// `save_partial` receives single records flagged for immediate saving while
/// the timeline is still running; `save_complete` receives the whole run once.
pub trait Persistence: Send + Sync + 'static {
    fn save_partial(
        &self,
        record: &TrialRecord,
    ) -> impl Future<Output = Result<(), SaveError>> + Send;

    fn save_complete(
        &self,
        records: &[TrialRecord],
    ) -> impl Future<Output = Result<(), SaveError>> + Send;
}
