use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lingex_core::TrialRecord;
use tracing::debug;

use crate::{Persistence, SaveError};

/// In-process store used in mock-store mode and by tests.
///
/// Failures can be injected per trial index for partial saves, and the
/// complete save can be made to fail or to never resolve.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_partial: HashSet<usize>,
    fail_complete: bool,
    stall_complete: bool,
}

#[derive(Debug, Default)]
struct Inner {
    partial: Vec<TrialRecord>,
    complete: Vec<Vec<TrialRecord>>,
    partial_calls: usize,
    complete_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_partial_for(mut self, trial_index: usize) -> Self {
        self.fail_partial.insert(trial_index);
        self
    }

    pub fn failing_complete(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    pub fn stalling_complete(mut self) -> Self {
        self.stall_complete = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records accepted by `save_partial`, in arrival order.
    pub fn partial(&self) -> Vec<TrialRecord> {
        self.lock().partial.clone()
    }

    /// Every collection accepted by `save_complete`.
    pub fn complete(&self) -> Vec<Vec<TrialRecord>> {
        self.lock().complete.clone()
    }

    pub fn partial_calls(&self) -> usize {
        self.lock().partial_calls
    }

    pub fn complete_calls(&self) -> usize {
        self.lock().complete_calls
    }
}

impl Persistence for MemoryStore {
    async fn save_partial(&self, record: &TrialRecord) -> Result<(), SaveError> {
        {
            let mut inner = self.lock();
            inner.partial_calls += 1;
            if self.fail_partial.contains(&record.trial_index) {
                return Err(SaveError::Rejected(format!(
                    "partial save refused for trial {}",
                    record.trial_index
                )));
            }
            inner.partial.push(record.clone());
        }
        debug!(trial_index = record.trial_index, "memory store: partial save");
        Ok(())
    }

    async fn save_complete(&self, records: &[TrialRecord]) -> Result<(), SaveError> {
        self.lock().complete_calls += 1;
        if self.stall_complete {
            std::future::pending::<()>().await;
        }
        if self.fail_complete {
            return Err(SaveError::Rejected("complete save refused".to_string()));
        }
        self.lock().complete.push(records.to_vec());
        debug!(count = records.len(), "memory store: complete save");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingex_core::{ResponseValue, StudyPhase, TrialType};

    fn record(trial_index: usize) -> TrialRecord {
        TrialRecord {
            trial_index,
            phase: StudyPhase::Welcome,
            trial_type: TrialType::KeyboardResponse,
            rt_ms: Some(400),
            time_elapsed_ms: 400,
            response: ResponseValue::Key(" ".into()),
            task: None,
            correct: None,
            correct_response: None,
            stimulus: None,
            slider_start: None,
            tag: None,
            save_incrementally: true,
        }
    }

    #[tokio::test]
    async fn keeps_partial_records_in_order() {
        let store = MemoryStore::new();
        store.save_partial(&record(0)).await.unwrap();
        store.save_partial(&record(1)).await.unwrap();
        let indices: Vec<usize> = store.partial().iter().map(|r| r.trial_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(store.partial_calls(), 2);
    }

    #[tokio::test]
    async fn injected_partial_failure_only_hits_that_trial() {
        let store = MemoryStore::new().failing_partial_for(1);
        assert!(store.save_partial(&record(0)).await.is_ok());
        assert!(matches!(
            store.save_partial(&record(1)).await,
            Err(SaveError::Rejected(_))
        ));
        assert_eq!(store.partial().len(), 1);
        assert_eq!(store.partial_calls(), 2);
    }

    #[tokio::test]
    async fn failing_complete_counts_the_call_but_stores_nothing() {
        let store = MemoryStore::new().failing_complete();
        assert!(store.save_complete(&[record(0)]).await.is_err());
        assert_eq!(store.complete_calls(), 1);
        assert!(store.complete().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_complete_never_resolves() {
        let store = MemoryStore::new().stalling_complete();
        let records = [record(0)];
        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(60),
            store.save_complete(&records),
        )
        .await;
        assert!(outcome.is_err());
    }
}
