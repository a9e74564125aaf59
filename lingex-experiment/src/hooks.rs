use std::sync::Arc;
use std::time::Duration;

use lingex_core::TrialRecord;
use lingex_store::{Persistence, SaveError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ExperimentConfig;
use crate::exit::ExitScreen;
use crate::page::Page;
use crate::runner::TimelineCallbacks;
use crate::state::RunState;

pub const SAVING_MESSAGE: &str = "<p> Please wait, your data are being saved.</p>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialSaveSummary {
    pub saved: usize,
    pub failed: usize,
}

async fn with_timeout<F>(limit: Duration, save: F) -> Result<(), SaveError>
where
    F: Future<Output = Result<(), SaveError>>,
{
    match tokio::time::timeout(limit, save).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SaveError::TimedOut(limit)),
    }
}

/// The two callbacks the runner drives: per-trial incremental saves and the
/// single completion save that ends the run.
pub struct SaveHooks<S: Persistence, P: Page> {
    store: Arc<S>,
    page: Arc<P>,
    config: ExperimentConfig,
    exit: ExitScreen,
    state: RunState,
    pending: Vec<JoinHandle<Result<(), SaveError>>>,
    issued: usize,
}

impl<S: Persistence, P: Page> SaveHooks<S, P> {
    pub fn new(config: ExperimentConfig, store: Arc<S>, page: Arc<P>) -> Self {
        let exit = ExitScreen::from_config(&config);
        Self {
            store,
            page,
            config,
            exit,
            state: RunState::Running,
            pending: Vec::new(),
            issued: 0,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Incremental saves spawned so far.
    pub fn partial_issued(&self) -> usize {
        self.issued
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "{:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    /// Forwards a flagged record to the store without blocking the timeline.
    /// Records failing validation are refused with `SaveError::Invalid`.
    pub fn save_incrementally(&mut self, record: &TrialRecord) -> Result<(), SaveError> {
        if !record.save_incrementally {
            return Ok(());
        }
        record.validate()?;

        let store = Arc::clone(&self.store);
        let page = Arc::clone(&self.page);
        let record = record.clone();
        let limit = self.config.save_timeout();
        let debug_mode = self.config.debug;
        let mock_store = self.config.mock_store;

        let handle = tokio::spawn(async move {
            let outcome = with_timeout(limit, store.save_partial(&record)).await;
            match &outcome {
                Ok(()) if debug_mode => {
                    debug!(trial_index = record.trial_index, "partial save succeeded");
                    if mock_store {
                        page.update_debug_panel(&record);
                    }
                }
                Ok(()) => {}
                Err(e) => {
                    error!(
                        trial_index = record.trial_index,
                        error = %e,
                        "partial save failed"
                    );
                }
            }
            outcome
        });
        self.pending.push(handle);
        self.issued += 1;
        Ok(())
    }

    /// Saves the whole run, then shows the exit screen (or the data, in debug
    /// mode). Runs once; later calls are ignored.
    pub async fn complete(&mut self, records: Vec<TrialRecord>) -> RunState {
        if self.state != RunState::Running {
            warn!(state = ?self.state, "completion hook called again, ignoring");
            return self.state;
        }
        self.transition(RunState::Saving);

        if let Err(e) = self.page.set_content(SAVING_MESSAGE) {
            debug!(error = %e, "saving message skipped");
        }
        for record in &records {
            if let Err(e) = record.validate() {
                warn!(trial_index = record.trial_index, error = %e, "saving malformed record");
            }
        }

        let limit = self.config.save_timeout();
        let outcome = with_timeout(limit, self.store.save_complete(&records)).await;

        match outcome {
            Ok(()) if self.config.debug => {
                info!(count = records.len(), "complete save succeeded");
                self.transition(RunState::Displaying);
                self.exit.show_in_place(&*self.page);
                tokio::time::sleep(self.exit.delay).await;
                self.page.show_data(&records);
            }
            Ok(()) => {
                info!(count = records.len(), "complete save succeeded");
                self.transition(RunState::Exiting);
                self.exit.exit(&*self.page).await;
            }
            Err(e) => {
                error!(count = records.len(), error = %e, "complete save failed");
                self.transition(RunState::Exiting);
                self.exit.exit(&*self.page).await;
            }
        }
        self.state
    }

    /// Waits for every incremental save spawned so far.
    pub async fn flush_partial(&mut self) -> PartialSaveSummary {
        let mut summary = PartialSaveSummary::default();
        for handle in self.pending.drain(..) {
            match handle.await {
                Ok(Ok(())) => summary.saved += 1,
                Ok(Err(_)) => summary.failed += 1,
                Err(e) => {
                    error!(error = %e, "partial save task failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

impl<S: Persistence, P: Page> TimelineCallbacks for SaveHooks<S, P> {
    fn on_trial_finished(&mut self, record: &TrialRecord) {
        if let Err(e) = self.save_incrementally(record) {
            warn!(
                trial_index = record.trial_index,
                error = %e,
                "record refused for incremental save"
            );
        }
    }

    async fn on_timeline_finished(&mut self, records: Vec<TrialRecord>) {
        self.complete(records).await;
    }
}
