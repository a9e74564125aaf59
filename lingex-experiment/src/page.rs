use std::sync::{Mutex, MutexGuard, PoisonError};

use lingex_core::TrialRecord;
use thiserror::Error;
use tokio::time::Instant;

pub const CONTENT_CONTAINER: &str = "experiment-content";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("content container #{0} not found")]
    MissingContainer(&'static str),
}

/// The surface the participant looks at.
pub trait Page: Send + Sync + 'static {
    /// Replaces the content area only.
    fn set_content(&self, html: &str) -> Result<(), DisplayError>;
    /// Replaces everything on the page.
    fn replace_document(&self, html: &str);
    fn navigate(&self, url: &str);
    /// Operator view of the collected data.
    fn show_data(&self, records: &[TrialRecord]);
    fn update_debug_panel(&self, _record: &TrialRecord) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Content(String),
    Document(String),
    Navigate(String),
    Data(usize),
    DebugPanel(usize),
}

/// Page that remembers what was done to it and when.
#[derive(Debug)]
pub struct RecordingPage {
    has_container: bool,
    events: Mutex<Vec<(Instant, PageEvent)>>,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            has_container: true,
            events: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_container() -> Self {
        Self {
            has_container: false,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Instant, PageEvent)>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: PageEvent) {
        self.lock().push((Instant::now(), event));
    }

    pub fn timed_events(&self) -> Vec<(Instant, PageEvent)> {
        self.lock().clone()
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PageEvent::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn last_content(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            PageEvent::Content(html) => Some(html),
            _ => None,
        })
    }
}

impl Page for RecordingPage {
    fn set_content(&self, html: &str) -> Result<(), DisplayError> {
        if !self.has_container {
            return Err(DisplayError::MissingContainer(CONTENT_CONTAINER));
        }
        self.push(PageEvent::Content(html.to_string()));
        Ok(())
    }

    fn replace_document(&self, html: &str) {
        self.push(PageEvent::Document(html.to_string()));
    }

    fn navigate(&self, url: &str) {
        self.push(PageEvent::Navigate(url.to_string()));
    }

    fn show_data(&self, records: &[TrialRecord]) {
        self.push(PageEvent::Data(records.len()));
    }

    fn update_debug_panel(&self, record: &TrialRecord) {
        self.push(PageEvent::DebugPanel(record.trial_index));
    }
}
