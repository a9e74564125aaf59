use std::collections::VecDeque;
use std::sync::Arc;

use lingex_core::TrialRecord;
use lingex_timing::Timer;
use thiserror::Error;
use tracing::{debug, info};

use crate::page::Page;
use crate::state::{ExperimentEvent, ExperimentStateMachine, Step};
use crate::timeline::Timeline;
use crate::trial::{ResponseSpec, SliderControl, Trial};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("input closed before trial {0} finished")]
    InputClosed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hooks the runner calls as the timeline progresses.
pub trait TimelineCallbacks {
    fn on_trial_finished(&mut self, record: &TrialRecord);
    fn on_timeline_finished(&mut self, records: Vec<TrialRecord>) -> impl Future<Output = ()>;
}

/// Where participant input comes from.
pub trait ResponseSource {
    fn next_event(
        &mut self,
        trial: &Trial,
        trial_index: usize,
        slider: Option<&SliderControl>,
    ) -> impl Future<Output = Result<ExperimentEvent, RunnerError>>;

    /// Called once the trial's screen is up, after any post-trial gap.
    fn presented(&mut self, _trial: &Trial) {}

    /// Called when a submission was refused because the slider never moved.
    fn blocked(&mut self, _trial: &Trial) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub trials: usize,
    pub judgments: usize,
}

/// HTML for a trial screen, including its response controls.
pub fn screen_html(trial: &Trial) -> String {
    let mut html = trial.stimulus_html.clone();
    match &trial.response {
        ResponseSpec::AnyKey => {}
        ResponseSpec::Buttons { choices } => {
            html.push_str("\n<div class=\"choices\">");
            for (i, choice) in choices.iter().enumerate() {
                html.push_str(&format!(
                    "<button data-choice=\"{i}\">{choice}</button>"
                ));
            }
            html.push_str("</div>");
        }
        ResponseSpec::Slider(spec) => {
            html.push_str(&format!(
                "\n<div class=\"slider\" style=\"width: {}px;\" data-min=\"{}\" data-max=\"{}\" data-start=\"{}\">",
                spec.width_px, spec.min, spec.max, spec.start
            ));
            for label in &spec.labels {
                html.push_str(&format!("<span>{label}</span>"));
            }
            html.push_str("</div>");
        }
    }
    html
}

/// Presents a timeline trial by trial, feeding records to the callbacks.
pub struct TimelineRunner<R, P, T> {
    source: R,
    page: Arc<P>,
    timer: T,
}

impl<R, P, T> TimelineRunner<R, P, T>
where
    R: ResponseSource,
    P: Page,
    T: Timer<Timestamp = u64>,
{
    pub fn new(source: R, page: Arc<P>, timer: T) -> Self {
        Self {
            source,
            page,
            timer,
        }
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub async fn run<C: TimelineCallbacks>(
        &mut self,
        timeline: Timeline,
        callbacks: &mut C,
    ) -> Result<RunSummary, RunnerError> {
        info!(trials = timeline.len(), "timeline started");
        let mut sm = ExperimentStateMachine::new(timeline, self.timer.clone());

        while let Some(trial) = sm.start_trial() {
            let trial = trial.clone();
            if let Err(e) = self.page.set_content(&screen_html(&trial)) {
                debug!(error = %e, "trial screen skipped");
            }
            self.source.presented(&trial);

            loop {
                let trial_index = sm.records().len();
                let event = self
                    .source
                    .next_event(&trial, trial_index, sm.slider_control())
                    .await?;
                match sm.handle_event(event) {
                    Step::Pending | Step::Ignored => {}
                    Step::Blocked => self.source.blocked(&trial),
                    Step::Finished { record, gap } => {
                        callbacks.on_trial_finished(&record);
                        if let Some(gap) = gap {
                            tokio::time::sleep(gap).await;
                        }
                        break;
                    }
                }
            }
        }

        let records = sm.into_records();
        let summary = RunSummary {
            trials: records.len(),
            judgments: records.iter().filter(|r| r.is_judgment()).count(),
        };
        info!(
            trials = summary.trials,
            judgments = summary.judgments,
            "timeline finished"
        );
        callbacks.on_timeline_finished(records).await;
        Ok(summary)
    }
}

/// Pre-recorded participant input.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<ExperimentEvent>,
    blocked: usize,
    presented: usize,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = ExperimentEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            blocked: 0,
            presented: 0,
        }
    }

    /// Input that walks the whole timeline, answering judgment `n` with
    /// `slider_value(n)`.
    pub fn completing(timeline: &Timeline, mut slider_value: impl FnMut(usize) -> u8) -> Self {
        let mut events = Vec::new();
        let mut judgment = 0;
        for trial in timeline.trials() {
            match &trial.response {
                ResponseSpec::AnyKey => events.push(ExperimentEvent::KeyPressed(" ".into())),
                ResponseSpec::Buttons { .. } => events.push(ExperimentEvent::ButtonClicked(0)),
                ResponseSpec::Slider(_) => {
                    events.push(ExperimentEvent::SliderMoved(slider_value(judgment)));
                    events.push(ExperimentEvent::SliderSubmitted);
                    judgment += 1;
                }
            }
        }
        Self::new(events)
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked
    }

    pub fn presented_count(&self) -> usize {
        self.presented
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl ResponseSource for ScriptedSource {
    async fn next_event(
        &mut self,
        _trial: &Trial,
        trial_index: usize,
        _slider: Option<&SliderControl>,
    ) -> Result<ExperimentEvent, RunnerError> {
        self.events
            .pop_front()
            .ok_or(RunnerError::InputClosed(trial_index))
    }

    fn presented(&mut self, _trial: &Trial) {
        self.presented += 1;
    }

    fn blocked(&mut self, _trial: &Trial) {
        self.blocked += 1;
    }
}
