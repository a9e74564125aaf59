use std::time::Duration;

use lingex_core::{ResponseValue, StudyPhase, TrialRecord};
use lingex_timing::Timer;
use tracing::debug;

use crate::timeline::Timeline;
use crate::trial::{ResponseSpec, SliderControl, Trial};

/// Participant input delivered to the trial on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent {
    KeyPressed(String),
    ButtonClicked(usize),
    SliderMoved(u8),
    SliderSubmitted,
}

/// What an event did to the current trial.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Accepted; the trial stays on screen.
    Pending,
    /// Slider submitted without being moved.
    Blocked,
    /// Not applicable to the current trial.
    Ignored,
    Finished {
        record: TrialRecord,
        gap: Option<Duration>,
    },
}

/// Lifecycle of a run once the timeline hands over to the completion hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Saving,
    /// Debug mode: data shown locally, no redirect.
    Displaying,
    Exiting,
}

impl RunState {
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Running, RunState::Saving)
                | (RunState::Saving, RunState::Displaying)
                | (RunState::Saving, RunState::Exiting)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Displaying | RunState::Exiting)
    }
}

/// Walks a timeline one trial at a time and turns input into records.
pub struct ExperimentStateMachine<T: Timer> {
    timeline: Timeline,
    timer: T,
    position: usize,
    run_start: T::Timestamp,
    trial_start: Option<T::Timestamp>,
    slider: Option<SliderControl>,
    records: Vec<TrialRecord>,
}

fn as_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl<T> ExperimentStateMachine<T>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(timeline: Timeline, timer: T) -> Self {
        let run_start = timer.now();
        Self {
            timeline,
            timer,
            position: 0,
            run_start,
            trial_start: None,
            slider: None,
            records: Vec::new(),
        }
    }

    /// Puts the next trial on screen and starts its response clock.
    pub fn start_trial(&mut self) -> Option<&Trial> {
        let trial = self.timeline.get(self.position)?;
        self.trial_start = Some(self.timer.now());
        self.slider = match &trial.response {
            ResponseSpec::Slider(spec) => Some(SliderControl::new(spec)),
            _ => None,
        };
        debug!(trial_index = self.position, phase = %trial.phase, "trial started");
        Some(trial)
    }

    pub fn handle_event(&mut self, event: ExperimentEvent) -> Step {
        let Some(trial) = self.timeline.get(self.position) else {
            return Step::Ignored;
        };
        if self.trial_start.is_none() {
            return Step::Ignored;
        }

        let response = match (&trial.response, event) {
            (ResponseSpec::AnyKey, ExperimentEvent::KeyPressed(key)) => ResponseValue::Key(key),
            (ResponseSpec::Buttons { choices }, ExperimentEvent::ButtonClicked(i))
                if i < choices.len() =>
            {
                ResponseValue::Button(i)
            }
            (ResponseSpec::Slider(spec), ExperimentEvent::SliderMoved(value)) => {
                if let Some(control) = self.slider.as_mut() {
                    control.move_to(spec, value);
                }
                return Step::Pending;
            }
            (ResponseSpec::Slider(spec), ExperimentEvent::SliderSubmitted) => {
                let control = self.slider.unwrap_or_else(|| SliderControl::new(spec));
                match control.submit(spec) {
                    Ok(value) => ResponseValue::Slider(value),
                    Err(_) => {
                        debug!(
                            trial_index = self.position,
                            "slider submitted without movement"
                        );
                        return Step::Blocked;
                    }
                }
            }
            _ => return Step::Ignored,
        };

        let record = self.complete_current_trial(response);
        let gap = self
            .timeline
            .get(record.trial_index)
            .and_then(|t| t.post_trial_gap);
        Step::Finished { record, gap }
    }

    /// Completes the current trial and stores the result
    fn complete_current_trial(&mut self, response: ResponseValue) -> TrialRecord {
        let trial = &self.timeline.trials()[self.position];
        let rt_ms = self
            .trial_start
            .map(|start| as_ms(self.timer.elapsed(start)));

        let mut record = TrialRecord {
            trial_index: self.position,
            phase: trial.phase,
            trial_type: trial.trial_type(),
            rt_ms,
            time_elapsed_ms: as_ms(self.timer.elapsed(self.run_start)),
            response,
            task: trial.task(),
            correct: None,
            correct_response: None,
            stimulus: trial.item.as_ref().map(|item| item.to_ref()),
            slider_start: match &trial.response {
                ResponseSpec::Slider(spec) => Some(spec.start),
                _ => None,
            },
            tag: trial.tag.clone(),
            save_incrementally: false,
        };
        trial.on_finish(&mut record);

        debug!(
            trial_index = record.trial_index,
            phase = %record.phase,
            rt_ms = ?record.rt_ms,
            "trial finished"
        );

        self.records.push(record.clone());
        self.position += 1;
        self.trial_start = None;
        self.slider = None;
        record
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.timeline.len()
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.timeline.get(self.position)
    }

    pub fn current_phase(&self) -> Option<StudyPhase> {
        self.current_trial().map(|t| t.phase)
    }

    pub fn slider_control(&self) -> Option<&SliderControl> {
        self.slider.as_ref()
    }

    /// 1-based position within the test block, when inside it.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        let trial = self.current_trial()?;
        if trial.item.is_none() {
            return None;
        }
        let done = self.records.iter().filter(|r| r.is_judgment()).count();
        Some((done + 1, self.timeline.judgment_count()))
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TrialRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use lingex_core::stimulus::catalog;
    use lingex_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn machine() -> (ExperimentStateMachine<ManualTimer>, ManualTimer) {
        let timer = ManualTimer::new();
        let mut rng = StdRng::seed_from_u64(7);
        let timeline = Timeline::build(&ExperimentConfig::default(), &catalog()[..3], &mut rng);
        (ExperimentStateMachine::new(timeline, timer.clone()), timer)
    }

    fn finish(step: Step) -> TrialRecord {
        match step {
            Step::Finished { record, .. } => record,
            other => panic!("expected Finished, got {other:?}"),
        }
    }

    #[test]
    fn events_before_start_are_ignored() {
        let (mut sm, _) = machine();
        assert_eq!(
            sm.handle_event(ExperimentEvent::KeyPressed(" ".into())),
            Step::Ignored
        );
    }

    #[test]
    fn welcome_records_reaction_time() {
        let (mut sm, timer) = machine();
        sm.start_trial();
        timer.advance(Duration::from_millis(850));
        let record = finish(sm.handle_event(ExperimentEvent::KeyPressed("a".into())));
        assert_eq!(record.phase, StudyPhase::Welcome);
        assert_eq!(record.rt_ms, Some(850));
        assert_eq!(record.time_elapsed_ms, 850);
        assert!(!record.save_incrementally);
        assert_eq!(sm.current_phase(), Some(StudyPhase::Consent));
    }

    #[test]
    fn consent_only_accepts_existing_buttons_and_is_tagged() {
        let (mut sm, _) = machine();
        sm.start_trial();
        finish(sm.handle_event(ExperimentEvent::KeyPressed(" ".into())));
        sm.start_trial();
        assert_eq!(
            sm.handle_event(ExperimentEvent::KeyPressed(" ".into())),
            Step::Ignored
        );
        assert_eq!(
            sm.handle_event(ExperimentEvent::ButtonClicked(3)),
            Step::Ignored
        );
        let record = finish(sm.handle_event(ExperimentEvent::ButtonClicked(0)));
        assert_eq!(record.tag.as_ref().map(|t| t.internal_type.as_str()), Some("consent"));
    }

    #[test]
    fn instructions_report_the_post_trial_gap() {
        let (mut sm, _) = machine();
        sm.start_trial();
        sm.handle_event(ExperimentEvent::KeyPressed(" ".into()));
        sm.start_trial();
        sm.handle_event(ExperimentEvent::ButtonClicked(0));
        sm.start_trial();
        match sm.handle_event(ExperimentEvent::KeyPressed(" ".into())) {
            Step::Finished { gap, .. } => assert_eq!(gap, Some(Duration::from_millis(2000))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn judgment_blocks_until_slider_moves() {
        let (mut sm, _) = machine();
        for event in [
            ExperimentEvent::KeyPressed(" ".into()),
            ExperimentEvent::ButtonClicked(0),
            ExperimentEvent::KeyPressed(" ".into()),
        ] {
            sm.start_trial();
            finish(sm.handle_event(event));
        }

        sm.start_trial();
        assert_eq!(sm.trial_progress(), Some((1, 3)));
        assert_eq!(sm.handle_event(ExperimentEvent::SliderSubmitted), Step::Blocked);
        assert_eq!(sm.current_phase(), Some(StudyPhase::Test));
        assert_eq!(sm.records().len(), 3);

        assert_eq!(sm.handle_event(ExperimentEvent::SliderMoved(80)), Step::Pending);
        assert_eq!(sm.slider_control().map(|c| c.moved), Some(true));
        let record = finish(sm.handle_event(ExperimentEvent::SliderSubmitted));
        assert_eq!(record.response, ResponseValue::Slider(80));
        assert!(record.save_incrementally);
        assert_eq!(record.slider_start, Some(50));
        assert!(record.validate().is_ok());
        sm.start_trial();
        assert_eq!(sm.trial_progress(), Some((2, 3)));
    }

    #[test]
    fn run_state_only_moves_forward() {
        assert!(RunState::Running.can_transition_to(RunState::Saving));
        assert!(RunState::Saving.can_transition_to(RunState::Exiting));
        assert!(RunState::Saving.can_transition_to(RunState::Displaying));
        assert!(!RunState::Saving.can_transition_to(RunState::Running));
        assert!(!RunState::Exiting.can_transition_to(RunState::Saving));
        assert!(RunState::Exiting.is_terminal());
        assert!(!RunState::Saving.is_terminal());
    }
}
