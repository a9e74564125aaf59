use std::time::Duration;

use lingex_core::trial::{SLIDER_MAX, SLIDER_MIN};
use lingex_core::{Phase, StimulusItem, StudyPhase, Task, TrialRecord, TrialTag, TrialType};

/// One screen of the timeline, as handed to the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub phase: StudyPhase,
    pub stimulus_html: String,
    pub response: ResponseSpec,
    pub post_trial_gap: Option<Duration>,
    pub tag: Option<TrialTag>,
    pub item: Option<StimulusItem>,
    /// Applied to the record when the trial finishes.
    pub save_incrementally: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSpec {
    AnyKey,
    Buttons { choices: Vec<String> },
    Slider(SliderSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderSpec {
    pub min: u8,
    pub max: u8,
    pub start: u8,
    pub labels: Vec<String>,
    pub width_px: u32,
    pub require_movement: bool,
}

impl SliderSpec {
    /// The three-point "no / unsure / yes" judgment scale.
    pub fn judgment() -> Self {
        Self {
            min: SLIDER_MIN,
            max: SLIDER_MAX,
            start: 50,
            labels: vec!["no".into(), "unsure".into(), "yes".into()],
            width_px: 500,
            require_movement: true,
        }
    }
}

impl Trial {
    pub fn trial_type(&self) -> TrialType {
        match self.response {
            ResponseSpec::AnyKey => TrialType::KeyboardResponse,
            ResponseSpec::Buttons { .. } => TrialType::ButtonResponse,
            ResponseSpec::Slider(_) => TrialType::SliderResponse,
        }
    }

    pub fn task(&self) -> Option<Task> {
        self.phase.is_test_block().then_some(Task::Response)
    }

    pub fn on_finish(&self, record: &mut TrialRecord) {
        if self.save_incrementally {
            record.save_incrementally = true;
        }
    }
}

/// Submission refused because the participant never touched the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRequired;

/// Live state of a slider while its trial is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderControl {
    pub value: u8,
    pub moved: bool,
}

impl SliderControl {
    pub fn new(spec: &SliderSpec) -> Self {
        Self {
            value: spec.start,
            moved: false,
        }
    }

    pub fn move_to(&mut self, spec: &SliderSpec, value: u8) {
        self.value = value.clamp(spec.min, spec.max);
        self.moved = true;
    }

    pub fn submit(&self, spec: &SliderSpec) -> Result<u8, MovementRequired> {
        if spec.require_movement && !self.moved {
            return Err(MovementRequired);
        }
        Ok(self.value)
    }
}
