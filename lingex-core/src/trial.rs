use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::phase::{Phase, StudyPhase};
use crate::stimulus::StimulusRef;

pub const SLIDER_MIN: u8 = 0;
pub const SLIDER_MAX: u8 = 100;

/// Which kind of screen produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialType {
    #[serde(rename = "html-keyboard-response")]
    KeyboardResponse,
    #[serde(rename = "html-button-response")]
    ButtonResponse,
    #[serde(rename = "html-slider-response")]
    SliderResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    Key(String),
    Button(usize),
    Slider(u8),
}

/// Machine-readable category attached to non-experimental screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialTag {
    pub internal_type: String,
    pub trial_name: String,
}

impl TrialTag {
    pub fn consent() -> Self {
        Self {
            internal_type: "consent".to_string(),
            trial_name: "consent".to_string(),
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_index: usize,
    pub phase: StudyPhase,
    pub trial_type: TrialType,
    pub rt_ms: Option<u64>,
    pub time_elapsed_ms: u64,
    pub response: ResponseValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub correct_response: Option<ResponseValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulus: Option<StimulusRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider_start: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TrialTag>,
    #[serde(default)]
    pub save_incrementally: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("trial {trial_index}: judgment record has no stimulus")]
    MissingStimulus { trial_index: usize },

    #[error("trial {trial_index}: stimulus {item_id} has empty text")]
    EmptyStimulus { trial_index: usize, item_id: usize },

    #[error("trial {trial_index}: expected a {expected} response, got {actual:?}")]
    UnexpectedResponse {
        trial_index: usize,
        expected: &'static str,
        actual: ResponseValue,
    },

    #[error("trial {trial_index}: slider value {value} outside 0..=100")]
    SliderOutOfRange { trial_index: usize, value: u8 },

    #[error("trial {trial_index}: judgment record has no task label")]
    MissingTask { trial_index: usize },

    #[error("trial {trial_index}: consent record is not tagged as consent")]
    MissingConsentTag { trial_index: usize },

    #[error("trial {trial_index}: correctness set without a correct response")]
    MissingCorrectResponse { trial_index: usize },
}

impl TrialRecord {
    pub fn is_judgment(&self) -> bool {
        self.phase.is_test_block()
    }

    /// Checks the fields a record of its phase must carry before it is stored.
    pub fn validate(&self) -> Result<(), RecordError> {
        let trial_index = self.trial_index;

        if self.phase.is_test_block() {
            let stimulus = self
                .stimulus
                .as_ref()
                .ok_or(RecordError::MissingStimulus { trial_index })?;
            if stimulus.scenario.trim().is_empty() || stimulus.prompt.trim().is_empty() {
                return Err(RecordError::EmptyStimulus {
                    trial_index,
                    item_id: stimulus.item_id,
                });
            }
            match &self.response {
                ResponseValue::Slider(value) if *value > SLIDER_MAX => {
                    return Err(RecordError::SliderOutOfRange {
                        trial_index,
                        value: *value,
                    });
                }
                ResponseValue::Slider(_) => {}
                other => {
                    return Err(RecordError::UnexpectedResponse {
                        trial_index,
                        expected: "slider",
                        actual: other.clone(),
                    });
                }
            }
            if self.task.is_none() {
                return Err(RecordError::MissingTask { trial_index });
            }
        }

        if self.phase.is_consent() {
            match &self.tag {
                Some(tag) if tag.internal_type == "consent" => {}
                _ => return Err(RecordError::MissingConsentTag { trial_index }),
            }
        }

        if self.correct.is_some() && self.correct_response.is_none() {
            return Err(RecordError::MissingCorrectResponse { trial_index });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::{Stimulus as _, catalog};

    fn judgment(value: u8) -> TrialRecord {
        TrialRecord {
            trial_index: 3,
            phase: StudyPhase::Test,
            trial_type: TrialType::SliderResponse,
            rt_ms: Some(1840),
            time_elapsed_ms: 9120,
            response: ResponseValue::Slider(value),
            task: Some(Task::Response),
            correct: None,
            correct_response: None,
            stimulus: Some(catalog()[0].to_ref()),
            slider_start: Some(50),
            tag: None,
            save_incrementally: true,
        }
    }

    #[test]
    fn valid_judgment_passes() {
        assert_eq!(judgment(72).validate(), Ok(()));
        assert!(judgment(72).is_judgment());
    }

    #[test]
    fn judgment_without_stimulus_is_rejected() {
        let mut record = judgment(10);
        record.stimulus = None;
        assert_eq!(
            record.validate(),
            Err(RecordError::MissingStimulus { trial_index: 3 })
        );
    }

    #[test]
    fn judgment_with_key_response_is_rejected() {
        let mut record = judgment(10);
        record.response = ResponseValue::Key("f".into());
        assert!(matches!(
            record.validate(),
            Err(RecordError::UnexpectedResponse { expected: "slider", .. })
        ));
    }

    #[test]
    fn slider_above_max_is_rejected() {
        assert_eq!(
            judgment(101).validate(),
            Err(RecordError::SliderOutOfRange {
                trial_index: 3,
                value: 101
            })
        );
    }

    #[test]
    fn consent_requires_tag() {
        let mut record = TrialRecord {
            trial_index: 1,
            phase: StudyPhase::Consent,
            trial_type: TrialType::ButtonResponse,
            rt_ms: Some(5000),
            time_elapsed_ms: 6000,
            response: ResponseValue::Button(0),
            task: None,
            correct: None,
            correct_response: None,
            stimulus: None,
            slider_start: None,
            tag: None,
            save_incrementally: false,
        };
        assert_eq!(
            record.validate(),
            Err(RecordError::MissingConsentTag { trial_index: 1 })
        );
        record.tag = Some(TrialTag::consent());
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn correctness_needs_a_correct_response() {
        let mut record = judgment(40);
        record.correct = Some(true);
        assert_eq!(
            record.validate(),
            Err(RecordError::MissingCorrectResponse { trial_index: 3 })
        );
        record.correct_response = Some(ResponseValue::Slider(40));
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn serialized_record_uses_runner_field_names() {
        let value = serde_json::to_value(judgment(64)).unwrap();
        assert_eq!(value["trial_type"], "html-slider-response");
        assert_eq!(value["phase"], "test");
        assert_eq!(value["response"]["kind"], "slider");
        assert_eq!(value["response"]["value"], 64);
        assert_eq!(value["save_incrementally"], true);
        assert!(value.get("tag").is_none());
        assert_eq!(
            value["stimulus"]["scenario"].as_str().map(str::len),
            Some(catalog()[0].scenario.len())
        );
        assert!(catalog()[0].render().contains(catalog()[0].prompt));
    }

    #[test]
    fn missing_save_flag_defaults_to_false() {
        let json = r#"{
            "trial_index": 0,
            "phase": "welcome",
            "trial_type": "html-keyboard-response",
            "rt_ms": 812,
            "time_elapsed_ms": 812,
            "response": { "kind": "key", "value": " " },
            "correct": null,
            "correct_response": null
        }"#;
        let record: TrialRecord = serde_json::from_str(json).unwrap();
        assert!(!record.save_incrementally);
        assert_eq!(record.phase, StudyPhase::Welcome);
    }
}
