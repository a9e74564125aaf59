use std::time::Duration;

use lingex_core::{Phase, Stimulus, StimulusItem, StudyPhase, TrialTag};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::ExperimentConfig;
use crate::trial::{ResponseSpec, SliderSpec, Trial};

pub const WELCOME_HTML: &str =
    r#"<span class="text-xl">Welcome to the experiment. Press any key to begin.</span>"#;

pub const CONSENT_HTML: &str = r#"
<div style="margin-left: 200px; margin-right: 200px; text-align: left;">
  <b><p style="margin-bottom: 20px;">Please consider this information carefully before deciding whether to participate in this research.</p></b>

  <p style="margin-bottom: 20px;">The purpose of this research is to examine which factors influence linguistic meaning. You will be asked to make judgements about the meaning of sentences in different scenarios. We are simply interested in your judgement. The study will take less than 1 hour to complete, and you will receive less than $20 on Prolific. Your compensation and time commitment are specified in the study description. There are no anticipated risks associated with participating in this study. The effects of participating should be comparable to those you would ordinarily experience from viewing a computer monitor and using a mouse or keyboard for a similar amount of time. At the end of the study, we will provide an explanation of the questions that motivate this line of research and will describe the potential implications.</p>

  <p style="margin-bottom: 20px;">Your participation in this study is completely voluntary and you may refuse to participate or you may choose to withdraw at any time without penalty or loss of benefits to you which are otherwise entitled. Your participation in this study will remain confidential. No personally identifiable information will be associated with your data. Also, all analyses of the data will be averaged across all the participants, so your individual responses will never be specifically analyzed.</p>

  <p style="margin-bottom: 20px;">If you have questions or concerns about your participation or payment, or want to request a summary of research findings, please contact Dr. Jonathan Phillips at <a href="mailto:Jonathan.S.Phillips@dartmouth.edu">Jonathan.S.Phillips@dartmouth.edu</a>.</p>

  <p style="margin-bottom: 20px;">Please save a copy of this form for your records.</p>

  <h3><b>Agreement:</b></h3>

  <p>The nature and purpose of this research have been sufficiently explained and I agree to participate in this study. I understand that I am free to withdraw at any time without incurring any penalty. Please consent by clicking the button below to continue. Otherwise, please exit the study at any time.</p>
</div>
"#;

pub const INSTRUCTIONS_HTML: &str = r#"
<p>In this experiment, you will be given a scenario and then asked to evaluate whether, given the scenario, you believe an individual would accept a statement.</p>
<p>Press any key to begin.</p>
"#;

pub const DEBRIEF_HTML: &str = r#"<p>Press any key to complete the experiment. Thank you!</p>"#;

/// Ordered screens for one participant. Built once, then handed to the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    trials: Vec<Trial>,
}

impl Timeline {
    /// Welcome, consent, instructions, the shuffled test block, debrief.
    pub fn build<R: Rng + ?Sized>(
        config: &ExperimentConfig,
        items: &[StimulusItem],
        rng: &mut R,
    ) -> Self {
        let mut trials = vec![welcome(), consent(), instructions(config.post_trial_gap())];
        trials.extend(test_block(items, config.repetitions, rng));
        trials.push(debrief());
        Self { trials }
    }

    pub fn from_trials(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trial> {
        self.trials.get(index)
    }

    pub fn judgment_count(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| t.phase.is_test_block())
            .count()
    }

    /// Stimulus ids of the test block, in presentation order.
    pub fn test_order(&self) -> Vec<usize> {
        self.trials
            .iter()
            .filter_map(|t| t.item.as_ref().map(|item| item.id))
            .collect()
    }

    /// True when the phases never step backwards.
    pub fn follows_phase_order(&self) -> bool {
        let mut phase = StudyPhase::default();
        for trial in &self.trials {
            while trial.phase != phase {
                match phase.next() {
                    Some(next) => phase = next,
                    None => return false,
                }
            }
        }
        true
    }
}

pub fn welcome() -> Trial {
    Trial {
        phase: StudyPhase::Welcome,
        stimulus_html: WELCOME_HTML.to_string(),
        response: ResponseSpec::AnyKey,
        post_trial_gap: None,
        tag: None,
        item: None,
        save_incrementally: false,
    }
}

pub fn consent() -> Trial {
    Trial {
        phase: StudyPhase::Consent,
        stimulus_html: CONSENT_HTML.to_string(),
        response: ResponseSpec::Buttons {
            choices: vec!["Submit".to_string()],
        },
        post_trial_gap: None,
        tag: Some(TrialTag::consent()),
        item: None,
        save_incrementally: false,
    }
}

pub fn instructions(gap: Duration) -> Trial {
    Trial {
        phase: StudyPhase::Instructions,
        stimulus_html: INSTRUCTIONS_HTML.to_string(),
        response: ResponseSpec::AnyKey,
        post_trial_gap: Some(gap),
        tag: None,
        item: None,
        save_incrementally: false,
    }
}

pub fn judgment(item: StimulusItem) -> Trial {
    Trial {
        phase: StudyPhase::Test,
        stimulus_html: item.render(),
        response: ResponseSpec::Slider(SliderSpec::judgment()),
        post_trial_gap: None,
        tag: None,
        item: Some(item),
        save_incrementally: true,
    }
}

/// Each repetition is shuffled independently.
pub fn test_block<R: Rng + ?Sized>(
    items: &[StimulusItem],
    repetitions: usize,
    rng: &mut R,
) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(items.len() * repetitions);
    for _ in 0..repetitions {
        let mut order: Vec<StimulusItem> = items.to_vec();
        order.shuffle(rng);
        trials.extend(order.into_iter().map(judgment));
    }
    trials
}

pub fn debrief() -> Trial {
    Trial {
        phase: StudyPhase::Debrief,
        stimulus_html: DEBRIEF_HTML.to_string(),
        response: ResponseSpec::AnyKey,
        post_trial_gap: None,
        tag: None,
        item: None,
        save_incrementally: false,
    }
}
