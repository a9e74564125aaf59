use std::collections::HashSet;
use std::time::Duration;

use lingex_core::stimulus::catalog;
use lingex_core::{Stimulus, StudyPhase};
use lingex_experiment::{ExperimentConfig, ResponseSpec, Timeline};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn build(seed: u64) -> Timeline {
    let mut rng = StdRng::seed_from_u64(seed);
    Timeline::build(&ExperimentConfig::default(), catalog(), &mut rng)
}

#[test]
fn screens_come_in_study_order() {
    let timeline = build(1);
    assert!(timeline.follows_phase_order());
    assert_eq!(timeline.len(), catalog().len() + 4);

    let trials = timeline.trials();
    assert_eq!(trials[0].phase, StudyPhase::Welcome);
    assert_eq!(trials[1].phase, StudyPhase::Consent);
    assert_eq!(trials[2].phase, StudyPhase::Instructions);
    assert_eq!(trials.last().map(|t| t.phase), Some(StudyPhase::Debrief));
}

#[test]
fn consent_is_tagged_and_has_one_button() {
    let timeline = build(2);
    let consent = &timeline.trials()[1];
    let tag = consent.tag.as_ref().expect("consent tag");
    assert_eq!(tag.internal_type, "consent");
    assert_eq!(tag.trial_name, "consent");
    assert_eq!(
        consent.response,
        ResponseSpec::Buttons {
            choices: vec!["Submit".to_string()]
        }
    );
}

#[test]
fn only_instructions_wait_before_the_next_screen() {
    let timeline = build(3);
    let gaps: Vec<(StudyPhase, Duration)> = timeline
        .trials()
        .iter()
        .filter_map(|t| t.post_trial_gap.map(|gap| (t.phase, gap)))
        .collect();
    assert_eq!(
        gaps,
        vec![(StudyPhase::Instructions, Duration::from_millis(2000))]
    );
}

#[test]
fn test_block_presents_every_item_once_as_a_flagged_slider() {
    let timeline = build(4);
    assert_eq!(timeline.judgment_count(), catalog().len());

    let order = timeline.test_order();
    let unique: HashSet<usize> = order.iter().copied().collect();
    assert_eq!(unique.len(), catalog().len());

    for trial in timeline.trials().iter().filter(|t| t.phase == StudyPhase::Test) {
        let item = trial.item.expect("judgment item");
        assert_eq!(trial.stimulus_html, item.render());
        assert!(trial.save_incrementally);
        let ResponseSpec::Slider(spec) = &trial.response else {
            panic!("judgment trials use the slider");
        };
        assert!(spec.require_movement);
        assert_eq!(spec.labels, vec!["no", "unsure", "yes"]);
        assert_eq!(spec.width_px, 500);
    }
    for trial in timeline.trials().iter().filter(|t| t.phase != StudyPhase::Test) {
        assert!(!trial.save_incrementally);
        assert!(trial.item.is_none());
    }
}

#[test]
fn repetitions_repeat_the_block_with_fresh_shuffles() {
    let mut config = ExperimentConfig::default();
    config.repetitions = 3;
    let mut rng = StdRng::seed_from_u64(5);
    let timeline = Timeline::build(&config, catalog(), &mut rng);
    assert_eq!(timeline.judgment_count(), 3 * catalog().len());
    assert!(timeline.follows_phase_order());

    let order = timeline.test_order();
    let n = catalog().len();
    for block in order.chunks(n) {
        let unique: HashSet<usize> = block.iter().copied().collect();
        assert_eq!(unique.len(), n);
    }
    assert_ne!(order[..n], order[n..2 * n]);
}

#[test]
fn order_is_roughly_uniform_over_positions() {
    let n = catalog().len();
    let runs = 4000;
    let mut counts = vec![vec![0usize; n]; n];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let config = ExperimentConfig::default();

    for _ in 0..runs {
        let timeline = Timeline::build(&config, catalog(), &mut rng);
        for (position, id) in timeline.test_order().into_iter().enumerate() {
            counts[id][position] += 1;
        }
    }

    let expected = runs / n;
    for (id, row) in counts.iter().enumerate() {
        for (position, &count) in row.iter().enumerate() {
            assert!(
                count > expected * 6 / 10 && count < expected * 14 / 10,
                "item {id} at position {position}: {count} (expected ~{expected})"
            );
        }
    }
}

#[test]
fn out_of_order_timeline_is_detected() {
    let timeline = build(6);
    let mut trials = timeline.trials().to_vec();
    trials.swap(0, 1);
    assert!(!Timeline::from_trials(trials).follows_phase_order());
}
