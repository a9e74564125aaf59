use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use lingex_core::stimulus::catalog;
use lingex_experiment::{ExperimentConfig, ExperimentEvent, ExperimentStateMachine, Step, Timeline};
use lingex_timing::ManualTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn bench_build(c: &mut Criterion) {
    let config = ExperimentConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("timeline_build", |b| {
        b.iter(|| black_box(Timeline::build(&config, catalog(), &mut rng)))
    });
}

pub fn bench_walk(c: &mut Criterion) {
    let config = ExperimentConfig::default();
    let mut rng = StdRng::seed_from_u64(2);
    let timeline = Timeline::build(&config, catalog(), &mut rng);

    c.bench_function("timeline_walk", |b| {
        b.iter_batched(
            || ExperimentStateMachine::new(timeline.clone(), ManualTimer::new()),
            |mut sm| {
                while let Some(trial) = sm.start_trial() {
                    let events = match &trial.response {
                        lingex_experiment::ResponseSpec::AnyKey => {
                            vec![ExperimentEvent::KeyPressed(" ".into())]
                        }
                        lingex_experiment::ResponseSpec::Buttons { .. } => {
                            vec![ExperimentEvent::ButtonClicked(0)]
                        }
                        lingex_experiment::ResponseSpec::Slider(_) => vec![
                            ExperimentEvent::SliderMoved(70),
                            ExperimentEvent::SliderSubmitted,
                        ],
                    };
                    for event in events {
                        if let Step::Finished { record, .. } = sm.handle_event(event) {
                            black_box(record);
                        }
                    }
                }
                sm.into_records()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build, bench_walk);
criterion_main!(benches);
