use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use lingex_core::stimulus::catalog;
use lingex_core::{ParticipantInfo, RunInfo};
use lingex_experiment::{
    ExperimentConfig, ResponseSource, RunSummary, SaveHooks, ScriptedSource, Timeline,
    TimelineRunner,
};
use lingex_store::{JsonlStore, MemoryStore, Persistence};
use lingex_timing::HighPrecisionTimer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::Cli;
use crate::terminal::{ConsoleSource, TerminalPage};

pub struct App {
    config: ExperimentConfig,
    run: RunInfo,
    data_dir: PathBuf,
    auto: bool,
    open_browser: bool,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => ExperimentConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ExperimentConfig::default(),
        };

        config.debug |= cli.debug;
        config.mock_store |= cli.mock_store;
        if let Some(code) = cli.completion_code {
            config.redirect.completion_code = code;
        }
        if let Some(url) = cli.redirect_url {
            config.redirect.url = Some(url);
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        config.validate().context("invalid experiment config")?;

        let run = RunInfo::new(ParticipantInfo {
            prolific_pid: cli.prolific_pid,
            study_id: cli.study_id,
            session_id: cli.session_id,
        });
        if run.participant.is_anonymous() {
            warn!("no PROLIFIC_PID given, saving under the run id only");
        }

        Ok(Self {
            config,
            run,
            data_dir: cli.data_dir,
            auto: cli.auto,
            open_browser: !cli.no_open,
        })
    }

    pub async fn run(self) -> Result<()> {
        println!("=== LINGUISTIC JUDGMENT STUDY ===");
        println!("Run: {}", self.run.run_id);
        if self.config.debug {
            println!("UserInfo: {:?}", self.run.participant);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let timeline = Timeline::build(&self.config, catalog(), &mut rng);
        info!(
            run_id = %self.run.run_id,
            trials = timeline.len(),
            order = ?timeline.test_order(),
            "timeline built"
        );

        let page = Arc::new(TerminalPage::new(self.open_browser));

        let summary = if self.config.mock_store {
            let store = Arc::new(MemoryStore::new());
            let summary = self
                .execute(Arc::clone(&store), page, timeline, &mut rng)
                .await?;
            info!(
                partial = store.partial().len(),
                complete = store.complete().len(),
                "mock store contents"
            );
            summary
        } else {
            let store = JsonlStore::open(&self.data_dir, self.run.clone())
                .await
                .with_context(|| format!("opening data dir {}", self.data_dir.display()))?;
            info!(path = %store.complete_path().display(), "saving run data");
            self.execute(Arc::new(store), page, timeline, &mut rng)
                .await?
        };

        println!(
            "\nExperiment completed: {} screens, {} judgments.",
            summary.trials, summary.judgments
        );
        Ok(())
    }

    async fn execute<S: Persistence>(
        &self,
        store: Arc<S>,
        page: Arc<TerminalPage>,
        timeline: Timeline,
        rng: &mut StdRng,
    ) -> Result<RunSummary> {
        let mut hooks = SaveHooks::new(self.config.clone(), store, Arc::clone(&page));

        let summary = if self.auto {
            let source = ScriptedSource::completing(&timeline, |_| rng.random_range(0..=100));
            drive(source, page, timeline, &mut hooks).await?
        } else {
            drive(ConsoleSource::stdin(), page, timeline, &mut hooks).await?
        };

        let partial = hooks.flush_partial().await;
        info!(
            saved = partial.saved,
            failed = partial.failed,
            state = ?hooks.state(),
            "incremental saves settled"
        );
        Ok(summary)
    }
}

async fn drive<R, S>(
    source: R,
    page: Arc<TerminalPage>,
    timeline: Timeline,
    hooks: &mut SaveHooks<S, TerminalPage>,
) -> Result<RunSummary>
where
    R: ResponseSource,
    S: Persistence,
{
    let mut runner = TimelineRunner::new(source, page, HighPrecisionTimer::new());
    let summary = runner
        .run(timeline, hooks)
        .await
        .context("timeline did not finish")?;
    Ok(summary)
}
