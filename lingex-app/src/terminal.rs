use std::io;
use std::sync::LazyLock;

use lingex_core::TrialRecord;
use lingex_experiment::{
    DisplayError, ExperimentEvent, Page, ResponseSource, ResponseSpec, RunnerError, SliderControl,
    Trial,
};
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</h3>|</div>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Plain-text rendering of a screen's HTML.
pub fn strip_html(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Page printed to stdout. Redirects open the system browser.
pub struct TerminalPage {
    open_browser: bool,
}

impl TerminalPage {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl Page for TerminalPage {
    fn set_content(&self, html: &str) -> Result<(), DisplayError> {
        println!("\n{}", "-".repeat(60));
        println!("{}", strip_html(html));
        Ok(())
    }

    fn replace_document(&self, html: &str) {
        println!("\n{}", "=".repeat(60));
        println!("{}", strip_html(html));
        println!("{}", "=".repeat(60));
    }

    fn navigate(&self, url: &str) {
        println!("Redirecting to {url}");
        if self.open_browser {
            if let Err(e) = open::that(url) {
                warn!(error = %e, url, "could not open browser");
            }
        }
    }

    fn show_data(&self, records: &[TrialRecord]) {
        match serde_json::to_string_pretty(records) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(error = %e, "could not render trial data"),
        }
    }

    fn update_debug_panel(&self, record: &TrialRecord) {
        eprintln!(
            "[debug panel] saved trial {} ({})",
            record.trial_index, record.phase
        );
    }
}

/// Participant input read line by line. Lines typed before the current screen
/// was presented are dropped.
pub struct ConsoleSource {
    lines: mpsc::UnboundedReceiver<(Instant, io::Result<String>)>,
    presented_at: Instant,
}

impl ConsoleSource {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Reads lines from `reader` on a background task, stamping each one on
    /// arrival.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                let (line, done) = match lines.next_line().await {
                    Ok(Some(line)) => (Ok(line), false),
                    Ok(None) => break,
                    Err(e) => (Err(e), true),
                };
                if tx.send((Instant::now(), line)).is_err() || done {
                    break;
                }
            }
        });
        Self {
            lines: rx,
            presented_at: Instant::now(),
        }
    }

    async fn read_line(&mut self, trial_index: usize) -> Result<String, RunnerError> {
        loop {
            match self.lines.recv().await {
                Some((at, Ok(_))) if at < self.presented_at => {
                    debug!(trial_index, "dropping input typed before the screen appeared");
                }
                Some((_, Ok(line))) => return Ok(line.trim().to_string()),
                Some((_, Err(e))) => return Err(e.into()),
                None => return Err(RunnerError::InputClosed(trial_index)),
            }
        }
    }
}

impl ResponseSource for ConsoleSource {
    async fn next_event(
        &mut self,
        trial: &Trial,
        trial_index: usize,
        slider: Option<&SliderControl>,
    ) -> Result<ExperimentEvent, RunnerError> {
        match &trial.response {
            ResponseSpec::AnyKey => {
                println!("[press Enter to continue]");
                let line = self.read_line(trial_index).await?;
                let key = if line.is_empty() { "Enter".to_string() } else { line };
                Ok(ExperimentEvent::KeyPressed(key))
            }
            ResponseSpec::Buttons { choices } => {
                for (i, choice) in choices.iter().enumerate() {
                    println!("  [{i}] {choice}");
                }
                loop {
                    println!("Type the number of your choice:");
                    let line = self.read_line(trial_index).await?;
                    match line.parse::<usize>() {
                        Ok(i) if i < choices.len() => return Ok(ExperimentEvent::ButtonClicked(i)),
                        _ => println!("Please pick one of the listed numbers."),
                    }
                }
            }
            ResponseSpec::Slider(spec) => {
                let current = slider.map(|c| c.value).unwrap_or(spec.start);
                println!(
                    "{} (at {current}, {}..{}) | type a value to move the slider, Enter to submit",
                    spec.labels.join(" / "),
                    spec.min,
                    spec.max,
                );
                loop {
                    let line = self.read_line(trial_index).await?;
                    if line.is_empty() {
                        return Ok(ExperimentEvent::SliderSubmitted);
                    }
                    match line.parse::<u8>() {
                        Ok(value) => return Ok(ExperimentEvent::SliderMoved(value)),
                        Err(_) => println!("Please enter a number from {} to {}.", spec.min, spec.max),
                    }
                }
            }
        }
    }

    fn presented(&mut self, _trial: &Trial) {
        self.presented_at = Instant::now();
    }

    fn blocked(&mut self, _trial: &Trial) {
        println!("Please move the slider before continuing.");
    }
}
