mod app;
mod terminal;

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use app::App;

#[derive(Parser, Debug)]
#[command(
    name = "lingex",
    about = "Run the conditional-judgment study from a terminal",
    version
)]
pub struct Cli {
    /// YAML experiment config
    #[arg(long, env = "LINGEX_CONFIG")]
    config: Option<PathBuf>,

    /// Operator debug mode: show data at the end instead of redirecting
    #[arg(long, env = "LINGEX_DEBUG")]
    debug: bool,

    /// Keep saves in memory instead of writing to the data directory
    #[arg(long, env = "LINGEX_MOCK_STORE")]
    mock_store: bool,

    #[arg(long, env = "PROLIFIC_COMPLETION_CODE")]
    completion_code: Option<String>,

    #[arg(long, env = "PROLIFIC_REDIRECT_URL")]
    redirect_url: Option<String>,

    /// Directory for saved trial data
    #[arg(long, env = "LINGEX_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Fix the test-block order
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, env = "PROLIFIC_PID")]
    prolific_pid: Option<String>,

    #[arg(long, env = "STUDY_ID")]
    study_id: Option<String>,

    #[arg(long, env = "SESSION_ID")]
    session_id: Option<String>,

    /// Answer every screen automatically (dry run)
    #[arg(long)]
    auto: bool,

    /// Don't open the redirect URL in a browser
    #[arg(long)]
    no_open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug, directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let app = App::new(cli)?;
    app.run().await?;

    Ok(())
}

/// `RUST_LOG` directives win; without any, log at info (debug in debug mode).
fn log_filter(debug: bool, directives: Option<&str>) -> EnvFilter {
    let default_level = if debug { Level::DEBUG } else { Level::INFO };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_level_is_kept() {
        assert_eq!(log_filter(false, Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(false, Some("warn")).to_string(), "warn");
        assert_eq!(log_filter(true, Some("warn")).to_string(), "warn");
    }

    #[test]
    fn level_defaults_follow_debug_mode() {
        assert_eq!(log_filter(false, None).to_string(), "info");
        assert_eq!(log_filter(true, None).to_string(), "debug");
        assert_eq!(log_filter(false, Some("")).to_string(), "info");
    }
}
