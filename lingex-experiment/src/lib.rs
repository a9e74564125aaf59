pub mod config;
pub mod exit;
pub mod hooks;
pub mod page;
pub mod runner;
pub mod state;
pub mod timeline;
pub mod trial;

pub use config::{ConfigError, ExperimentConfig, RedirectConfig};
pub use exit::ExitScreen;
pub use hooks::{PartialSaveSummary, SaveHooks};
pub use page::{DisplayError, Page, PageEvent, RecordingPage};
pub use runner::{
    ResponseSource, RunSummary, RunnerError, ScriptedSource, TimelineCallbacks, TimelineRunner,
};
pub use state::{ExperimentEvent, ExperimentStateMachine, RunState, Step};
pub use timeline::Timeline;
pub use trial::{ResponseSpec, SliderControl, SliderSpec, Trial};
