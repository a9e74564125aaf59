pub mod participant;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use participant::{ParticipantInfo, RunInfo};
pub use phase::{Phase, StudyPhase};
pub use stimulus::{Stimulus, StimulusItem, StimulusRef};
pub use trial::{RecordError, ResponseValue, Task, TrialRecord, TrialTag, TrialType};
