use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiers the survey panel passes along with the participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    #[serde(default)]
    pub prolific_pid: Option<String>,
    #[serde(default)]
    pub study_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ParticipantInfo {
    pub fn is_anonymous(&self) -> bool {
        self.prolific_pid.is_none()
    }
}

/// One participant's run, attached to everything that gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub participant: ParticipantInfo,
    pub started_at: DateTime<Utc>,
}

impl RunInfo {
    pub fn new(participant: ParticipantInfo) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            participant,
            started_at: Utc::now(),
        }
    }

    /// Name used for per-run storage keys: the participant id when known.
    pub fn storage_key(&self) -> String {
        match &self.participant.prolific_pid {
            Some(pid) => format!("{pid}-{}", self.run_id.simple()),
            None => self.run_id.simple().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_runs_are_keyed_by_run_id() {
        let run = RunInfo::new(ParticipantInfo::default());
        assert!(run.participant.is_anonymous());
        assert_eq!(run.storage_key(), run.run_id.simple().to_string());
    }

    #[test]
    fn known_participants_prefix_the_key() {
        let run = RunInfo::new(ParticipantInfo {
            prolific_pid: Some("5f1a".into()),
            study_id: Some("study".into()),
            session_id: None,
        });
        assert!(run.storage_key().starts_with("5f1a-"));
        assert_ne!(RunInfo::new(ParticipantInfo::default()).run_id, run.run_id);
    }
}
