use serde::{Deserialize, Serialize};

/// Defines experiment phases and their order
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn next(&self) -> Option<Self>;

    fn is_consent(&self) -> bool {
        false
    }
    fn is_test_block(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudyPhase {
    #[default]
    Welcome,
    Consent,
    Instructions,
    Test,
    Debrief,
}

impl StudyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyPhase::Welcome => "welcome",
            StudyPhase::Consent => "consent",
            StudyPhase::Instructions => "instructions",
            StudyPhase::Test => "test",
            StudyPhase::Debrief => "debrief",
        }
    }
}

impl std::fmt::Display for StudyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Phase for StudyPhase {
    fn next(&self) -> Option<Self> {
        use StudyPhase::*;
        Some(match self {
            Welcome => Consent,
            Consent => Instructions,
            Instructions => Test,
            Test => Debrief,
            Debrief => return None,
        })
    }

    fn is_consent(&self) -> bool {
        matches!(self, StudyPhase::Consent)
    }

    fn is_test_block(&self) -> bool {
        matches!(self, StudyPhase::Test)
    }
}
