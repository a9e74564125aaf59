use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lingex_core::{RunInfo, TrialRecord};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{Persistence, SaveError};

/// One incrementally saved trial, as written to the partial log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub run: RunInfo,
    pub saved_at: DateTime<Utc>,
    pub record: TrialRecord,
}

/// The document written by the completion save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub run: RunInfo,
    pub saved_at: DateTime<Utc>,
    pub records: Vec<TrialRecord>,
}

/// File-backed store: one JSON line per partial save, one JSON document for
/// the complete run, both named after the run's storage key.
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    run: RunInfo,
    append: Mutex<()>,
}

impl JsonlStore {
    pub async fn open(dir: impl Into<PathBuf>, run: RunInfo) -> Result<Self, SaveError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            run,
            append: Mutex::new(()),
        })
    }

    pub fn run(&self) -> &RunInfo {
        &self.run
    }

    pub fn partial_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.partial.jsonl", self.run.storage_key()))
    }

    pub fn complete_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.complete.json", self.run.storage_key()))
    }

    pub async fn read_partial(&self) -> Result<Vec<StoredRecord>, SaveError> {
        read_partial_log(&self.partial_path()).await
    }

    pub async fn read_complete(&self) -> Result<Option<StoredRun>, SaveError> {
        let path = self.complete_path();
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_partial_log(path: &Path) -> Result<Vec<StoredRecord>, SaveError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    // An append cut short by the save timeout leaves a torn line behind.
    let records: Vec<StoredRecord> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = n + 1,
                    error = %e,
                    "skipping unreadable partial record"
                );
                None
            }
        })
        .collect();
    Ok(records)
}

impl Persistence for JsonlStore {
    async fn save_partial(&self, record: &TrialRecord) -> Result<(), SaveError> {
        let entry = StoredRecord {
            run: self.run.clone(),
            saved_at: Utc::now(),
            record: record.clone(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let _guard = self.append.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.partial_path())
            .await?;
        if file.metadata().await?.len() > 0 {
            file.seek(SeekFrom::End(-1)).await?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                // keep the new record off a torn line
                line.insert(0, b'\n');
            }
        }
        file.write_all(&line).await?;
        file.flush().await?;
        debug!(
            run_id = %self.run.run_id,
            trial_index = record.trial_index,
            "partial record appended"
        );
        Ok(())
    }

    async fn save_complete(&self, records: &[TrialRecord]) -> Result<(), SaveError> {
        let doc = StoredRun {
            run: self.run.clone(),
            saved_at: Utc::now(),
            records: records.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;
        let path = self.complete_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &path).await?;
        debug!(
            run_id = %self.run.run_id,
            count = records.len(),
            path = %path.display(),
            "complete run written"
        );
        Ok(())
    }
}
