//! Durable keyed store for bin status overrides.
//!
//! The whole override map lives in one JSON file, read fully at startup and
//! rewritten fully on each update. Writes go through a temp file + rename so
//! a crash mid-write cannot corrupt the store, and the in-memory map is only
//! updated after the file hit disk: a failed persist surfaces as an error,
//! never as silent divergence between memory and file.

use crate::error::AppError;
use crate::models::{BinAction, BinOverride};
use crate::time_utils::now_rfc3339;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File-backed override store. All writers serialize on the internal lock;
/// updates are whole-record, so concurrent callers see last-writer-wins but
/// never interleaved fields.
pub struct StatusStore {
    path: PathBuf,
    overrides: Mutex<HashMap<String, BinOverride>>,
}

impl StatusStore {
    /// Load the store from `path`. A missing file starts an empty store; an
    /// unreadable or malformed file is a startup error.
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let overrides = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| anyhow::anyhow!("malformed status file {}: {}", path.display(), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "cannot read status file {}: {}",
                    path.display(),
                    e
                ))
            }
        };

        tracing::info!(
            path = %path.display(),
            count = overrides.len(),
            "Bin status overrides loaded"
        );

        Ok(Self {
            path,
            overrides: Mutex::new(overrides),
        })
    }

    /// Current override for a bin, if one was ever recorded.
    pub async fn get(&self, bin_id: &str) -> Option<BinOverride> {
        self.overrides.lock().await.get(bin_id).cloned()
    }

    /// Snapshot of all overrides, for merging into an aggregated view.
    pub async fn snapshot(&self) -> HashMap<String, BinOverride> {
        self.overrides.lock().await.clone()
    }

    /// Apply an action to a bin, creating the record on first write.
    ///
    /// Flags are monotonic: `collect` and `schedule` only ever set their
    /// flag, refreshing the corresponding timestamp. The updated map is
    /// persisted before the in-memory state is committed.
    pub async fn apply(&self, bin_id: &str, action: BinAction) -> Result<BinOverride, AppError> {
        let mut overrides = self.overrides.lock().await;

        let mut record = overrides.get(bin_id).cloned().unwrap_or_default();
        match action {
            BinAction::Collect => {
                record.collected = true;
                record.collected_at = Some(now_rfc3339());
            }
            BinAction::Schedule => {
                record.scheduled = true;
                record.scheduled_at = Some(now_rfc3339());
            }
        }

        // Persist against a copy first; memory is only updated once the
        // file write succeeded.
        let mut updated = overrides.clone();
        updated.insert(bin_id.to_string(), record.clone());
        persist(&self.path, &updated)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        *overrides = updated;

        tracing::debug!(bin_id, action = ?action, "Bin override applied");
        Ok(record)
    }
}

/// Write the full override map durably: temp file in the same directory,
/// fsync, then atomic rename over the live file.
async fn persist(path: &Path, overrides: &HashMap<String, BinOverride>) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(overrides)?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
