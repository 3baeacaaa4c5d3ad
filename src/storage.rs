use crate::models::{NewRecord, RecordUpdate, RowId, StoredRow};
use serde::{Deserialize, Serialize};
use std::{future::Future, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store payload is invalid: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("record file {0} could not be loaded; refusing to overwrite it")]
    Locked(PathBuf),
    #[error("row ids are exhausted")]
    IdsExhausted,
}

/// Append/list/update access to the activity log.
pub trait RecordStore: Send + Sync + 'static {
    /// Full snapshot of stored rows, in insertion order.
    fn list_records(&self) -> impl Future<Output = Result<Vec<StoredRow>, StoreError>> + Send;

    /// Stores a new row and returns its freshly assigned identifier.
    fn append_record(
        &self,
        record: NewRecord,
    ) -> impl Future<Output = Result<RowId, StoreError>> + Send;

    /// `Ok(false)` when no row carries `row_id`.
    fn update_record(
        &self,
        row_id: RowId,
        update: RecordUpdate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// The persisted shape of the log. `next_row_id` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordLog {
    #[serde(default)]
    pub next_row_id: u64,
    #[serde(default)]
    pub rows: Vec<StoredRow>,
}

impl RecordLog {
    pub fn append(&mut self, record: NewRecord) -> Result<RowId, StoreError> {
        let mut id = self.next_row_id.max(1);
        for seen in self.rows.iter().filter_map(StoredRow::row_id) {
            let after = seen.0.checked_add(1).ok_or(StoreError::IdsExhausted)?;
            id = id.max(after);
        }
        self.next_row_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let row_id = RowId(id);
        self.rows.push(StoredRow::Record(record.into_stored(row_id)));
        Ok(row_id)
    }

    pub fn update(&mut self, row_id: RowId, update: RecordUpdate) -> bool {
        let target = self
            .rows
            .iter_mut()
            .filter_map(StoredRow::as_record_mut)
            .find(|row| row.row_id == row_id);
        match target {
            Some(row) => {
                update.apply(row);
                true
            }
            None => false,
        }
    }
}

/// A missing file is an empty log. A file that exists but cannot be read or
/// parsed is an error.
pub async fn load_log(path: &Path) -> Result<RecordLog, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(RecordLog::default()),
        Err(err) => Err(err.into()),
    }
}

pub async fn persist_log(path: &Path, log: &RecordLog) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(log)?;
    fs::write(path, payload).await?;
    Ok(())
}

/// Keeps the log in memory and rewrites the JSON file after every change.
/// A file that fails to load leaves the store locked: reads and writes fail
/// and the file is never rewritten.
pub struct JsonFileStore {
    path: PathBuf,
    log: Mutex<Option<RecordLog>>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Self {
        let log = match load_log(&path).await {
            Ok(log) => {
                info!(rows = log.rows.len(), "loaded record file {}", path.display());
                Some(log)
            }
            Err(err) => {
                error!("failed to load record file {}: {err}", path.display());
                None
            }
        };
        Self {
            path,
            log: Mutex::new(log),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locked(&self) -> StoreError {
        StoreError::Locked(self.path.clone())
    }
}

impl RecordStore for JsonFileStore {
    async fn list_records(&self) -> Result<Vec<StoredRow>, StoreError> {
        let log = self.log.lock().await;
        let log = log.as_ref().ok_or_else(|| self.locked())?;
        Ok(log.rows.clone())
    }

    async fn append_record(&self, record: NewRecord) -> Result<RowId, StoreError> {
        let mut guard = self.log.lock().await;
        let log = guard.as_mut().ok_or_else(|| self.locked())?;
        let mut next = log.clone();
        let row_id = next.append(record)?;
        persist_log(&self.path, &next).await?;
        *log = next;
        Ok(row_id)
    }

    async fn update_record(&self, row_id: RowId, update: RecordUpdate) -> Result<bool, StoreError> {
        let mut guard = self.log.lock().await;
        let log = guard.as_mut().ok_or_else(|| self.locked())?;
        let mut next = log.clone();
        if !next.update(row_id, update) {
            return Ok(false);
        }
        persist_log(&self.path, &next).await?;
        *log = next;
        Ok(true)
    }
}

/// Store without persistence, for `APP_DATA_PATH=:memory:` and tests.
#[derive(Default)]
pub struct MemoryStore {
    log: Mutex<RecordLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    async fn list_records(&self) -> Result<Vec<StoredRow>, StoreError> {
        Ok(self.log.lock().await.rows.clone())
    }

    async fn append_record(&self, record: NewRecord) -> Result<RowId, StoreError> {
        self.log.lock().await.append(record)
    }

    async fn update_record(&self, row_id: RowId, update: RecordUpdate) -> Result<bool, StoreError> {
        Ok(self.log.lock().await.update(row_id, update))
    }
}
