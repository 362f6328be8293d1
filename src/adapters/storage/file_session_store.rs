//! File-based Session Store Adapter
//!
//! Stores each session in its own directory:
//!
//! ```text
//! <base>/<session_id>/session.yaml   snapshot record (overwritten)
//! <base>/<session_id>/feed.jsonl     feed log, one JSON item per line (appended)
//! <base>/<session_id>/ARCHIVED       marker written when the session ends
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::domain::workout_session::{SessionFeedItem, SessionRecord, WorkoutSession};
use crate::ports::{SessionStore, StoreError};

const SNAPSHOT_FILE: &str = "session.yaml";
const FEED_FILE: &str = "feed.jsonl";
const ARCHIVE_MARKER: &str = "ARCHIVED";

/// Parsed feed log of one session, kept after the first read.
#[derive(Debug)]
struct FeedLog {
    items: BTreeMap<u64, SessionFeedItem>,
    /// `next_sequence` of the last saved snapshot.
    committed_until: u64,
}

/// `None` until the log is first read from disk.
type LogSlot = Arc<Mutex<Option<FeedLog>>>;

/// File-based storage for workout sessions
///
/// Each session's feed log is parsed once and then kept in memory, so one
/// store instance should own a directory at a time.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
    logs: Arc<Mutex<HashMap<SessionId, LogSlot>>>,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            logs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn session_dir(&self, session_id: SessionId) -> PathBuf {
        self.base_path.join(session_id.to_string())
    }

    fn snapshot_path(&self, session_id: SessionId) -> PathBuf {
        self.session_dir(session_id).join(SNAPSHOT_FILE)
    }

    fn feed_path(&self, session_id: SessionId) -> PathBuf {
        self.session_dir(session_id).join(FEED_FILE)
    }

    fn archive_marker_path(&self, session_id: SessionId) -> PathBuf {
        self.session_dir(session_id).join(ARCHIVE_MARKER)
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn read_record(&self, session_id: SessionId) -> Result<SessionRecord, StoreError> {
        let path = self.snapshot_path(session_id);
        if !path.exists() {
            return Err(StoreError::NotFound(session_id));
        }
        let yaml = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        serde_yaml::from_str(&yaml).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Slot for a session's cached log. The map lock is never held across I/O.
    async fn log_slot(&self, session_id: SessionId) -> LogSlot {
        self.logs
            .lock()
            .await
            .entry(session_id)
            .or_default()
            .clone()
    }

    /// Fill `slot` from disk on first use.
    async fn open_log<'a>(
        &self,
        session_id: SessionId,
        slot: &'a mut Option<FeedLog>,
    ) -> Result<&'a mut FeedLog, StoreError> {
        if slot.is_none() {
            let committed_until = match self.read_record(session_id).await {
                Ok(record) => record.next_sequence,
                Err(StoreError::NotFound(_)) => 1,
                Err(e) => return Err(e),
            };
            let items = self.read_feed(session_id).await?;
            *slot = Some(FeedLog {
                items,
                committed_until,
            });
        }
        slot.as_mut()
            .ok_or_else(|| StoreError::Io("feed log unavailable".to_string()))
    }

    /// Reads the feed log keyed by sequence. Missing log means empty feed.
    ///
    /// A later line replaces an earlier one with the same sequence. An
    /// unparsable final line is a write cut short by a crash and is cut off
    /// the file; an unparsable line anywhere else is a `Serialization` error.
    async fn read_feed(
        &self,
        session_id: SessionId,
    ) -> Result<BTreeMap<u64, SessionFeedItem>, StoreError> {
        let path = self.feed_path(session_id);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let mut items = BTreeMap::new();
        let mut valid_len = 0;
        let mut lines = contents.split_inclusive('\n').peekable();
        while let Some(line) = lines.next() {
            let is_last = lines.peek().is_none();
            if !line.trim().is_empty() {
                match serde_json::from_str::<SessionFeedItem>(line.trim_end()) {
                    Ok(item) => {
                        items.insert(item.sequence(), item);
                    }
                    Err(e) if is_last => {
                        tracing::warn!(
                            session_id = %session_id,
                            error = %e,
                            "Discarding torn last line of feed log"
                        );
                        break;
                    }
                    Err(e) => return Err(StoreError::Serialization(e.to_string())),
                }
            }
            valid_len += line.len();
        }

        if valid_len < contents.len() {
            self.truncate_feed(&path, valid_len as u64).await?;
        } else if !contents.is_empty() && !contents.ends_with('\n') {
            // Complete item missing its newline; terminate it before appending more.
            self.write_feed(&path, "\n").await?;
        }
        Ok(items)
    }

    async fn truncate_feed(&self, path: &Path, len: u64) -> Result<(), StoreError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.set_len(len)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn write_feed(&self, path: &Path, lines: &str) -> Result<(), StoreError> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.write_all(lines.as_bytes())
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, session_id: SessionId) -> Result<WorkoutSession, StoreError> {
        let record = self.read_record(session_id).await?;
        let slot = self.log_slot(session_id).await;
        let mut guard = slot.lock().await;
        let log = self.open_log(session_id, &mut guard).await?;
        let feed = log.items.values().cloned().collect();
        Ok(WorkoutSession::reconstitute(record, feed))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let dir = self.session_dir(record.id);
        self.ensure_dir(&dir).await?;

        let yaml =
            serde_yaml::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written snapshot.
        let path = self.snapshot_path(record.id);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let slot = self.log_slot(record.id).await;
        if let Some(log) = slot.lock().await.as_mut() {
            log.committed_until = record.next_sequence;
        }
        Ok(())
    }

    async fn append_feed(
        &self,
        session_id: SessionId,
        items: &[SessionFeedItem],
    ) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let dir = self.session_dir(session_id);
        self.ensure_dir(&dir).await?;

        let slot = self.log_slot(session_id).await;
        let mut guard = slot.lock().await;
        let log = self.open_log(session_id, &mut guard).await?;

        let mut lines = String::new();
        for item in items {
            match log.items.get(&item.sequence()) {
                Some(existing) if existing.id() == item.id() => continue,
                Some(_) if item.sequence() < log.committed_until => {
                    return Err(StoreError::SequenceConflict {
                        session_id,
                        sequence: item.sequence(),
                    })
                }
                _ => {
                    let json = serde_json::to_string(item)
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                    lines.push_str(&json);
                    lines.push('\n');
                }
            }
        }
        if lines.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.write_feed(&self.feed_path(session_id), &lines).await {
            // The file may end in a partial line; re-read it on next use.
            *guard = None;
            return Err(e);
        }
        for item in items {
            log.items.insert(item.sequence(), item.clone());
        }
        Ok(())
    }

    async fn feed_since(
        &self,
        session_id: SessionId,
        after_sequence: u64,
    ) -> Result<Vec<SessionFeedItem>, StoreError> {
        if !self.snapshot_path(session_id).exists() {
            return Err(StoreError::NotFound(session_id));
        }
        let slot = self.log_slot(session_id).await;
        let mut guard = slot.lock().await;
        let log = self.open_log(session_id, &mut guard).await?;

        let start = after_sequence.saturating_add(1);
        if start >= log.committed_until {
            return Ok(Vec::new());
        }
        Ok(log
            .items
            .range(start..log.committed_until)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn archive(&self, session_id: SessionId) -> Result<(), StoreError> {
        if !self.snapshot_path(session_id).exists() {
            return Err(StoreError::NotFound(session_id));
        }
        fs::write(self.archive_marker_path(session_id), b"")
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError> {
        Ok(self.snapshot_path(session_id).exists())
    }
}
