//! Append-only JSON array files for conversations and feedback.
//!
//! Every file is rewritten whole on append, so writers to the same file are
//! serialised through a per-file async mutex and land via temp file + rename.

mod records;

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

pub use records::{FeedbackRecord, FeedbackTopic, LoggedConversation};

pub const CONVERSATIONS_FILE: &str = "conversations.json";
pub const FEEDBACK_FILE: &str = "feedback.json";
pub const LEARNING_CONTEXT_FILE: &str = "learning-context.json";

pub const LEARNING_SNAPSHOT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("log file io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("log file {path} is not a JSON array of entries: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode log entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct JsonLog<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _entries: PhantomData<fn() -> T>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _entries: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files read as empty.
    pub async fn read_all(&self) -> Vec<T> {
        match self.load_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "log file unreadable; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Fails without touching the file when existing entries cannot be read back.
    pub async fn append(&self, entry: T) -> Result<(), LogStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_entries().await?;
        entries.push(entry);
        self.write_entries(&entries).await
    }

    pub async fn replace(&self, entries: &[T]) -> Result<(), LogStoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_entries(entries).await
    }

    async fn write_entries(&self, entries: &[T]) -> Result<(), LogStoreError> {
        let encoded = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let staging_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging_path, encoded)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&staging_path, &self.path)
            .await
            .map_err(|source| self.io_error(source))
    }

    async fn load_entries(&self) -> Result<Vec<T>, LogStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_slice::<Vec<T>>(&raw).map_err(|source| LogStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: io::Error) -> LogStoreError {
        LogStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

pub struct LogStore {
    conversations: JsonLog<LoggedConversation>,
    feedback: JsonLog<FeedbackRecord>,
    learning_context: JsonLog<FeedbackRecord>,
    feedback_lock: Mutex<()>,
}

impl LogStore {
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            conversations: JsonLog::new(data_dir.join(CONVERSATIONS_FILE)),
            feedback: JsonLog::new(data_dir.join(FEEDBACK_FILE)),
            learning_context: JsonLog::new(data_dir.join(LEARNING_CONTEXT_FILE)),
            feedback_lock: Mutex::new(()),
        }
    }

    pub async fn log_conversation(&self, entry: LoggedConversation) -> Result<(), LogStoreError> {
        self.conversations.append(entry).await
    }

    pub async fn conversations(&self) -> Vec<LoggedConversation> {
        self.conversations.read_all().await
    }

    /// Appends the record, then rewrites the learning snapshot from the full feedback log.
    pub async fn record_feedback(&self, record: FeedbackRecord) -> Result<(), LogStoreError> {
        let _guard = self.feedback_lock.lock().await;
        self.feedback.append(record).await?;

        let snapshot = learning_snapshot(self.feedback.read_all().await);
        self.learning_context.replace(&snapshot).await
    }

    pub async fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.read_all().await
    }

    pub async fn learning_context(&self) -> Vec<FeedbackRecord> {
        self.learning_context.read_all().await
    }
}

/// Most recent helpful feedback first, capped at [`LEARNING_SNAPSHOT_LIMIT`].
pub fn learning_snapshot(records: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    let mut helpful = records
        .into_iter()
        .filter(|record| record.helpful)
        .collect::<Vec<_>>();
    helpful.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    helpful.truncate(LEARNING_SNAPSHOT_LIMIT);
    helpful
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    fn conversation(question: &str, minute: i64) -> LoggedConversation {
        LoggedConversation {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minute),
            question: question.to_string(),
            answer: format!("answer to {question}"),
            helpful: true,
        }
    }

    fn feedback(question: &str, minute: i64, helpful: bool) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minute),
            question: question.to_string(),
            answer: "ok".to_string(),
            helpful,
            feedback: String::new(),
            topics: Vec::new(),
            answer_length: 2,
            has_emoji: false,
        }
    }

    #[tokio::test]
    async fn append_creates_file_and_preserves_order() {
        let dir = TempDir::new().expect("tempdir should be created");
        let store = LogStore::open(dir.path().join("nested"));

        store
            .log_conversation(conversation("first", 0))
            .await
            .expect("first append should succeed");
        store
            .log_conversation(conversation("second", 1))
            .await
            .expect("second append should succeed");

        let questions = store
            .conversations()
            .await
            .into_iter()
            .map(|entry| entry.question)
            .collect::<Vec<_>>();
        assert_eq!(questions, vec!["first", "second"]);

        let raw = std::fs::read_to_string(dir.path().join("nested").join(CONVERSATIONS_FILE))
            .expect("log file should exist");
        assert!(raw.contains("\"question\": \"first\""));
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = TempDir::new().expect("tempdir should be created");
        let store = Arc::new(LogStore::open(dir.path()));

        let tasks = (0..25)
            .map(|index| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .log_conversation(conversation(&format!("q{index}"), index))
                        .await
                })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await
                .expect("task should join")
                .expect("append should succeed");
        }

        assert_eq!(store.conversations().await.len(), 25);
    }

    #[tokio::test]
    async fn damaged_log_reads_as_empty_but_refuses_append() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join(CONVERSATIONS_FILE);
        let store = LogStore::open(dir.path());
        for question in ["q1", "q2"] {
            store
                .log_conversation(conversation(question, 0))
                .await
                .expect("append should succeed");
        }
        let intact = std::fs::read_to_string(&path).expect("log file should exist");
        let truncated = format!(
            "{},\n  {{\"question\": \"q3",
            intact.trim_end().trim_end_matches(']')
        );
        std::fs::write(&path, &truncated).expect("fixture should write");

        assert!(store.conversations().await.is_empty());
        let err = store
            .log_conversation(conversation("q4", 0))
            .await
            .expect_err("append onto a damaged log should fail");

        assert!(matches!(err, LogStoreError::Corrupt { .. }));
        let after = std::fs::read_to_string(&path).expect("log file should remain");
        assert_eq!(after, truncated);
        assert!(after.contains("\"q1\"") && after.contains("\"q2\""));
        assert!(!after.contains("\"q4\""));
    }

    #[tokio::test]
    async fn unwritable_location_reports_an_io_error() {
        let dir = TempDir::new().expect("tempdir should be created");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").expect("fixture should write");
        let store = LogStore::open(&blocker);

        let err = store
            .log_conversation(conversation("lost", 0))
            .await
            .expect_err("append under a regular file should fail");
        assert!(matches!(err, LogStoreError::Io { .. }));
    }

    #[tokio::test]
    async fn feedback_refreshes_learning_snapshot() {
        let dir = TempDir::new().expect("tempdir should be created");
        let store = LogStore::open(dir.path());

        store
            .record_feedback(feedback("old helpful", 0, true))
            .await
            .expect("feedback should persist");
        store
            .record_feedback(feedback("unhelpful", 1, false))
            .await
            .expect("feedback should persist");
        store
            .record_feedback(feedback("new helpful", 2, true))
            .await
            .expect("feedback should persist");

        assert_eq!(store.feedback().await.len(), 3);
        let snapshot = store
            .learning_context()
            .await
            .into_iter()
            .map(|record| record.question)
            .collect::<Vec<_>>();
        assert_eq!(snapshot, vec!["new helpful", "old helpful"]);
    }

    #[test]
    fn learning_snapshot_keeps_ten_newest_helpful_records() {
        let records = (0..15)
            .map(|minute| feedback(&format!("q{minute}"), minute, minute != 14))
            .collect::<Vec<_>>();

        let snapshot = learning_snapshot(records);

        assert_eq!(snapshot.len(), LEARNING_SNAPSHOT_LIMIT);
        assert_eq!(snapshot[0].question, "q13");
        assert_eq!(snapshot[9].question, "q4");
    }
}
