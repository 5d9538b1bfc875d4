//! Audit log of webhook deliveries

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::EventLogEntry;

/// Sink for delivery audit records
#[async_trait::async_trait]
pub trait EventLog: Send + Sync + 'static {
    /// Persist one entry
    async fn record(&self, entry: EventLogEntry) -> Result<()>;

    /// Most recent entries, newest first
    async fn recent(&self, limit: usize) -> Vec<EventLogEntry>;
}

/// Bounded in-memory log; the oldest entry is evicted when full
#[derive(Debug)]
pub struct InMemoryEventLog {
    capacity: usize,
    entries: RwLock<VecDeque<EventLogEntry>>,
}

impl InMemoryEventLog {
    /// Log keeping at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::with_capacity(capacity.clamp(1, 1024))),
        }
    }

    /// Maximum number of entries held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries currently held
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no entry is held
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait::async_trait]
impl EventLog for InMemoryEventLog {
    async fn record(&self, entry: EventLogEntry) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!(id = %evicted.id, "Event log full, evicting oldest entry");
            }
        }
        entries.push_back(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Vec<EventLogEntry> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }
}

/// Append-only log of JSON lines, one entry per line
///
/// Survives restarts; `recent` re-reads the file on every call.
#[derive(Debug)]
pub struct JsonLinesEventLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesEventLog {
    /// Log appending to `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// File the log appends to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl EventLog for JsonLinesEventLog {
    async fn record(&self, entry: EventLogEntry) -> Result<()> {
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Vec<EventLogEntry> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read event log");
                return Vec::new();
            }
        };

        contents
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable event log line");
                    None
                }
            })
            .take(limit)
            .collect()
    }
}
