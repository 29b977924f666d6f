use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::{AnnouncementStore, InsertStream};
use crate::error::StoreError;
use crate::models::announcement::Announcement;

/// In-process announcement store.
///
/// Serves as the offline fallback when no database is configured and as the
/// test double for the managers: it counts writes and can be told to fail.
pub struct MemoryAnnouncementStore {
    rows: Mutex<Vec<Announcement>>,
    inserts: broadcast::Sender<Announcement>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    /// Writes succeed while `writes` is below this limit.
    write_limit: AtomicUsize,
}

impl Default for MemoryAnnouncementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAnnouncementStore {
    pub fn new() -> Self {
        let (inserts, _) = broadcast::channel(64);
        Self {
            rows: Mutex::new(Vec::new()),
            inserts,
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            write_limit: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn with_rows(rows: Vec<Announcement>) -> Self {
        let store = Self::new();
        *store.lock_rows() = rows;
        store
    }

    /// Insert a row and push it to subscribers.
    pub fn insert(&self, announcement: Announcement) {
        self.lock_rows().push(announcement.clone());
        // No subscribers is fine.
        let _ = self.inserts.send(announcement);
    }

    /// Insert a fresh announcement stamped now.
    pub fn publish(&self, text: &str, created_by: &str) -> Announcement {
        let announcement = Announcement {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            created_by: created_by.to_string(),
            read_by: Vec::new(),
        };
        self.insert(announcement.clone());
        announcement
    }

    pub fn get(&self, id: &str) -> Option<Announcement> {
        self.lock_rows().iter().find(|a| a.id == id).cloned()
    }

    /// Number of `update_read_by` calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Let the next `n` writes succeed and fail every one after that.
    pub fn fail_writes_after(&self, n: usize) {
        let done = self.writes.load(Ordering::SeqCst);
        self.write_limit.store(done.saturating_add(n), Ordering::SeqCst);
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<Announcement>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AnnouncementStore for MemoryAnnouncementStore {
    async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        let mut rows = self.lock_rows().clone();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn update_read_by(&self, id: &str, read_by: &[String]) -> Result<(), StoreError> {
        let attempt = self.writes.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.write_limit.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        let mut rows = self.lock_rows();
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.read_by = read_by.to_vec();
        Ok(())
    }

    async fn subscribe_inserts(&self) -> Result<InsertStream, StoreError> {
        let stream = BroadcastStream::new(self.inserts.subscribe()).filter_map(|item| async move {
            match item {
                Ok(a) => Some(a),
                Err(e) => {
                    tracing::warn!("Announcement subscriber lagged: {e}");
                    None
                }
            }
        });
        Ok(stream.boxed())
    }
}
