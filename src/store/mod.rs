//! Hosted announcement store: the operations the UI consumes and nothing more.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::StoreError;
use crate::models::announcement::Announcement;

pub use memory::MemoryAnnouncementStore;
pub use postgres::PgAnnouncementStore;

/// Stream of rows inserted into the announcements table after subscribing.
pub type InsertStream = BoxStream<'static, Announcement>;

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Every announcement, newest first.
    async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError>;

    /// Overwrite the read-list of one announcement. Last write wins.
    async fn update_read_by(&self, id: &str, read_by: &[String]) -> Result<(), StoreError>;

    /// Start receiving newly inserted announcements.
    async fn subscribe_inserts(&self) -> Result<InsertStream, StoreError>;
}
