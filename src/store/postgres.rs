use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::postgres::PgListener;
use sqlx::PgPool;

use super::{AnnouncementStore, InsertStream};
use crate::error::StoreError;
use crate::models::announcement::Announcement;

/// Channel the insert trigger publishes the new row's id on.
pub const INSERT_CHANNEL: &str = "announcements_insert";

/// Explicit column list: a NULL read_by is read as an empty array.
const ANNOUNCEMENT_COLS: &str =
    "id, text, timestamp, created_by, COALESCE(read_by, '{}'::TEXT[]) AS read_by";

pub struct PgAnnouncementStore {
    pool: PgPool,
}

impl PgAnnouncementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_announcement(&self, id: &str) -> Result<Option<Announcement>, StoreError> {
        fetch_announcement(&self.pool, id).await
    }
}

async fn fetch_announcement(pool: &PgPool, id: &str) -> Result<Option<Announcement>, StoreError> {
    let row = sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {ANNOUNCEMENT_COLS} FROM announcements WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// The announcement id carried by an insert notification, if any.
pub fn inserted_id(payload: &str) -> Option<&str> {
    let id = payload.trim();
    (!id.is_empty()).then_some(id)
}

#[async_trait]
impl AnnouncementStore for PgAnnouncementStore {
    async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        let rows = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {ANNOUNCEMENT_COLS} FROM announcements ORDER BY timestamp DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_read_by(&self, id: &str, read_by: &[String]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE announcements SET read_by = $1 WHERE id = $2")
            .bind(read_by)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn subscribe_inserts(&self) -> Result<InsertStream, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(INSERT_CHANNEL).await?;
        tracing::info!("Listening for announcement inserts on '{INSERT_CHANNEL}'");

        let pool = self.pool.clone();
        let stream = listener.into_stream().filter_map(move |item| {
            let pool = pool.clone();
            async move {
                let notification = match item {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::error!("Announcement listener error: {e}");
                        return None;
                    }
                };
                let Some(id) = inserted_id(notification.payload()) else {
                    tracing::warn!("Ignoring announcement insert without an id");
                    return None;
                };
                match fetch_announcement(&pool, id).await {
                    Ok(Some(a)) => Some(a),
                    Ok(None) => {
                        tracing::warn!("Announcement {id} was gone before it could be loaded");
                        None
                    }
                    Err(e) => {
                        tracing::error!("Error loading inserted announcement {id}: {e}");
                        None
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}
