use chrono::{DateTime, Utc};
use hackboard_domain::{
    ServiceResult,
    announcement::{Announcement, AnnouncementId, AnnouncementRepository},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::map_db_err;

pub struct SqliteAnnouncementRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn announcement_from_row(row: &SqliteRow) -> sqlx::Result<Announcement> {
        Ok(Announcement {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait::async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create_announcement(
        &self,
        title: &str,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<AnnouncementId> {
        let res = sqlx::query(
            "INSERT INTO announcements (title, body, created_at) VALUES (?, ?, ?)",
        )
        .bind(title)
        .bind(body)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(res.last_insert_rowid())
    }

    async fn get_announcements(&self, limit: Option<u32>) -> ServiceResult<Vec<Announcement>> {
        // id breaks same-timestamp ties so "newest first" stays stable.
        let mut sql =
            "SELECT * FROM announcements ORDER BY created_at DESC, id DESC".to_string();
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }
        let mut query = sqlx::query(&sql);
        if let Some(limit) = limit {
            query = query.bind(limit);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_db_err)?;
        rows.iter()
            .map(|row| Self::announcement_from_row(row).map_err(map_db_err))
            .collect()
    }
}
