use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::{ServiceError, ServiceResult};

pub type AnnouncementId = i64;

#[derive(Clone, Debug)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

pub type ArcAnnouncementRepository = Arc<Box<dyn AnnouncementRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait AnnouncementRepository {
    async fn create_announcement(
        &self,
        title: &str,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<AnnouncementId>;
    /// Newest first; `limit` caps the result when present.
    async fn get_announcements(&self, limit: Option<u32>) -> ServiceResult<Vec<Announcement>>;
}

pub type ArcAnnouncementService = Arc<Box<dyn AnnouncementService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait AnnouncementService {
    async fn post_announcement(&self, title: &str, body: &str) -> ServiceResult<AnnouncementId>;
    async fn list_announcements(&self, limit: Option<u32>) -> ServiceResult<Vec<Announcement>>;
}

pub struct AnnouncementServiceImpl {
    announcement_repository: ArcAnnouncementRepository,
}

impl AnnouncementServiceImpl {
    pub fn new(announcement_repository: ArcAnnouncementRepository) -> Self {
        Self {
            announcement_repository,
        }
    }
}

#[async_trait::async_trait]
impl AnnouncementService for AnnouncementServiceImpl {
    async fn post_announcement(&self, title: &str, body: &str) -> ServiceResult<AnnouncementId> {
        let title = title.trim();
        let body = body.trim();
        if title.is_empty() || body.is_empty() {
            return ServiceError::bad_request("Title and body required.");
        }
        let id = self
            .announcement_repository
            .create_announcement(title, body, Utc::now())
            .await?;
        info!("Posted announcement {} ({})", id, title);
        Ok(id)
    }

    async fn list_announcements(&self, limit: Option<u32>) -> ServiceResult<Vec<Announcement>> {
        self.announcement_repository.get_announcements(limit).await
    }
}

#[derive(Default, Clone)]
pub struct MockAnnouncementRepository {
    announcements: Arc<std::sync::Mutex<Vec<Announcement>>>,
}

#[async_trait::async_trait]
impl AnnouncementRepository for MockAnnouncementRepository {
    async fn create_announcement(
        &self,
        title: &str,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<AnnouncementId> {
        let mut announcements = self.announcements.lock().unwrap();
        let id = announcements.len() as AnnouncementId + 1;
        announcements.push(Announcement {
            id,
            title: title.to_string(),
            body: body.to_string(),
            created_at,
        });
        Ok(id)
    }

    async fn get_announcements(&self, limit: Option<u32>) -> ServiceResult<Vec<Announcement>> {
        let announcements = self.announcements.lock().unwrap();
        let mut all = announcements.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            all.truncate(limit as usize);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (AnnouncementServiceImpl, MockAnnouncementRepository) {
        let repo = MockAnnouncementRepository::default();
        let service = AnnouncementServiceImpl::new(Arc::new(Box::new(repo.clone())));
        (service, repo)
    }

    #[tokio::test]
    async fn empty_title_or_body_is_rejected() {
        let (service, repo) = service();
        for (title, body) in [("", "body"), ("title", ""), ("  ", "body")] {
            let err = service.post_announcement(title, body).await.unwrap_err();
            assert!(matches!(err, ServiceError::BadRequest(_)));
        }
        assert!(repo.get_announcements(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_respects_the_limit() {
        let (service, _) = service();
        for i in 0..7 {
            service
                .post_announcement(&format!("Update {}", i), "details")
                .await
                .unwrap();
        }
        let latest = service.list_announcements(Some(5)).await.unwrap();
        assert_eq!(latest.len(), 5);
        assert_eq!(latest[0].title, "Update 6");
        let all = service.list_announcements(None).await.unwrap();
        assert_eq!(all.len(), 7);
    }
}
