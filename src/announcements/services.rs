use tracing::{info, instrument, warn};

use super::dto::{Announcement, AnnouncementDraft, AnnouncementPatch};
use crate::admin::{AdminError, AdminSession};
use crate::api::{ApiError, StorefrontApi};
use crate::id::EntityId;

/// Banner messages for the storefront. Inactive entries are dropped even if the backend sends them.
#[instrument(skip(api))]
pub async fn active_announcements(api: &dyn StorefrontApi) -> Result<Vec<Announcement>, ApiError> {
    let all = api.active_announcements().await.map_err(|e| {
        warn!(error = %e, "announcements unavailable");
        e
    })?;
    Ok(all.into_iter().filter(|a| a.active).collect())
}

fn check_title(title: &str) -> Result<(), AdminError> {
    if title.trim().is_empty() {
        return Err(AdminError::Invalid("Title is required".into()));
    }
    Ok(())
}

impl AdminSession {
    #[instrument(skip(self))]
    pub async fn announcements(&self) -> Result<Vec<Announcement>, AdminError> {
        let token = self.require_token()?;
        self.settle(self.api.list_announcements(&token).await)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_announcement(
        &self,
        draft: &AnnouncementDraft,
    ) -> Result<Announcement, AdminError> {
        check_title(&draft.title)?;
        let token = self.require_token()?;
        let draft = AnnouncementDraft {
            title: draft.title.trim().to_string(),
            message: draft.message.trim().to_string(),
            active: draft.active,
        };
        let created = self.settle(self.api.create_announcement(&token, &draft).await)?;
        info!(id = %created.id, "announcement created");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_announcement(
        &self,
        id: &EntityId,
        patch: &AnnouncementPatch,
    ) -> Result<Announcement, AdminError> {
        if patch.title.is_none() && patch.message.is_none() && patch.active.is_none() {
            return Err(AdminError::Invalid("Nothing to update".into()));
        }
        if let Some(title) = &patch.title {
            check_title(title)?;
        }
        let token = self.require_token()?;
        self.settle(self.api.update_announcement(&token, id, patch).await)
    }

    #[instrument(skip(self))]
    pub async fn delete_announcement(&self, id: &EntityId) -> Result<(), AdminError> {
        let token = self.require_token()?;
        self.settle(self.api.delete_announcement(&token, id).await)?;
        info!("announcement deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fake::{FakeBackend, ADMIN_TOKEN};
    use crate::state::AppState;
    use crate::storage::keys;

    fn banner(id: i64, title: &str, active: bool) -> Announcement {
        Announcement {
            id: EntityId::Int(id),
            title: title.into(),
            message: String::new(),
            active,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn storefront_sees_only_active() {
        let backend = FakeBackend::new();
        backend.seed_announcement(banner(1, "Open late on Friday", true));
        backend.seed_announcement(banner(2, "Old promo", false));

        let shown = active_announcements(&backend).await.unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Open late on Friday");
    }

    #[tokio::test]
    async fn admin_crud() {
        let backend = Arc::new(FakeBackend::new());
        let state = AppState::fake_with(backend.clone());
        state.storage.set(keys::ADMIN_TOKEN, ADMIN_TOKEN).unwrap();
        let session = AdminSession::new(&state);

        let draft = AnnouncementDraft {
            title: "  Holiday hours ".into(),
            message: "Closed on Monday".into(),
            active: true,
        };
        let created = session.create_announcement(&draft).await.unwrap();
        assert_eq!(created.title, "Holiday hours");

        let patch = AnnouncementPatch {
            active: Some(false),
            ..AnnouncementPatch::default()
        };
        let updated = session.update_announcement(&created.id, &patch).await.unwrap();
        assert!(!updated.active);
        assert!(active_announcements(backend.as_ref()).await.unwrap().is_empty());

        session.delete_announcement(&created.id).await.unwrap();
        assert!(session.announcements().await.unwrap().is_empty());

        let blank = AnnouncementDraft {
            title: " ".into(),
            message: String::new(),
            active: true,
        };
        assert!(matches!(
            session.create_announcement(&blank).await,
            Err(AdminError::Invalid(_))
        ));
    }
}
