use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, with = "crate::format::lenient_rfc3339")]
    pub created_at: Option<OffsetDateTime>,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /api/announcements`.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    pub active: bool,
}

/// Body of `PUT /api/announcements/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnouncementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
