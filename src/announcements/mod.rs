pub mod dto;
mod services;

pub use dto::{Announcement, AnnouncementDraft, AnnouncementPatch};
pub use services::active_announcements;
