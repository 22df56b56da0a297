//! Backend contract. `StorefrontApi` is the seam between the client core and
//! the REST backend; `HttpApi` is the real implementation.

mod envelope;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

use async_trait::async_trait;

use crate::admin::dto::LoginResponse;
use crate::announcements::dto::{Announcement, AnnouncementDraft, AnnouncementPatch};
use crate::catalog::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::checkout::{CreatedOrder, OrderPayload};
use crate::id::EntityId;
use crate::tracking::{OrderRecord, OrderStatus};

pub use error::ApiError;
pub use http::HttpApi;

#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // public
    async fn get_menu(&self) -> Result<Vec<MenuItem>, ApiError>;
    async fn create_order(&self, order: &OrderPayload) -> Result<CreatedOrder, ApiError>;
    async fn track_order(&self, order_id: &str, code: &str) -> Result<OrderRecord, ApiError>;
    async fn lookup_orders(&self, phone: &str) -> Result<Vec<OrderRecord>, ApiError>;
    async fn active_announcements(&self) -> Result<Vec<Announcement>, ApiError>;
    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    // bearer-protected
    async fn admin_menu(&self, token: &str) -> Result<Vec<MenuItem>, ApiError>;
    async fn create_menu_item(&self, token: &str, item: &MenuItemDraft)
        -> Result<MenuItem, ApiError>;
    async fn update_menu_item(
        &self,
        token: &str,
        id: &EntityId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError>;
    async fn delete_menu_item(&self, token: &str, id: &EntityId) -> Result<(), ApiError>;

    async fn list_orders(&self, token: &str) -> Result<Vec<OrderRecord>, ApiError>;
    async fn update_order_status(
        &self,
        token: &str,
        id: &EntityId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, ApiError>;
    async fn delete_order(&self, token: &str, id: &EntityId) -> Result<(), ApiError>;

    async fn list_announcements(&self, token: &str) -> Result<Vec<Announcement>, ApiError>;
    async fn create_announcement(
        &self,
        token: &str,
        draft: &AnnouncementDraft,
    ) -> Result<Announcement, ApiError>;
    async fn update_announcement(
        &self,
        token: &str,
        id: &EntityId,
        patch: &AnnouncementPatch,
    ) -> Result<Announcement, ApiError>;
    async fn delete_announcement(&self, token: &str, id: &EntityId) -> Result<(), ApiError>;
}
