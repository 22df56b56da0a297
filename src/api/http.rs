use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};

use super::envelope::{decode_each, field, list_in, optional_field};
use super::{ApiError, StorefrontApi};
use crate::admin::dto::{LoginRequest, LoginResponse};
use crate::announcements::dto::{Announcement, AnnouncementDraft, AnnouncementPatch};
use crate::catalog::{normalize_menu, MenuItem, MenuItemDraft, MenuItemPatch};
use crate::checkout::{CreatedOrder, OrderPayload};
use crate::id::EntityId;
use crate::tracking::{OrderRecord, OrderStatus};

/// reqwest-backed client for the storefront REST backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))?;
        anyhow::ensure!(!base.cannot_be_a_base(), "API base url cannot carry paths: {base}");
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Decode(format!("invalid base url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.url(segments)?))
    }

    fn authed(
        &self,
        method: Method,
        segments: &[&str],
        token: &str,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, segments)?.bearer_auth(token))
    }

    /// Sends and normalizes: unparseable bodies read as empty, non-2xx becomes one message.
    async fn send(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        let res = req.send().await.map_err(|e| {
            error!(error = %e, "request failed to complete");
            ApiError::Network(e)
        })?;
        let status = res.status();
        let url = res.url().clone();
        let bytes = res.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            let err = ApiError::from_status(status.as_u16(), message);
            if err.is_auth() {
                warn!(%status, %url, "request rejected as unauthorized");
            } else {
                error!(%status, %url, error = %err, "request failed");
            }
            return Err(err);
        }
        debug!(%status, %url, "response");
        Ok(body)
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    #[instrument(skip(self))]
    async fn get_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        let body = self.send(self.request(Method::GET, &["api", "menu"])?).await?;
        Ok(normalize_menu(list_in(body, &["menuItems", "menu"])))
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), total = order.total))]
    async fn create_order(&self, order: &OrderPayload) -> Result<CreatedOrder, ApiError> {
        let req = self.request(Method::POST, &["api", "orders"])?.json(order);
        let body = self.send(req).await?;
        Ok(CreatedOrder {
            order_id: field(&body, "orderId")?,
            tracking_code: field(&body, "trackingCode")?,
        })
    }

    #[instrument(skip(self, code))]
    async fn track_order(&self, order_id: &str, code: &str) -> Result<OrderRecord, ApiError> {
        let req = self
            .request(Method::GET, &["api", "orders", "track", order_id])?
            .query(&[("code", code)]);
        let body = self.send(req).await?;
        field(&body, "order")
    }

    #[instrument(skip(self, phone))]
    async fn lookup_orders(&self, phone: &str) -> Result<Vec<OrderRecord>, ApiError> {
        let req = self
            .request(Method::GET, &["api", "orders", "lookup"])?
            .query(&[("phone", phone)]);
        let body = self.send(req).await?;
        Ok(decode_each(list_in(body, &["orders"]), "order"))
    }

    #[instrument(skip(self))]
    async fn active_announcements(&self) -> Result<Vec<Announcement>, ApiError> {
        let req = self.request(Method::GET, &["api", "announcements", "active"])?;
        let body = self.send(req).await?;
        Ok(decode_each(list_in(body, &["announcements"]), "announcement"))
    }

    #[instrument(skip(self, password))]
    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let req = self
            .request(Method::POST, &["api", "admin", "login"])?
            .json(&LoginRequest { email, password });
        let body = self.send(req).await?;
        Ok(LoginResponse {
            token: body
                .get("token")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        })
    }

    #[instrument(skip(self, token))]
    async fn admin_menu(&self, token: &str) -> Result<Vec<MenuItem>, ApiError> {
        let req = self.authed(Method::GET, &["api", "menu", "admin"], token)?;
        let body = self.send(req).await?;
        Ok(normalize_menu(list_in(body, &["menuItems", "menu"])))
    }

    #[instrument(skip(self, token, item), fields(name = %item.name))]
    async fn create_menu_item(
        &self,
        token: &str,
        item: &MenuItemDraft,
    ) -> Result<MenuItem, ApiError> {
        let req = self.authed(Method::POST, &["api", "menu"], token)?.json(item);
        let body = self.send(req).await?;
        field(&body, "item")
    }

    #[instrument(skip(self, token, patch))]
    async fn update_menu_item(
        &self,
        token: &str,
        id: &EntityId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError> {
        let id = id.to_string();
        let req = self
            .authed(Method::PUT, &["api", "menu", &id], token)?
            .json(patch);
        let body = self.send(req).await?;
        field(&body, "item")
    }

    #[instrument(skip(self, token))]
    async fn delete_menu_item(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let id = id.to_string();
        self.send(self.authed(Method::DELETE, &["api", "menu", &id], token)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_orders(&self, token: &str) -> Result<Vec<OrderRecord>, ApiError> {
        let body = self
            .send(self.authed(Method::GET, &["api", "orders"], token)?)
            .await?;
        Ok(decode_each(list_in(body, &["orders"]), "order"))
    }

    #[instrument(skip(self, token))]
    async fn update_order_status(
        &self,
        token: &str,
        id: &EntityId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, ApiError> {
        let id = id.to_string();
        let req = self
            .authed(Method::PUT, &["api", "orders", &id], token)?
            .json(&json!({ "status": status }));
        let body = self.send(req).await?;
        optional_field(&body, "order")
    }

    #[instrument(skip(self, token))]
    async fn delete_order(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let id = id.to_string();
        self.send(self.authed(Method::DELETE, &["api", "orders", &id], token)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_announcements(&self, token: &str) -> Result<Vec<Announcement>, ApiError> {
        let body = self
            .send(self.authed(Method::GET, &["api", "announcements"], token)?)
            .await?;
        Ok(decode_each(list_in(body, &["announcements"]), "announcement"))
    }

    #[instrument(skip(self, token, draft), fields(title = %draft.title))]
    async fn create_announcement(
        &self,
        token: &str,
        draft: &AnnouncementDraft,
    ) -> Result<Announcement, ApiError> {
        let req = self
            .authed(Method::POST, &["api", "announcements"], token)?
            .json(draft);
        let body = self.send(req).await?;
        field(&body, "announcement")
    }

    #[instrument(skip(self, token, patch))]
    async fn update_announcement(
        &self,
        token: &str,
        id: &EntityId,
        patch: &AnnouncementPatch,
    ) -> Result<Announcement, ApiError> {
        let id = id.to_string();
        let req = self
            .authed(Method::PUT, &["api", "announcements", &id], token)?
            .json(patch);
        let body = self.send(req).await?;
        field(&body, "announcement")
    }

    #[instrument(skip(self, token))]
    async fn delete_announcement(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let id = id.to_string();
        self.send(self.authed(Method::DELETE, &["api", "announcements", &id], token)?)
            .await?;
        Ok(())
    }
}
