use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiError, StorefrontApi};
use crate::admin::dto::LoginResponse;
use crate::announcements::dto::{Announcement, AnnouncementDraft, AnnouncementPatch};
use crate::catalog::{MenuItem, MenuItemDraft, MenuItemPatch};
use crate::checkout::{CreatedOrder, OrderPayload};
use crate::id::EntityId;
use crate::tracking::{OrderLine, OrderRecord, OrderStatus};

pub(crate) const ADMIN_EMAIL: &str = "admin@mamifood.com";
pub(crate) const ADMIN_PASSWORD: &str = "secret-pass";
pub(crate) const ADMIN_TOKEN: &str = "admin-token";

#[derive(Default)]
struct FakeState {
    menu: Vec<MenuItem>,
    orders: Vec<OrderRecord>,
    announcements: Vec<Announcement>,
    next_id: i64,
    fail_next: Option<(u16, String)>,
    omit_login_token: bool,
    omit_updated_order: bool,
    calls: HashMap<&'static str, usize>,
    last_order: Option<OrderPayload>,
}

/// In-memory backend honouring the REST contract closely enough for unit tests.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().next_id = 1000;
        backend
    }

    pub fn with_menu(menu: Vec<MenuItem>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().menu = menu;
        backend
    }

    /// The next call of any kind answers with a 500 carrying `message`.
    pub fn fail_next(&self, message: &str) {
        self.fail_next_with(500, message);
    }

    pub fn fail_next_with(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    pub fn omit_login_token(&self) {
        self.state.lock().unwrap().omit_login_token = true;
    }

    /// Status updates succeed without echoing the order back.
    pub fn omit_updated_order(&self) {
        self.state.lock().unwrap().omit_updated_order = true;
    }

    pub fn calls(&self, name: &str) -> usize {
        self.state.lock().unwrap().calls.get(name).copied().unwrap_or(0)
    }

    pub fn last_order(&self) -> Option<OrderPayload> {
        self.state.lock().unwrap().last_order.clone()
    }

    pub fn seed_order(&self, order: OrderRecord) {
        self.state.lock().unwrap().orders.push(order);
    }

    pub fn seed_announcement(&self, a: Announcement) {
        self.state.lock().unwrap().announcements.push(a);
    }

    pub fn orders(&self) -> Vec<OrderRecord> {
        self.state.lock().unwrap().orders.clone()
    }

    fn enter(&self, name: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut st = self.state.lock().unwrap();
        *st.calls.entry(name).or_default() += 1;
        if let Some((status, message)) = st.fail_next.take() {
            return Err(ApiError::from_status(status, Some(message)));
        }
        Ok(st)
    }

    fn enter_authed(
        &self,
        name: &'static str,
        token: &str,
    ) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let st = self.enter(name)?;
        if token != ADMIN_TOKEN {
            return Err(ApiError::from_status(401, Some("Invalid token".into())));
        }
        Ok(st)
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::from_status(404, Some(format!("{what} not found")))
}

#[async_trait]
impl StorefrontApi for FakeBackend {
    async fn get_menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        Ok(self.enter("get_menu")?.menu.clone())
    }

    async fn create_order(&self, order: &OrderPayload) -> Result<CreatedOrder, ApiError> {
        let mut st = self.enter("create_order")?;
        st.next_id += 1;
        let id = st.next_id;
        let tracking_code = format!("TRK{id}");
        st.orders.push(OrderRecord {
            id: EntityId::Int(id),
            tracking_code: Some(tracking_code.clone()),
            status: OrderStatus::Pending,
            customer: Some(order.customer.clone()),
            items: order.items.iter().map(OrderLine::from).collect(),
            subtotal: Some(order.subtotal),
            delivery_fee: Some(order.delivery_fee),
            discount: Some(order.discount),
            promo_code: order.promo_code.clone(),
            total: order.total,
            created_at: None,
            updated_at: None,
        });
        st.last_order = Some(order.clone());
        Ok(CreatedOrder {
            order_id: EntityId::Int(id),
            tracking_code,
        })
    }

    async fn track_order(&self, order_id: &str, code: &str) -> Result<OrderRecord, ApiError> {
        let st = self.enter("track_order")?;
        st.orders
            .iter()
            .find(|o| o.id.to_string() == order_id && o.tracking_code.as_deref() == Some(code))
            .cloned()
            .ok_or_else(|| not_found("Order"))
    }

    async fn lookup_orders(&self, phone: &str) -> Result<Vec<OrderRecord>, ApiError> {
        let st = self.enter("lookup_orders")?;
        Ok(st
            .orders
            .iter()
            .filter(|o| o.customer.as_ref().is_some_and(|c| c.phone == phone))
            .cloned()
            .collect())
    }

    async fn active_announcements(&self) -> Result<Vec<Announcement>, ApiError> {
        let st = self.enter("active_announcements")?;
        Ok(st.announcements.iter().filter(|a| a.active).cloned().collect())
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let st = self.enter("admin_login")?;
        if email != ADMIN_EMAIL || password != ADMIN_PASSWORD {
            return Err(ApiError::from_status(401, Some("Invalid credentials".into())));
        }
        Ok(LoginResponse {
            token: (!st.omit_login_token).then(|| ADMIN_TOKEN.to_string()),
        })
    }

    async fn admin_menu(&self, token: &str) -> Result<Vec<MenuItem>, ApiError> {
        Ok(self.enter_authed("admin_menu", token)?.menu.clone())
    }

    async fn create_menu_item(
        &self,
        token: &str,
        item: &MenuItemDraft,
    ) -> Result<MenuItem, ApiError> {
        let mut st = self.enter_authed("create_menu_item", token)?;
        st.next_id += 1;
        let created = MenuItem {
            id: EntityId::Int(st.next_id),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            tags: item.tags.clone(),
            prep_time: item.prep_time.clone(),
            rating: None,
            review_count: None,
        };
        st.menu.push(created.clone());
        Ok(created)
    }

    async fn update_menu_item(
        &self,
        token: &str,
        id: &EntityId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError> {
        let mut st = self.enter_authed("update_menu_item", token)?;
        let item = st
            .menu
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| not_found("Menu item"))?;
        if let Some(name) = &patch.name {
            item.name = name.clone();
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(image) = &patch.image {
            item.image = image.clone();
        }
        if let Some(category) = &patch.category {
            item.category = Some(category.clone());
        }
        if let Some(description) = &patch.description {
            item.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            item.tags = tags.clone();
        }
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let mut st = self.enter_authed("delete_menu_item", token)?;
        let before = st.menu.len();
        st.menu.retain(|m| &m.id != id);
        if st.menu.len() == before {
            return Err(not_found("Menu item"));
        }
        Ok(())
    }

    async fn list_orders(&self, token: &str) -> Result<Vec<OrderRecord>, ApiError> {
        Ok(self.enter_authed("list_orders", token)?.orders.clone())
    }

    async fn update_order_status(
        &self,
        token: &str,
        id: &EntityId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, ApiError> {
        let mut st = self.enter_authed("update_order_status", token)?;
        let order = st
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| not_found("Order"))?;
        order.status = status;
        let echoed = order.clone();
        Ok((!st.omit_updated_order).then_some(echoed))
    }

    async fn delete_order(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let mut st = self.enter_authed("delete_order", token)?;
        let before = st.orders.len();
        st.orders.retain(|o| &o.id != id);
        if st.orders.len() == before {
            return Err(not_found("Order"));
        }
        Ok(())
    }

    async fn list_announcements(&self, token: &str) -> Result<Vec<Announcement>, ApiError> {
        Ok(self
            .enter_authed("list_announcements", token)?
            .announcements
            .clone())
    }

    async fn create_announcement(
        &self,
        token: &str,
        draft: &AnnouncementDraft,
    ) -> Result<Announcement, ApiError> {
        let mut st = self.enter_authed("create_announcement", token)?;
        st.next_id += 1;
        let created = Announcement {
            id: EntityId::Int(st.next_id),
            title: draft.title.clone(),
            message: draft.message.clone(),
            active: draft.active,
            created_at: None,
        };
        st.announcements.push(created.clone());
        Ok(created)
    }

    async fn update_announcement(
        &self,
        token: &str,
        id: &EntityId,
        patch: &AnnouncementPatch,
    ) -> Result<Announcement, ApiError> {
        let mut st = self.enter_authed("update_announcement", token)?;
        let a = st
            .announcements
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| not_found("Announcement"))?;
        if let Some(title) = &patch.title {
            a.title = title.clone();
        }
        if let Some(message) = &patch.message {
            a.message = message.clone();
        }
        if let Some(active) = patch.active {
            a.active = active;
        }
        Ok(a.clone())
    }

    async fn delete_announcement(&self, token: &str, id: &EntityId) -> Result<(), ApiError> {
        let mut st = self.enter_authed("delete_announcement", token)?;
        let before = st.announcements.len();
        st.announcements.retain(|a| &a.id != id);
        if st.announcements.len() == before {
            return Err(not_found("Announcement"));
        }
        Ok(())
    }
}
