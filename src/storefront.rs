//! The customer-facing session: cart, checkout and tracking wired to the
//! backend, with every user action reported through the notifier.

use tracing::{debug, instrument};

use crate::admin::{AdminError, AdminSession, OrdersBoard};
use crate::api::ApiError;
use crate::cart::{CartLine, CartStore, QtyChange};
use crate::catalog::{load_menu, MenuItem, ViewGuard};
use crate::checkout::{CheckoutError, CheckoutFlow, CreatedOrder};
use crate::id::EntityId;
use crate::notify::Notifier;
use crate::pricing::{PromoError, PromotionCode};
use crate::state::AppState;
use crate::tracking::{self, OrderRecord, OrderStatus, PhoneLookup, TrackingError};

pub const ORDER_FAILED: &str = "Failed to place order. Please try again.";

pub struct Storefront {
    state: AppState,
    cart: CartStore,
    checkout: CheckoutFlow,
    notifier: Notifier,
    admin: AdminSession,
    menu: Vec<MenuItem>,
    view: ViewGuard,
}

impl Storefront {
    pub fn new(state: AppState) -> Self {
        let cart = CartStore::load(state.storage.clone());
        let checkout = CheckoutFlow::new(state.config.pricing_rules());
        let notifier = Notifier::new(state.config.toast_duration());
        let admin = AdminSession::new(&state);
        Self {
            state,
            cart,
            checkout,
            notifier,
            admin,
            menu: Vec::new(),
            view: ViewGuard::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    pub fn checkout_mut(&mut self) -> &mut CheckoutFlow {
        &mut self.checkout
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn admin(&self) -> &AdminSession {
        &self.admin
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Refreshes the menu. A fetch that resolves after [`Self::shutdown`] leaves the menu untouched.
    #[instrument(skip(self))]
    pub async fn load_menu(&mut self) -> Result<&[MenuItem], ApiError> {
        match load_menu(self.state.api.as_ref(), &self.view).await {
            Ok(Some(items)) => self.menu = items,
            Ok(None) => {}
            Err(e) => {
                self.notifier.error(e.to_string());
                return Err(e);
            }
        }
        Ok(&self.menu)
    }

    pub fn add_item(&mut self, item: &MenuItem) -> u32 {
        let qty = self.cart.add_to_cart(item);
        self.notifier.success(format!("{} added to cart", item.name));
        qty
    }

    /// Adds a dish from the loaded menu by id.
    pub fn add_by_id(&mut self, id: &EntityId) -> Option<u32> {
        let Some(item) = self.menu.iter().find(|m| m.id.same_entity(id)).cloned() else {
            self.notifier.error("Item not found");
            return None;
        };
        Some(self.add_item(&item))
    }

    /// The id a cart line is stored under, whichever form `id` was given in.
    fn cart_id(&self, id: &EntityId) -> Option<EntityId> {
        self.cart
            .lines()
            .iter()
            .find(|l| l.id.same_entity(id))
            .map(|l| l.id.clone())
    }

    pub fn remove_item(&mut self, id: &EntityId) -> Option<CartLine> {
        let id = self.cart_id(id)?;
        let removed = self.cart.remove_from_cart(&id)?;
        self.notifier
            .info(format!("{} removed from cart", removed.name));
        Some(removed)
    }

    pub fn change_qty(&mut self, id: &EntityId, delta: i64) -> QtyChange {
        let Some(id) = self.cart_id(id) else {
            return QtyChange::Missing;
        };
        let name = self.cart.get(&id).map(|l| l.name.clone());
        let change = self.cart.update_qty(&id, delta);
        if let (QtyChange::Removed, Some(name)) = (&change, name) {
            self.notifier.info(format!("{name} removed from cart"));
        }
        change
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
        self.notifier.info("Cart cleared");
    }

    pub fn apply_promo(&mut self, code: &str) -> Result<&'static PromotionCode, PromoError> {
        match self.checkout.apply_promo(code) {
            Ok(promo) => {
                self.notifier
                    .success(format!("Promo code {} applied: {}", promo.code, promo.label));
                Ok(promo)
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn remove_promo(&mut self) -> Option<&'static PromotionCode> {
        let removed = self.checkout.remove_promo()?;
        self.notifier.info(format!("Promo code {} removed", removed.code));
        Some(removed)
    }

    #[instrument(skip(self))]
    pub async fn place_order(&mut self) -> Result<CreatedOrder, CheckoutError> {
        let result = self
            .checkout
            .submit(&mut self.cart, self.state.api.as_ref())
            .await;
        match &result {
            Ok(created) => {
                self.notifier.success(format!(
                    "Order placed! Tracking code: {}",
                    created.tracking_code
                ));
            }
            Err(CheckoutError::Failed(_)) => {
                self.notifier.error(ORDER_FAILED);
            }
            Err(CheckoutError::AlreadySubmitting) => {
                debug!("duplicate submit ignored");
            }
            Err(e) => {
                self.notifier.error(e.to_string());
            }
        }
        result
    }

    pub async fn track(&self, order_id: &str, code: &str) -> Result<OrderRecord, TrackingError> {
        let result = tracking::track_order(self.state.api.as_ref(), order_id, code).await;
        if let Err(e) = &result {
            self.notifier.error(e.to_string());
        }
        result
    }

    pub async fn lookup(&self, phone: &str) -> Result<PhoneLookup, TrackingError> {
        let result = tracking::lookup_by_phone(self.state.api.as_ref(), phone).await;
        match &result {
            Ok(PhoneLookup::NoMatches) => {
                self.notifier.info("No orders found for this phone number");
            }
            Ok(PhoneLookup::Matches(_)) => {}
            Err(e) => {
                self.notifier.error(e.to_string());
            }
        }
        result
    }

    pub async fn admin_login(&self, email: &str, password: &str) -> Result<(), AdminError> {
        let result = self.admin.login(email, password).await;
        match &result {
            Ok(()) => self.notifier.success("Logged in"),
            Err(e) => self.notifier.error(e.to_string()),
        };
        result
    }

    pub async fn set_order_status(
        &self,
        board: &mut OrdersBoard,
        id: &EntityId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, AdminError> {
        let result = self.admin.set_order_status(board, id, status).await;
        match &result {
            Ok(Some(_)) => {
                self.notifier.success(format!("Order updated to {status}"));
            }
            Ok(None) => {}
            Err(e) => {
                self.notifier.error(e.to_string());
            }
        };
        result
    }

    pub async fn delete_order(
        &self,
        board: &mut OrdersBoard,
        id: &EntityId,
    ) -> Result<(), AdminError> {
        let result = self.admin.delete_order(board, id).await;
        match &result {
            Ok(()) => self.notifier.info("Order deleted"),
            Err(e) => self.notifier.error(e.to_string()),
        };
        result
    }

    /// Discards in-flight menu results and cancels every notification timer.
    pub fn shutdown(&self) {
        self.view.teardown();
        self.notifier.shutdown();
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        self.shutdown();
    }
}
