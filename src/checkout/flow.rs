use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::dto::{CreatedOrder, CustomerDetails, Field, OrderPayload};
use super::validation::validate_customer;
use crate::api::{ApiError, StorefrontApi};
use crate::cart::CartStore;
use crate::pricing::{find_promotion, price, PricingResult, PricingRules, PromoError, PromotionCode};

/// Where the checkout form currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutPhase {
    Editing,
    Validating,
    Submitting,
    Succeeded(CreatedOrder),
    Failed(String),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please fix the highlighted fields")]
    Invalid(BTreeMap<Field, String>),
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Order is already being placed")]
    AlreadySubmitting,
    #[error("No order is being placed")]
    NotSubmitting,
    #[error("Failed to place order: {0}")]
    Failed(#[source] ApiError),
}

/// Checkout form state plus the applied promotion.
pub struct CheckoutFlow {
    form: CustomerDetails,
    phase: CheckoutPhase,
    field_errors: BTreeMap<Field, String>,
    applied_promo: Option<&'static PromotionCode>,
    rules: PricingRules,
}

impl CheckoutFlow {
    pub fn new(rules: PricingRules) -> Self {
        Self {
            form: CustomerDetails::default(),
            phase: CheckoutPhase::Editing,
            field_errors: BTreeMap::new(),
            applied_promo: None,
            rules,
        }
    }

    pub fn form(&self) -> &CustomerDetails {
        &self.form
    }

    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    pub fn field_errors(&self) -> &BTreeMap<Field, String> {
        &self.field_errors
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == CheckoutPhase::Submitting
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Editing a field clears its message.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.form.name = value,
            Field::Phone => self.form.phone = value,
            Field::Address => self.form.address = value,
        }
        self.field_errors.remove(&field);
        self.back_to_editing();
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.form.notes = notes;
        self.back_to_editing();
    }

    pub fn set_form(&mut self, details: CustomerDetails) {
        self.form = details;
        self.field_errors.clear();
        self.back_to_editing();
    }

    fn back_to_editing(&mut self) {
        if !self.is_submitting() {
            self.phase = CheckoutPhase::Editing;
        }
    }

    pub fn applied_promo(&self) -> Option<&'static PromotionCode> {
        self.applied_promo
    }

    /// Replaces any applied promotion; an unknown code leaves the current one in place.
    pub fn apply_promo(&mut self, code: &str) -> Result<&'static PromotionCode, PromoError> {
        let promo = find_promotion(code)?;
        debug!(code = promo.code, replaced = ?self.applied_promo.map(|p| p.code), "promo applied");
        self.applied_promo = Some(promo);
        Ok(promo)
    }

    pub fn remove_promo(&mut self) -> Option<&'static PromotionCode> {
        self.applied_promo.take()
    }

    pub fn pricing(&self, cart: &CartStore) -> PricingResult {
        price(cart.cart_total(), &self.rules, self.applied_promo)
    }

    /// Validates and locks the form; the caller must follow with [`Self::complete_submit`].
    pub fn begin_submit(&mut self, cart: &CartStore) -> Result<OrderPayload, CheckoutError> {
        if self.is_submitting() {
            warn!("checkout re-submitted while a request is in flight");
            return Err(CheckoutError::AlreadySubmitting);
        }
        self.phase = CheckoutPhase::Validating;

        let errors = validate_customer(&self.form);
        if !errors.is_empty() {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "checkout validation failed");
            self.field_errors = errors.clone();
            self.phase = CheckoutPhase::Editing;
            return Err(CheckoutError::Invalid(errors));
        }
        if cart.is_empty() {
            self.phase = CheckoutPhase::Editing;
            return Err(CheckoutError::EmptyCart);
        }
        self.field_errors.clear();

        let pricing = self.pricing(cart);
        let payload = OrderPayload::new(
            self.form.trimmed(),
            cart.snapshot().to_vec(),
            &pricing,
            self.applied_promo.map(|p| p.code.to_string()),
        );
        self.phase = CheckoutPhase::Submitting;
        debug!(items = payload.items.len(), total = payload.total, "checkout submitting");
        Ok(payload)
    }

    /// Applies the create-order outcome. The cart is only cleared once the backend confirmed.
    pub fn complete_submit(
        &mut self,
        cart: &mut CartStore,
        result: Result<CreatedOrder, ApiError>,
    ) -> Result<CreatedOrder, CheckoutError> {
        if !self.is_submitting() {
            return Err(CheckoutError::NotSubmitting);
        }
        match result {
            Ok(created) => {
                cart.clear_cart();
                self.form = CustomerDetails::default();
                self.field_errors.clear();
                self.applied_promo = None;
                self.phase = CheckoutPhase::Succeeded(created.clone());
                info!(order_id = %created.order_id, "order placed");
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, "order submission failed; cart kept");
                self.phase = CheckoutPhase::Failed(e.to_string());
                Err(CheckoutError::Failed(e))
            }
        }
    }

    /// Validate, send exactly one create-order request, settle.
    #[instrument(skip_all)]
    pub async fn submit(
        &mut self,
        cart: &mut CartStore,
        api: &dyn StorefrontApi,
    ) -> Result<CreatedOrder, CheckoutError> {
        let payload = self.begin_submit(cart)?;
        let result = api.create_order(&payload).await;
        self.complete_submit(cart, result)
    }
}
