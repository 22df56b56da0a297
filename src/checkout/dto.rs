use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::id::EntityId;
use crate::pricing::PricingResult;

/// Delivery details typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerDetails {
    /// Trimmed copy; blank notes collapse to `None`.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer: CustomerDetails,
    pub items: Vec<CartLine>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    pub total: f64,
}

impl OrderPayload {
    pub fn new(
        customer: CustomerDetails,
        items: Vec<CartLine>,
        pricing: &PricingResult,
        promo_code: Option<String>,
    ) -> Self {
        Self {
            customer,
            items,
            subtotal: pricing.subtotal,
            delivery_fee: pricing.delivery_fee,
            discount: pricing.discount,
            promo_code,
            total: pricing.total,
        }
    }
}

/// Identifiers the backend hands back for a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: EntityId,
    pub tracking_code: String,
}

/// Checkout form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Phone,
    Address,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Address => "address",
        }
    }
}
