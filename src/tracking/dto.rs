use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::cart::CartLine;
use crate::checkout::CustomerDetails;
use crate::id::EntityId;

/// Fulfilment stage. Only the backend moves an order forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// The lifecycle in order.
    pub const SEQUENCE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    pub fn position(self) -> Option<usize> {
        Self::SEQUENCE.iter().position(|s| *s == self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// An order as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: EntityId,
    #[serde(default)]
    pub tracking_code: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub customer: Option<CustomerDetails>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default, with = "crate::format::lenient_rfc3339")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "crate::format::lenient_rfc3339")]
    pub updated_at: Option<OffsetDateTime>,
}

/// A dish inside a placed order. Older orders may carry lines without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub qty: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: Some(line.id.clone()),
            name: line.name.clone(),
            price: line.price,
            qty: line.qty,
        }
    }
}

/// One step of the rendered progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageView {
    pub status: OrderStatus,
    pub reached: bool,
    pub current: bool,
}

/// Outcome of a phone lookup; an empty result is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PhoneLookup {
    NoMatches,
    Matches(Vec<OrderRecord>),
}
