use serde::Serialize;
use thiserror::Error;

/// Reference promotion. A code defines a fraction or a flat amount, optionally with free delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionCode {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_amount: Option<f64>,
    pub waives_delivery_fee: bool,
    pub label: &'static str,
}

pub const PROMOTIONS: &[PromotionCode] = &[
    PromotionCode {
        code: "WELCOME10",
        discount_fraction: Some(0.10),
        flat_amount: None,
        waives_delivery_fee: false,
        label: "10% off your order",
    },
    PromotionCode {
        code: "MAMI20",
        discount_fraction: Some(0.20),
        flat_amount: None,
        waives_delivery_fee: false,
        label: "20% off your order",
    },
    PromotionCode {
        code: "SAVE50",
        discount_fraction: None,
        flat_amount: Some(50.0),
        waives_delivery_fee: false,
        label: "50 off your order",
    },
    PromotionCode {
        code: "FREEDELIVERY",
        discount_fraction: None,
        flat_amount: None,
        waives_delivery_fee: true,
        label: "Free delivery",
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoError {
    #[error("Enter a promo code")]
    Empty,
    #[error("Invalid promo code: {0}")]
    Unknown(String),
}

/// Case-insensitive lookup against the reference table.
pub fn find_promotion(code: &str) -> Result<&'static PromotionCode, PromoError> {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(PromoError::Empty);
    }
    PROMOTIONS
        .iter()
        .find(|p| p.code == normalized)
        .ok_or(PromoError::Unknown(normalized))
}
