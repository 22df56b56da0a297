use serde::Serialize;

use super::promo::PromotionCode;

/// Fixed delivery rules of the storefront.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    pub base_delivery_fee: f64,
    pub free_delivery_threshold: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            base_delivery_fee: 50.0,
            free_delivery_threshold: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
    pub qualifies_free_delivery: bool,
}

/// Derives the checkout breakdown. Always recomputed from scratch.
pub fn price(subtotal: f64, rules: &PricingRules, promo: Option<&PromotionCode>) -> PricingResult {
    let qualifies_free_delivery = subtotal >= rules.free_delivery_threshold;
    let mut delivery_fee = if qualifies_free_delivery {
        0.0
    } else {
        rules.base_delivery_fee
    };
    let mut discount = 0.0;

    if let Some(promo) = promo {
        if promo.waives_delivery_fee {
            delivery_fee = 0.0;
        }
        if let Some(f) = promo.discount_fraction.filter(|f| *f > 0.0) {
            discount = (subtotal * f).round();
        }
        // flat is applied after the fraction and wins when a code carries both
        if let Some(flat) = promo.flat_amount.filter(|a| *a > 0.0) {
            discount = flat;
        }
    }

    let total = (subtotal - discount + delivery_fee).max(0.0);
    PricingResult {
        subtotal,
        delivery_fee,
        discount,
        total,
        qualifies_free_delivery,
    }
}
