mod engine;
mod promo;

pub use engine::{price, PricingResult, PricingRules};
pub use promo::{find_promotion, PromoError, PromotionCode, PROMOTIONS};
