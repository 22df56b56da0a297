use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::pricing::PricingRules;

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub delivery_fee: f64,
    pub free_delivery_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub pricing: PricingConfig,
    pub toast_duration_ms: u64,
    pub request_timeout_secs: u64,
    pub currency: String,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = normalize_base_url(
            &std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".into()),
        );
        anyhow::ensure!(!api_base_url.is_empty(), "API_BASE_URL must not be empty");

        let pricing = PricingConfig {
            delivery_fee: parse_var("DELIVERY_FEE", 50.0),
            free_delivery_threshold: parse_var("FREE_DELIVERY_THRESHOLD", 500.0),
        };
        anyhow::ensure!(
            pricing.delivery_fee >= 0.0 && pricing.free_delivery_threshold >= 0.0,
            "DELIVERY_FEE and FREE_DELIVERY_THRESHOLD must be non-negative"
        );

        Ok(Self {
            api_base_url,
            data_dir: std::env::var("MAMIFOOD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".mamifood")),
            pricing,
            toast_duration_ms: parse_var("TOAST_DURATION_MS", 3000),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 15),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "Birr".into()),
        })
    }

    pub fn pricing_rules(&self) -> PricingRules {
        PricingRules {
            base_delivery_fee: self.pricing.delivery_fee,
            free_delivery_threshold: self.pricing.free_delivery_threshold,
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
