use std::sync::Arc;

use crate::api::{HttpApi, StorefrontApi};
use crate::config::ClientConfig;
use crate::storage::{FileStore, KeyValueStore};

/// Shared handles every component is built from.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub api: Arc<dyn StorefrontApi>,
    pub storage: Arc<dyn KeyValueStore>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(ClientConfig::from_env()?);
        Self::from_config(config)
    }

    pub fn from_config(config: Arc<ClientConfig>) -> anyhow::Result<Self> {
        let api = Arc::new(HttpApi::new(&config.api_base_url, config.request_timeout())?)
            as Arc<dyn StorefrontApi>;
        let storage = Arc::new(FileStore::open(&config.data_dir)?) as Arc<dyn KeyValueStore>;
        Ok(Self {
            config,
            api,
            storage,
        })
    }

    pub fn from_parts(
        config: Arc<ClientConfig>,
        api: Arc<dyn StorefrontApi>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config,
            api,
            storage,
        }
    }

    #[cfg(test)]
    pub(crate) fn fake_with(api: Arc<crate::api::fake::FakeBackend>) -> Self {
        use crate::config::PricingConfig;
        use crate::storage::MemoryStore;

        let config = Arc::new(ClientConfig {
            api_base_url: "http://fake.local".into(),
            data_dir: std::env::temp_dir(),
            pricing: PricingConfig {
                delivery_fee: 50.0,
                free_delivery_threshold: 500.0,
            },
            toast_duration_ms: 3000,
            request_timeout_secs: 5,
            currency: "Birr".into(),
        });
        Self {
            config,
            api,
            storage: Arc::new(MemoryStore::new()),
        }
    }
}
