use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiError, StorefrontApi};
use crate::state::AppState;
use crate::storage::{keys, KeyValueStore};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("No token returned from server")]
    MissingToken,
    #[error("Session expired, please sign in again")]
    ReauthRequired,
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Api(#[from] ApiError),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Bearer-token session for the admin dashboard; the token lives in the `admin_token` slot.
#[derive(Clone)]
pub struct AdminSession {
    pub(crate) api: Arc<dyn StorefrontApi>,
    storage: Arc<dyn KeyValueStore>,
}

impl AdminSession {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: Arc::clone(&state.api),
            storage: Arc::clone(&state.storage),
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.get(keys::ADMIN_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "admin token unreadable");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AdminError> {
        let email = email.trim();
        if !is_valid_email(email) {
            warn!(%email, "invalid email");
            return Err(AdminError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(AdminError::MissingPassword);
        }

        let response = match self.api.admin_login(email, password).await {
            Ok(r) => r,
            Err(e) => {
                warn!(%email, error = %e, "admin login rejected");
                return Err(AdminError::Api(e));
            }
        };
        let Some(token) = response.token else {
            error!(%email, "login succeeded without a token");
            return Err(AdminError::MissingToken);
        };

        if let Err(e) = self.storage.set(keys::ADMIN_TOKEN, &token) {
            warn!(error = %e, "admin token not persisted");
        }
        info!(%email, "admin logged in");
        Ok(())
    }

    pub fn logout(&self) {
        self.clear_token();
        info!("admin logged out");
    }

    pub(crate) fn require_token(&self) -> Result<String, AdminError> {
        self.token().ok_or(AdminError::ReauthRequired)
    }

    fn clear_token(&self) {
        if let Err(e) = self.storage.remove(keys::ADMIN_TOKEN) {
            warn!(error = %e, "admin token not cleared");
        }
    }

    /// Maps an admin call's outcome; a rejected token is dropped and re-login is required.
    pub(crate) fn settle<T>(&self, result: Result<T, ApiError>) -> Result<T, AdminError> {
        match result {
            Ok(v) => Ok(v),
            Err(e) if e.is_auth() => {
                warn!(error = %e, "admin token rejected; clearing");
                self.clear_token();
                Err(AdminError::ReauthRequired)
            }
            Err(e) => Err(AdminError::Api(e)),
        }
    }
}
