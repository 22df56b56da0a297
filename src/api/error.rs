use thiserror::Error;

/// Failure talking to the backend. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the body's `message` field or a generic fallback.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 401/403: the bearer token is missing, expired or rejected.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx with a body that lacks the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed ({status})"));
        if status == 401 || status == 403 {
            ApiError::Unauthorized { status, message }
        } else {
            ApiError::Status { status, message }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Unauthorized { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_falls_back_to_status() {
        let e = ApiError::from_status(500, None);
        assert_eq!(e.to_string(), "Request failed (500)");
        let e = ApiError::from_status(404, Some("Order not found".into()));
        assert_eq!(e.to_string(), "Order not found");
        assert_eq!(e.status(), Some(404));
    }

    #[test]
    fn auth_statuses_are_distinct() {
        assert!(ApiError::from_status(401, None).is_auth());
        assert!(ApiError::from_status(403, Some("Forbidden".into())).is_auth());
        assert!(!ApiError::from_status(400, None).is_auth());
    }
}
