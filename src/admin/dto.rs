use serde::{Deserialize, Serialize};

/// Request body for admin login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of admin login; a success without a token is still a failed login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}
