//! Auth RPC request and response shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Credentials submitted to the login/register RPCs.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "not a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Response body of `/rpc/login`, `/rpc/register` and `/rpc/verify_jwt`.
///
/// The RPCs report failure in-band (`success=false` with a message) rather
/// than through HTTP status codes.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Minimal identity cached alongside the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub email: String,
}
