// SPDX-License-Identifier: MIT

//! Auth session manager: login, registration, token verification, logout.
//!
//! All state lives in the [`CredentialStore`]; on any successful login or
//! registration the token and identity are written together, so downstream
//! components never observe one without the other.

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::{AppError, Result};
use crate::models::auth::{AuthResponse, Credentials, UserIdentity};
use crate::services::postgrest::PostgrestClient;
use validator::Validate;

/// Resolved authentication state after the one-shot startup check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated(UserIdentity),
    Unauthenticated,
}

/// Outcome of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub identity: UserIdentity,
}

/// Client-side auth session manager against the "auth" schema RPCs.
#[derive(Clone)]
pub struct AuthService {
    api: PostgrestClient,
    credentials: CredentialStore,
}

#[derive(serde::Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(serde::Deserialize)]
struct VerifyResponse {
    success: bool,
}

impl AuthService {
    pub fn new(api: PostgrestClient, credentials: CredentialStore) -> Self {
        Self { api, credentials }
    }

    /// Request account creation and, on success, become authenticated.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let credentials = self.checked_credentials(email, password)?;
        let response: AuthResponse = self.api.rpc("register", &credentials).await?;
        self.apply_auth_response(response, true)
    }

    /// Exchange credentials for a token and, on success, become authenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let credentials = self.checked_credentials(email, password)?;
        let response: AuthResponse = self.api.rpc("login", &credentials).await?;
        self.apply_auth_response(response, false)
    }

    /// Ask the backend whether `token` is currently valid.
    ///
    /// Never fails: network or server trouble is treated as "invalid",
    /// since the only consumer is the startup check and an unusable token
    /// has the same consequence either way.
    pub async fn verify(&self, token: &str) -> bool {
        let request = VerifyRequest { token };
        match self.api.rpc::<VerifyResponse, _>("verify_jwt", &request).await {
            Ok(response) => response.success,
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed, treating as invalid");
                false
            }
        }
    }

    /// Drop the client-held credential. No server-side effect.
    pub fn logout(&self) {
        self.credentials.clear();
        tracing::info!("Logged out, credentials cleared");
    }

    /// One-shot startup resolution: restore the persisted token, verify it,
    /// and settle on exactly one of authenticated/unauthenticated.
    ///
    /// An expired token is an expected steady-state condition; it clears
    /// the store silently rather than surfacing an error.
    pub async fn startup(&self) -> AuthStatus {
        let (token, identity) = match (self.credentials.token(), self.credentials.identity()) {
            (Some(token), Some(identity)) => (token, identity),
            _ => return AuthStatus::Unauthenticated,
        };

        if self.verify(&token).await {
            tracing::info!(user_id = %identity.user_id, "Restored authenticated session");
            AuthStatus::Authenticated(identity)
        } else {
            self.credentials.clear();
            AuthStatus::Unauthenticated
        }
    }

    /// Currently cached identity, if authenticated.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.credentials.identity()
    }

    fn checked_credentials(&self, email: &str, password: &str) -> Result<Credentials> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(credentials)
    }

    /// Apply an auth RPC response: store token + identity atomically on
    /// success, map in-band failure to the right error kind.
    ///
    /// Kept synchronous so the decision logic is unit-testable without a
    /// backend.
    pub fn apply_auth_response(
        &self,
        response: AuthResponse,
        registering: bool,
    ) -> Result<AuthOutcome> {
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "request rejected".to_string());
            if registering && message.to_lowercase().contains("exist") {
                return Err(AppError::AccountExists);
            }
            return Err(AppError::CredentialsRejected(message));
        }

        let (token, user_id, email) = match (response.token, response.user_id, response.email) {
            (Some(t), Some(u), Some(e)) => (t, u, e),
            _ => {
                return Err(AppError::Backend(
                    "auth response reported success without token or identity".to_string(),
                ))
            }
        };

        let identity = UserIdentity { user_id, email };
        self.credentials.store(StoredCredentials {
            token,
            identity: identity.clone(),
        })?;
        tracing::info!(user_id = %identity.user_id, "Authenticated");
        Ok(AuthOutcome { identity })
    }
}
