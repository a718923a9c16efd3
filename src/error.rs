// SPDX-License-Identifier: MIT

//! Application error types shared by every service.
//!
//! All network failures are converted into one of these variants at the
//! service boundary; no raw reqwest or serde error reaches a caller.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Credentials rejected: {0}")]
    CredentialsRejected(String),

    #[error("An account with this email already exists")]
    AccountExists,

    #[error("User is not a participant of this session")]
    NotAParticipant,

    #[error("User has already joined this session")]
    AlreadyMember,

    #[error("Only the recording user may modify this entry")]
    NotOwner,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transient network failure: {0}")]
    Transient(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether re-issuing the user action may succeed without any change.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }

    /// Whether this error should be shown inline as a user-correctable
    /// message rather than a generic failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::CredentialsRejected(_)
                | AppError::AccountExists
                | AppError::NotAParticipant
                | AppError::AlreadyMember
                | AppError::NotOwner
                | AppError::NotFound(_)
        )
    }

    /// Classify a non-success HTTP status from the backend.
    ///
    /// 409 stays a generic `Conflict`; callers that know which uniqueness
    /// constraint applies refine it (e.g. join -> `AlreadyMember`).
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => AppError::Validation(body),
            401 | 403 => AppError::CredentialsRejected(body),
            404 => AppError::NotFound(body),
            409 => AppError::Conflict(body),
            408 | 429 | 502 | 503 | 504 => {
                AppError::Transient(format!("HTTP {}: {}", status, body))
            }
            _ => AppError::Backend(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Convert a reqwest transport error.
    ///
    /// Timeouts and connection failures are retryable; anything else is an
    /// unexpected backend interaction problem.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AppError::Transient(err.to_string())
        } else {
            AppError::Backend(err.to_string())
        }
    }
}

/// Result type alias for services.
pub type Result<T> = std::result::Result<T, AppError>;
