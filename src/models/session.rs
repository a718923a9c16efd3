// SPDX-License-Identifier: MIT

//! Session and participant models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::drink::UserRef;

/// Lifecycle status of a session. Transitions active -> ended only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// A bounded social gathering during which drinks are logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub name: String,
    /// Owner (creator) of the session
    pub created_by: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether new drink entries may still be recorded against this session.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Insert body for `/sessions`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSession {
    pub name: String,
    pub created_by: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: SessionStatus,
}

/// PATCH body for `/sessions`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Membership row joining a user to a session.
///
/// Unique on (session_id, user_id); a user joins a session at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    /// Embedded display name (`select=*,users(username)`); absent when the
    /// query did not embed the users relation.
    #[serde(default, rename = "users")]
    pub user: Option<UserRef>,
}

impl Participant {
    /// Display name for presentation, falling back to the user id.
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

/// Insert body for `/session_participants`.
#[derive(Debug, Clone, Serialize)]
pub struct NewParticipant {
    pub session_id: Uuid,
    pub user_id: Uuid,
}
