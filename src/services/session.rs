// SPDX-License-Identifier: MIT

//! Session directory: sessions and membership against the "alc" schema.

use crate::error::{AppError, Result};
use crate::models::session::{
    NewParticipant, NewSession, Participant, Session, SessionPatch, SessionStatus,
};
use crate::services::postgrest::PostgrestClient;
use chrono::Utc;
use uuid::Uuid;

/// Directory of sessions and their participants.
#[derive(Clone)]
pub struct SessionService {
    api: PostgrestClient,
}

impl SessionService {
    pub fn new(api: PostgrestClient) -> Self {
        Self { api }
    }

    /// Create a session owned by `owner` and auto-join the owner as its
    /// first participant.
    pub async fn create_session(&self, name: &str, owner: Uuid) -> Result<Session> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("session name must not be empty".into()));
        }

        let body = NewSession {
            name: name.to_string(),
            created_by: owner,
            start_time: Utc::now(),
            status: SessionStatus::Active,
        };
        let mut rows: Vec<Session> = self.api.post_returning("/sessions", &body).await?;
        let session = rows
            .pop()
            .ok_or_else(|| AppError::Backend("insert returned no session row".into()))?;

        // The creator logs drinks too; membership is what the ledger checks.
        match self.join_session(session.session_id, owner).await {
            Ok(()) | Err(AppError::AlreadyMember) => {}
            Err(e) => return Err(e),
        }

        tracing::info!(session_id = %session.session_id, name = %session.name, "Session created");
        Ok(session)
    }

    /// Fetch one session by id.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Session> {
        let rows: Vec<Session> = self
            .api
            .get_json(&format!("/sessions?session_id=eq.{}&select=*", session_id))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))
    }

    /// Sessions the user owns or participates in.
    pub async fn list_sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>> {
        self.api
            .get_json(&format!(
                "/sessions?or=(created_by.eq.{0},session_participants.user_id.eq.{0})&select=*",
                user_id
            ))
            .await
    }

    /// Insert a membership row. A second join by the same user yields
    /// `AlreadyMember` and leaves the participant set unchanged.
    pub async fn join_session(&self, session_id: Uuid, user_id: Uuid) -> Result<()> {
        // Surface a missing session as such instead of a bare FK violation.
        self.get_session(session_id).await?;

        let body = NewParticipant {
            session_id,
            user_id,
        };
        match self.api.post_no_content("/session_participants", &body).await {
            Ok(()) => Ok(()),
            Err(AppError::Conflict(_)) => Err(AppError::AlreadyMember),
            Err(e) => Err(e),
        }
    }

    /// Participants of a session, enriched with display names.
    pub async fn list_participants(&self, session_id: Uuid) -> Result<Vec<Participant>> {
        self.api
            .get_json(&format!(
                "/session_participants?session_id=eq.{}&select=*,users(username)",
                session_id
            ))
            .await
    }

    /// Owner-only update of name or status.
    pub async fn update_session(
        &self,
        session_id: Uuid,
        actor: Uuid,
        patch: SessionPatch,
    ) -> Result<Session> {
        self.ensure_owner(session_id, actor).await?;
        let mut rows: Vec<Session> = self
            .api
            .patch_returning(&format!("/sessions?session_id=eq.{}", session_id), &patch)
            .await?;
        rows.pop()
            .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))
    }

    /// Owner-only transition to `ended`, stamping the end time.
    pub async fn end_session(&self, session_id: Uuid, actor: Uuid) -> Result<Session> {
        let patch = SessionPatch {
            status: Some(SessionStatus::Ended),
            end_time: Some(Utc::now()),
            ..SessionPatch::default()
        };
        self.update_session(session_id, actor, patch).await
    }

    /// Owner-only hard delete.
    pub async fn delete_session(&self, session_id: Uuid, actor: Uuid) -> Result<()> {
        self.ensure_owner(session_id, actor).await?;
        self.api
            .delete(&format!("/sessions?session_id=eq.{}", session_id))
            .await
    }

    async fn ensure_owner(&self, session_id: Uuid, actor: Uuid) -> Result<()> {
        let session = self.get_session(session_id).await?;
        if session.created_by != actor {
            return Err(AppError::NotOwner);
        }
        Ok(())
    }
}
