// SPDX-License-Identifier: MIT

//! Consumption ledger: drink records scoped to one session and participant.
//!
//! The ledger enforces its invariants itself before any write reaches the
//! backend: volume must be positive, the drink type must exist in the
//! catalog, the session must still be active, and the recording user must
//! be a participant. Successful mutations never patch local state; callers
//! reload through the synchronization policy instead.

use crate::error::{AppError, Result};
use crate::models::drink::{DrinkRecord, DrinkType, NewDrink};
use crate::services::postgrest::PostgrestClient;
use crate::services::session::SessionService;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Ledger of drink records against the "alc" schema.
#[derive(Clone)]
pub struct DrinkService {
    api: PostgrestClient,
    sessions: SessionService,
}

impl DrinkService {
    pub fn new(api: PostgrestClient, sessions: SessionService) -> Self {
        Self { api, sessions }
    }

    /// The global drink-type catalog.
    pub async fn drink_types(&self) -> Result<Vec<DrinkType>> {
        self.api.get_json("/drink_types").await
    }

    /// All records of a session, oldest first, with the drink type and
    /// recording user's display name embedded for presentation.
    pub async fn list_drinks(&self, session_id: Uuid) -> Result<Vec<DrinkRecord>> {
        self.api
            .get_json(&format!(
                "/drinks?session_id=eq.{}&select=*,drink_types(*),users(username)&order=consumed_at.asc",
                session_id
            ))
            .await
    }

    /// Record a drink for a participant of a session.
    pub async fn add_drink(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        drink_type_id: i32,
        amount_ml: i64,
        consumed_at: DateTime<Utc>,
    ) -> Result<DrinkRecord> {
        if amount_ml <= 0 {
            return Err(AppError::Validation(
                "volume must be a positive number of milliliters".into(),
            ));
        }

        let catalog = self.drink_types().await?;
        if !catalog.iter().any(|t| t.drink_type_id == drink_type_id) {
            return Err(AppError::Validation(format!(
                "unknown drink type {}",
                drink_type_id
            )));
        }

        let session = self.sessions.get_session(session_id).await?;
        if !session.is_active() {
            return Err(AppError::Validation(
                "this session has ended; no new entries can be recorded".into(),
            ));
        }

        let participants = self.sessions.list_participants(session_id).await?;
        if !participants.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::NotAParticipant);
        }

        let body = NewDrink {
            session_id,
            user_id,
            drink_type_id,
            amount_ml,
            consumed_at,
        };
        let mut rows: Vec<DrinkRecord> = self.api.post_returning("/drinks", &body).await?;
        let record = rows
            .pop()
            .ok_or_else(|| AppError::Backend("insert returned no drink row".into()))?;

        tracing::info!(
            drink_id = %record.drink_id,
            session_id = %session_id,
            amount_ml,
            "Drink recorded"
        );
        Ok(record)
    }

    /// Permanently remove a record. Only its recording user may delete it;
    /// a second delete of the same id yields `NotFound`.
    pub async fn delete_drink(&self, drink_id: Uuid, requesting_user: Uuid) -> Result<()> {
        let rows: Vec<DrinkRecord> = self
            .api
            .get_json(&format!("/drinks?drink_id=eq.{}&select=*", drink_id))
            .await?;
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("drink {}", drink_id)))?;

        if record.user_id != requesting_user {
            return Err(AppError::NotOwner);
        }

        self.api
            .delete(&format!("/drinks?drink_id=eq.{}", drink_id))
            .await?;
        tracing::info!(drink_id = %drink_id, "Drink deleted");
        Ok(())
    }
}
