// SPDX-License-Identifier: MIT

//! Rounds-Tracker: shared drink-session ledger client
//!
//! This crate is the client core of a group drink-consumption tracker: it
//! authenticates against a PostgREST backend, manages sessions and their
//! participants, records drink entries, and derives per-participant totals
//! from full ledger snapshots.

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use credentials::CredentialStore;
use error::Result;
use services::sync::{SessionSnapshot, SnapshotSource};
use services::{AuthService, DrinkService, PostgrestClient, SessionService};
use uuid::Uuid;

/// Shared application context: configuration, the credential store and the
/// services wired on top of it.
///
/// Identity and token are injected through the shared [`CredentialStore`]
/// rather than looked up ambiently, so multiple contexts (e.g. two test
/// users) can coexist in one process.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub credentials: CredentialStore,
    pub auth: AuthService,
    pub sessions: SessionService,
    pub drinks: DrinkService,
}

impl AppContext {
    /// Wire up services against `config`, restoring persisted credentials.
    pub fn new(config: Config) -> Self {
        let credentials = CredentialStore::load(&config.credentials_path);
        Self::with_credentials(config, credentials)
    }

    /// Wire up services around an explicit credential store.
    pub fn with_credentials(config: Config, credentials: CredentialStore) -> Self {
        let auth_api = PostgrestClient::new(
            &config.postgrest_url,
            "auth",
            config.request_timeout_secs,
            credentials.clone(),
        );
        let domain_api = PostgrestClient::new(
            &config.postgrest_url,
            "alc",
            config.request_timeout_secs,
            credentials.clone(),
        );

        let auth = AuthService::new(auth_api, credentials.clone());
        let sessions = SessionService::new(domain_api.clone());
        let drinks = DrinkService::new(domain_api, sessions.clone());

        Self {
            config,
            credentials,
            auth,
            sessions,
            drinks,
        }
    }
}

impl SnapshotSource for AppContext {
    /// Fetch the four parts of a session view concurrently and join them
    /// before any aggregation runs.
    async fn fetch_snapshot(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let (session, participants, drinks, drink_types) = tokio::try_join!(
            self.sessions.get_session(session_id),
            self.sessions.list_participants(session_id),
            self.drinks.list_drinks(session_id),
            self.drinks.drink_types(),
        )?;

        Ok(SessionSnapshot {
            session,
            participants,
            drinks,
            drink_types,
        })
    }
}
