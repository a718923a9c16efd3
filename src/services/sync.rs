// SPDX-License-Identifier: MIT

//! Client synchronization policy for a session view.
//!
//! The view never patches its state in place after a mutation. Instead it
//! runs one invalidate-and-refetch cycle: `Idle -> Loading -> Ready` on
//! first entry, `Ready -> Loading -> Ready` after every mutating action.
//! A reload fetches the session, participant list, ledger and catalog as
//! one snapshot and only then recomputes aggregates.
//!
//! Reloads are generation-stamped. A reload that completes after the view
//! has switched to another session (or after a newer reload started) is
//! discarded, so a late-arriving result can never overwrite fresher state.

use crate::error::Result;
use crate::models::drink::{DrinkRecord, DrinkType};
use crate::models::session::{Participant, Session};
use crate::models::stats::{aggregate, ParticipantTotals};
use uuid::Uuid;

/// Everything a session view displays, fetched as one consistent unit.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Session,
    pub participants: Vec<Participant>,
    pub drinks: Vec<DrinkRecord>,
    pub drink_types: Vec<DrinkType>,
}

impl SessionSnapshot {
    /// Per-participant totals derived from this snapshot.
    pub fn totals(&self) -> Vec<ParticipantTotals> {
        aggregate(&self.participants, &self.drinks, &self.drink_types)
    }
}

/// Source of full session snapshots.
///
/// The live implementation issues the four fetches concurrently and joins
/// them; tests substitute an in-memory fake.
pub trait SnapshotSource {
    fn fetch_snapshot(
        &self,
        session_id: Uuid,
    ) -> impl std::future::Future<Output = Result<SessionSnapshot>> + Send;
}

/// Witness of one in-flight reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    session_id: Uuid,
    generation: u64,
}

/// How a completed reload was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The snapshot was applied to the view.
    Applied,
    /// The view had moved on; the result was discarded.
    Stale,
}

/// How a requested mutation was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation ran and the view was reloaded.
    Applied,
    /// A reload was already in flight; the request was ignored.
    Ignored,
}

#[derive(Debug, Clone)]
enum ViewState {
    Idle,
    Loading { prior: Option<SessionSnapshot> },
    Ready(SessionSnapshot),
}

/// State machine for one displayed session.
#[derive(Debug, Clone)]
pub struct SessionView {
    session_id: Uuid,
    generation: u64,
    state: ViewState,
}

impl SessionView {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            generation: 0,
            state: ViewState::Idle,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    /// The currently displayed snapshot, if any.
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match &self.state {
            ViewState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Totals of the currently displayed snapshot.
    pub fn totals(&self) -> Vec<ParticipantTotals> {
        self.snapshot().map(|s| s.totals()).unwrap_or_default()
    }

    /// Point the view at a different session, dropping any displayed or
    /// in-flight state. Outstanding tickets become stale.
    pub fn switch_session(&mut self, session_id: Uuid) {
        self.session_id = session_id;
        self.generation += 1;
        self.state = ViewState::Idle;
    }

    /// Start a reload cycle: enter `Loading` and stamp a ticket.
    ///
    /// The prior snapshot is kept aside so a failed reload can restore it
    /// instead of leaving a blank view.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.generation += 1;
        let prior = match std::mem::replace(&mut self.state, ViewState::Idle) {
            ViewState::Ready(snapshot) => Some(snapshot),
            ViewState::Loading { prior } => prior,
            ViewState::Idle => None,
        };
        self.state = ViewState::Loading { prior };
        ReloadTicket {
            session_id: self.session_id,
            generation: self.generation,
        }
    }

    /// Finish a reload cycle.
    ///
    /// A stale ticket (the view switched sessions or a newer reload
    /// started) is discarded without touching the state. A fetch failure
    /// restores the prior snapshot and propagates the error.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<SessionSnapshot>,
    ) -> Result<ReloadOutcome> {
        if ticket.generation != self.generation || ticket.session_id != self.session_id {
            tracing::debug!(session_id = %ticket.session_id, "Discarding stale reload result");
            return Ok(ReloadOutcome::Stale);
        }

        match result {
            Ok(snapshot) => {
                self.state = ViewState::Ready(snapshot);
                Ok(ReloadOutcome::Applied)
            }
            Err(e) => {
                // Keep showing what was loaded before the failed cycle.
                let prior = match std::mem::replace(&mut self.state, ViewState::Idle) {
                    ViewState::Loading { prior } => prior,
                    ViewState::Ready(snapshot) => Some(snapshot),
                    ViewState::Idle => None,
                };
                self.state = match prior {
                    Some(snapshot) => ViewState::Ready(snapshot),
                    None => ViewState::Idle,
                };
                Err(e)
            }
        }
    }

    /// Run one full invalidate-and-refetch cycle against `source`.
    pub async fn reload<S: SnapshotSource>(&mut self, source: &S) -> Result<ReloadOutcome> {
        let ticket = self.begin_reload();
        let result = source.fetch_snapshot(ticket.session_id).await;
        self.complete_reload(ticket, result)
    }

    /// Run a mutating action followed by the mandatory reload.
    ///
    /// While a reload is in flight the request is ignored, so two
    /// overlapping cycles can never race each other from the same view.
    pub async fn apply_mutation<S, F, Fut>(
        &mut self,
        source: &S,
        op: F,
    ) -> Result<MutationOutcome>
    where
        S: SnapshotSource,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        if self.is_loading() {
            tracing::debug!(session_id = %self.session_id, "Mutation ignored while reloading");
            return Ok(MutationOutcome::Ignored);
        }
        op().await?;
        self.reload(source).await?;
        Ok(MutationOutcome::Applied)
    }
}
