// SPDX-License-Identifier: MIT

//! Per-participant consumption totals derived from the ledger.
//!
//! Aggregation is a pure function of the ledger snapshot plus the drink-type
//! catalog; it performs no I/O and is deterministic for a given snapshot.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::drink::{DrinkRecord, DrinkType};
use crate::models::session::Participant;

/// Derived totals for one participant of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantTotals {
    pub user_id: Uuid,
    /// Display name from the participant row
    pub username: String,
    pub drink_count: u32,
    pub total_volume_ml: i64,
    pub total_alcohol_ml: f64,
}

impl ParticipantTotals {
    fn zero(participant: &Participant) -> Self {
        Self {
            user_id: participant.user_id,
            username: participant.display_name(),
            drink_count: 0,
            total_volume_ml: 0,
            total_alcohol_ml: 0.0,
        }
    }
}

/// Compute totals for every participant of a session.
///
/// Every participant appears in the result, in participant-list order;
/// participants with no records get all-zero totals. A record whose drink
/// type cannot be resolved (neither embedded nor present in the catalog)
/// still contributes its volume but adds zero alcohol, so display stays
/// usable when the query layer drops an embedding.
///
/// Records for users who are not in the participant list are ignored; the
/// ledger invariant says they should not exist, and a stale row must not
/// invent a participant card.
pub fn aggregate(
    participants: &[Participant],
    drinks: &[DrinkRecord],
    catalog: &[DrinkType],
) -> Vec<ParticipantTotals> {
    let percentages: HashMap<i32, f64> = catalog
        .iter()
        .map(|t| (t.drink_type_id, t.alcohol_percentage))
        .collect();

    let mut totals: Vec<ParticipantTotals> =
        participants.iter().map(ParticipantTotals::zero).collect();
    let index: HashMap<Uuid, usize> = participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.user_id, i))
        .collect();

    for drink in drinks {
        let Some(&i) = index.get(&drink.user_id) else {
            continue;
        };
        let entry = &mut totals[i];
        entry.drink_count += 1;
        entry.total_volume_ml += drink.amount_ml;
        if let Some(pct) = resolve_percentage(drink, &percentages) {
            entry.total_alcohol_ml += drink.amount_ml as f64 * pct / 100.0;
        }
    }

    totals
}

/// Alcohol percentage for a record: embedded type first, catalog second.
fn resolve_percentage(drink: &DrinkRecord, catalog: &HashMap<i32, f64>) -> Option<f64> {
    drink
        .drink_type
        .as_ref()
        .map(|t| t.alcohol_percentage)
        .or_else(|| catalog.get(&drink.drink_type_id).copied())
}
