// SPDX-License-Identifier: MIT

//! Drink catalog and ledger models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named beverage category with its alcohol percentage.
///
/// Global catalog, read-only to ordinary users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkType {
    pub drink_type_id: i32,
    pub name: String,
    /// Alcohol content in percent, within [0, 100]
    pub alcohol_percentage: f64,
    pub created_at: DateTime<Utc>,
}

/// Embedded user reference from a `users(username)` select.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    pub username: String,
}

/// One logged consumption event.
///
/// Belongs to exactly one session and one participant; deletable only by
/// its recording user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub drink_id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub drink_type_id: i32,
    /// Volume in milliliters, always positive
    pub amount_ml: i64,
    pub consumed_at: DateTime<Utc>,
    /// Embedded catalog row (`select=*,drink_types(*)`); may be absent if
    /// the embedding was silently dropped by the query layer.
    #[serde(default, rename = "drink_types")]
    pub drink_type: Option<DrinkType>,
    /// Embedded recording user's display name
    #[serde(default, rename = "users")]
    pub user: Option<UserRef>,
}

/// Insert body for `/drinks`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDrink {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub drink_type_id: i32,
    pub amount_ml: i64,
    pub consumed_at: DateTime<Utc>,
}
