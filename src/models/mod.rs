// SPDX-License-Identifier: MIT

//! Typed wire models for the PostgREST schema.

pub mod auth;
pub mod drink;
pub mod session;
pub mod stats;

pub use auth::{AuthResponse, Credentials, UserIdentity};
pub use drink::{DrinkRecord, DrinkType, NewDrink, UserRef};
pub use session::{NewParticipant, NewSession, Participant, Session, SessionPatch, SessionStatus};
pub use stats::ParticipantTotals;
