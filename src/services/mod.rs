// SPDX-License-Identifier: MIT

//! Services module - client-side business logic.

pub mod auth;
pub mod drink;
pub mod postgrest;
pub mod session;
pub mod sync;

pub use auth::{AuthOutcome, AuthService, AuthStatus};
pub use drink::DrinkService;
pub use postgrest::PostgrestClient;
pub use session::SessionService;
pub use sync::{MutationOutcome, ReloadOutcome, SessionSnapshot, SessionView, SnapshotSource};
