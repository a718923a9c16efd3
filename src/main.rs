// SPDX-License-Identifier: MIT

//! Rounds-Tracker terminal client
//!
//! Restores the persisted auth session (logging in with env credentials if
//! needed), then prints every session the user belongs to together with
//! its per-participant totals.

use rounds_tracker::{
    config::Config,
    services::{AuthStatus, SessionView},
    AppContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(backend = %config.postgrest_url, "Starting Rounds-Tracker client");

    let context = AppContext::new(config);

    // Startup resolves to exactly one of authenticated/unauthenticated.
    let identity = match context.auth.startup().await {
        AuthStatus::Authenticated(identity) => identity,
        AuthStatus::Unauthenticated => {
            let (email, password) = match (
                std::env::var("ROUNDS_EMAIL"),
                std::env::var("ROUNDS_PASSWORD"),
            ) {
                (Ok(e), Ok(p)) => (e, p),
                _ => {
                    tracing::error!(
                        "No valid stored session; set ROUNDS_EMAIL and ROUNDS_PASSWORD to log in"
                    );
                    std::process::exit(1);
                }
            };
            context.auth.login(&email, &password).await?.identity
        }
    };
    tracing::info!(user_id = %identity.user_id, email = %identity.email, "Signed in");

    let sessions = context.sessions.list_sessions_for_user(identity.user_id).await?;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for session in sessions {
        let mut view = SessionView::new(session.session_id);
        if let Err(e) = view.reload(&context).await {
            tracing::warn!(session_id = %session.session_id, error = %e, "Skipping session");
            continue;
        }

        println!("\n{} [{:?}]", session.name, session.status);
        for totals in view.totals() {
            println!(
                "  {:<20} {:>3} drinks  {:>6} ml  {:>8.1} ml alcohol",
                totals.username, totals.drink_count, totals.total_volume_ml, totals.total_alcohol_ml
            );
        }
    }

    Ok(())
}

/// Initialize env-filtered logging to stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rounds_tracker=info,warn")),
        )
        .with(format)
        .init();
}
