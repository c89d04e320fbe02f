//! CareCompanion coordination core.
//!
//! The domain layer behind the caregiving dashboard: medication schedules
//! and dose alerting (`dosing`, `medications`), the append-only dose log
//! (`dose_log`), dashboard stats (`home`), and role-gated care-team
//! administration (`authorization`, `user_admin`), all on top of a SQLite
//! store (`db`).
//!
//! Time never comes from an ambient clock — every classification and every
//! recorded action takes `now` from the caller, so behavior is reproducible
//! down to the instant.

pub mod authorization;
pub mod config;
pub mod db;
pub mod dose_log;
pub mod dosing;
pub mod home;
pub mod medications;
pub mod models;
pub mod user_admin;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the embedding application.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
