//! Repository layer — entity-scoped database operations.
//!
//! Plain functions over a `rusqlite::Connection`, one sub-module per entity.
//! Feature modules (`medications`, `home`, …) build their view queries on
//! top of these.

pub mod caregiver;
pub mod medication;
pub mod medication_log;
pub mod patient;

pub use caregiver::*;
pub use medication::*;
pub use medication_log::*;
pub use patient::*;
