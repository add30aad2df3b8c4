//! stale: find Keycloak identity-provider users created before a cutoff.
//!
//! Resolves the age criteria to an epoch-millisecond threshold, reads the
//! matching users from Keycloak's database, and renders them as
//! comma-separated lines. Read-only: nothing is ever modified.

pub mod config;
pub mod error;
pub mod report;
pub mod schema;
pub mod store;
pub mod threshold;

pub use config::{Config, DatabaseConfig};
pub use error::{Error, Result};
pub use report::{render, report_users, write_report, Field, OutputSelection};
pub use schema::UserRecord;
pub use store::{Store, TableRef};
pub use threshold::{resolve, resolve_now, AgeCriteria, Threshold, ThresholdSource};
