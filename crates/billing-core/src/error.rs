//! # Error Types
//!
//! Domain-level errors for billing-core. Database failures live in
//! `billing-db::DbError`, which absorbs these via `From`.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A driver name that is neither `MYSQL` nor `POSTGRES`.
    #[error("driver not implemented: {0}")]
    UnknownDriver(String),
}
