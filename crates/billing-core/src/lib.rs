//! # billing-core: Domain Types for Billing
//!
//! This crate contains the data model shared by the storage layer and
//! its callers. It performs no I/O.
//!
//! ## Entities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Product ◄──────────────┐                                             │
//! │                          │ product_id                                   │
//! │   Invoice (aggregate)    │                                              │
//! │   ├── InvoiceHeader ◄────┼──── invoice_header_id                       │
//! │   └── Vec<InvoiceItem> ──┘                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers and timestamps are assigned by storage. Records are built
//! with `id == 0` and the storage layer writes the generated values back
//! into the caller's record.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::CoreError;
pub use types::*;

