//! # billing-db: Database Layer for Billing
//!
//! Persistence for products and invoices on PostgreSQL or MySQL, using
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Billing Data Flow                              │
//! │                                                                         │
//! │  Caller (demo binary, service, ...)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    billing-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐   │   │
//! │  │  │ Connection   │   │   Factory     │   │  Repositories    │   │   │
//! │  │  │ Manager      │──►│  (pool.rs)    │──►│  postgres.rs     │   │   │
//! │  │  │ (do-once)    │   │  Database     │   │  mysql.rs        │   │   │
//! │  │  └──────────────┘   └───────────────┘   │  invoice.rs (tx) │   │   │
//! │  │                                          └──────────────────┘   │   │
//! │  │  ┌──────────────┐   ┌───────────────┐                          │   │
//! │  │  │  Services    │   │   Mapping     │                          │   │
//! │  │  │ (pass-thru)  │   │ (NULL rules)  │                          │   │
//! │  │  └──────────────┘   └───────────────┘                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL  or  MySQL                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection parameters from `.env` / environment
//! - [`connection`] - One-time connection initialization
//! - [`pool`] - Database handle and repository factory
//! - [`repository`] - Storage contracts and dialect implementations
//! - [`mapping`] - NULL conversions and row types
//! - [`service`] - Pass-through facades
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billing_core::{Driver, Invoice, Product};
//! use billing_db::{ConnectionManager, DbConfig, ProductService};
//!
//! let manager = ConnectionManager::new();
//! let db = manager.connect(&DbConfig::from_env(Driver::Postgres)?).await?;
//! db.migrate_all().await?;
//!
//! let products = ProductService::new(db.product_storage(Driver::Postgres)?);
//! let mut coffee = Product::new("Coffee", "", 350);
//! products.create(&mut coffee).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod connection;
pub mod error;
pub mod mapping;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::DbConfig;
pub use connection::ConnectionManager;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbPool};

pub use repository::invoice::InvoiceRepository;
pub use repository::{
    InvoiceHeaderStorage, InvoiceItemStorage, InvoiceStorage, Migrate, ProductStorage,
};
pub use service::{InvoiceHeaderService, InvoiceItemService, InvoiceService, ProductService};
