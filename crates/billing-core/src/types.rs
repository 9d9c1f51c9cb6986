//! # Domain Types
//!
//! Records persisted by the storage layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  InvoiceHeader  │   │  InvoiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  client         │   │  header_id (FK) │       │
//! │  │  observations   │   │  created_at     │   │  product_id(FK) │       │
//! │  │  price          │   │  updated_at     │   │  created_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Invoice      │   │     Driver      │                             │
//! │  │  header + items │   │  MySql          │                             │
//! │  │  (one unit)     │   │  Postgres       │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage-Assigned Fields
//! `id` is `0` until the record has been inserted. After insertion it is
//! never changed. Invoice timestamps are `None` until a backend that can
//! return generated columns (PostgreSQL) fills them in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Driver
// =============================================================================

/// The SQL dialect a storage handle talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Driver {
    /// MySQL / MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
}

impl Driver {
    /// Canonical upper-case name (`MYSQL`, `POSTGRES`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Driver::MySql => "MYSQL",
            Driver::Postgres => "POSTGRES",
        }
    }

    /// Prefix of the environment keys holding this driver's connection
    /// parameters (`MYSQL_USER_DB`, `POSTGRES_PORT_DB`, ...).
    pub const fn env_prefix(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = CoreError;

    /// Parses a driver name, case-insensitively.
    ///
    /// `"postgresql"` and `"pg"` are accepted as aliases of `POSTGRES`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MYSQL" => Ok(Driver::MySql),
            "POSTGRES" | "POSTGRESQL" | "PG" => Ok(Driver::Postgres),
            _ => Err(CoreError::UnknownDriver(s.to_string())),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be referenced by invoice items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Storage-assigned identifier. `0` until inserted.
    pub id: i64,

    /// Display name. Required.
    pub name: String,

    /// Free-form notes. An empty string is stored as NULL and NULL is read
    /// back as an empty string.
    pub observations: String,

    /// Price in the smallest currency unit.
    pub price: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated. `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates an unsaved product stamped with the current time.
    pub fn new(name: impl Into<String>, observations: impl Into<String>, price: i64) -> Self {
        Product {
            id: 0,
            name: name.into(),
            observations: observations.into(),
            price,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Returns `true` once storage has assigned an identifier.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Shorthand for a list of products.
pub type Products = Vec<Product>;

// =============================================================================
// Invoice Header
// =============================================================================

/// Invoice header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Storage-assigned identifier. `0` until inserted.
    pub id: i64,

    /// Client the invoice is issued to. Required.
    pub client: String,

    /// Creation time, when returned by the backend.
    pub created_at: Option<DateTime<Utc>>,

    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl InvoiceHeader {
    /// Creates an unsaved header for the given client.
    pub fn new(client: impl Into<String>) -> Self {
        InvoiceHeader {
            id: 0,
            client: client.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// One line of an invoice, referencing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Storage-assigned identifier. `0` until inserted.
    pub id: i64,

    /// Owning header. Set by storage when the item is inserted.
    pub invoice_header_id: i64,

    /// Referenced product.
    pub product_id: i64,

    /// Creation time, when returned by the backend.
    pub created_at: Option<DateTime<Utc>>,

    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl InvoiceItem {
    /// Creates an unsaved item for a product.
    pub fn new(product_id: i64) -> Self {
        InvoiceItem {
            id: 0,
            invoice_header_id: 0,
            product_id,
            created_at: None,
            updated_at: None,
        }
    }
}

// =============================================================================
// Invoice (aggregate)
// =============================================================================

/// An invoice header plus its items, persisted as one unit.
///
/// Items keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub header: InvoiceHeader,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Creates an invoice for `client` with no items.
    pub fn new(client: impl Into<String>) -> Self {
        Invoice {
            header: InvoiceHeader::new(client),
            items: Vec::new(),
        }
    }

    /// Appends an item for `product_id`.
    pub fn with_item(mut self, product_id: i64) -> Self {
        self.items.push(InvoiceItem::new(product_id));
        self
    }

    /// Appends an item for `product_id` in place.
    pub fn add_item(&mut self, product_id: i64) {
        self.items.push(InvoiceItem::new(product_id));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
