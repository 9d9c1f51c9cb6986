//! # Service Facades
//!
//! Thin wrappers handing each call straight to a storage implementation.
//! They add no validation; results and errors are returned unchanged.
//!
//! ## Usage
//! ```rust,ignore
//! let products = ProductService::new(db.product_storage(Driver::Postgres)?);
//! let all = products.get_all().await?;
//!
//! let invoices = InvoiceService::new(db.invoice_storage(Driver::Postgres)?);
//! invoices.create(&mut invoice).await?;
//! ```

use billing_core::{Invoice, Product, Products};

use crate::error::DbResult;
use crate::repository::{InvoiceStorage, Migrate, ProductStorage};

/// Product operations.
pub struct ProductService {
    storage: Box<dyn ProductStorage>,
}

impl ProductService {
    /// Creates a new ProductService over `storage`.
    pub fn new(storage: Box<dyn ProductStorage>) -> Self {
        ProductService { storage }
    }

    /// Creates the `products` table if it does not exist.
    pub async fn migrate(&self) -> DbResult<()> {
        self.storage.migrate().await
    }

    /// Inserts `product` and assigns its generated id.
    pub async fn create(&self, product: &mut Product) -> DbResult<()> {
        self.storage.create(product).await
    }

    /// Returns every product.
    pub async fn get_all(&self) -> DbResult<Products> {
        self.storage.get_all().await
    }

    /// Returns the product with `id`, or `DbError::NotFound`.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        self.storage.get_by_id(id).await
    }

    /// Overwrites the stored product with the same id.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        self.storage.update(product).await
    }

    /// Deletes the product with `id`.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        self.storage.delete(id).await
    }
}

/// Invoice operations.
pub struct InvoiceService {
    storage: Box<dyn InvoiceStorage>,
}

impl InvoiceService {
    /// Creates a new InvoiceService over `storage`.
    pub fn new(storage: Box<dyn InvoiceStorage>) -> Self {
        InvoiceService { storage }
    }

    /// Persists the header and every item atomically.
    pub async fn create(&self, invoice: &mut Invoice) -> DbResult<()> {
        self.storage.create(invoice).await
    }
}

/// Schema creation for `invoice_headers`.
pub struct InvoiceHeaderService {
    storage: Box<dyn Migrate>,
}

impl InvoiceHeaderService {
    /// Creates a new InvoiceHeaderService over `storage`.
    pub fn new(storage: Box<dyn Migrate>) -> Self {
        InvoiceHeaderService { storage }
    }

    /// Creates the `invoice_headers` table if it does not exist.
    pub async fn migrate(&self) -> DbResult<()> {
        self.storage.migrate().await
    }
}

/// Schema creation for `invoice_items`.
pub struct InvoiceItemService {
    storage: Box<dyn Migrate>,
}

impl InvoiceItemService {
    /// Creates a new InvoiceItemService over `storage`.
    pub fn new(storage: Box<dyn Migrate>) -> Self {
        InvoiceItemService { storage }
    }

    /// Creates the `invoice_items` table if it does not exist.
    pub async fn migrate(&self) -> DbResult<()> {
        self.storage.migrate().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
