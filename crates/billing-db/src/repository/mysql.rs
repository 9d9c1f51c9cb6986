//! # MySQL Repositories
//!
//! Products, invoice headers and invoice items on MySQL.
//!
//! MySQL has no `RETURNING`; generated ids are read from the statement's
//! `LAST_INSERT_ID()`. Header and item `created_at` values are left unset.

use async_trait::async_trait;
use sqlx::mysql::MySqlQueryResult;
use sqlx::{MySqlConnection, MySqlPool};
use tracing::{debug, info};

use billing_core::{InvoiceHeader, InvoiceItem, Product, Products};

use super::queries::MYSQL;
use super::{InvoiceHeaderStorage, InvoiceItemStorage, Migrate, ProductStorage};
use crate::error::{DbError, DbResult};
use crate::mapping::{string_to_null, time_to_null, ProductRow};

/// Runs one create-table statement.
async fn run_migration(pool: &MySqlPool, table: &str, sql: &str) -> DbResult<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| DbError::migration(table, e))?;

    info!(table = %table, driver = "MYSQL", "Migration applied");
    Ok(())
}

/// Reads the AUTO_INCREMENT value produced by an insert.
fn inserted_id(result: &MySqlQueryResult) -> DbResult<i64> {
    i64::try_from(result.last_insert_id())
        .map_err(|_| DbError::Internal(format!("id out of range: {}", result.last_insert_id())))
}

// =============================================================================
// Products
// =============================================================================

/// Product repository for MySQL.
#[derive(Debug, Clone)]
pub struct MySqlProductRepository {
    pool: MySqlPool,
}

impl MySqlProductRepository {
    /// Creates a new MySqlProductRepository.
    pub fn new(pool: MySqlPool) -> Self {
        MySqlProductRepository { pool }
    }
}

#[async_trait]
impl Migrate for MySqlProductRepository {
    fn table(&self) -> &'static str {
        "products"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), MYSQL.migrate_product).await
    }
}

#[async_trait]
impl ProductStorage for MySqlProductRepository {
    async fn create(&self, product: &mut Product) -> DbResult<()> {
        debug!(name = %product.name, "Inserting product");

        let result = sqlx::query(MYSQL.create_product)
            .bind(&product.name)
            .bind(string_to_null(&product.observations))
            .bind(product.price)
            .bind(product.created_at)
            .execute(&self.pool)
            .await?;

        product.id = inserted_id(&result)?;
        debug!(id = product.id, "Product created");
        Ok(())
    }

    async fn get_all(&self) -> DbResult<Products> {
        let rows: Vec<ProductRow> = sqlx::query_as(MYSQL.get_all_products)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let row: Option<ProductRow> = sqlx::query_as(MYSQL.get_product_by_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(MYSQL.update_product)
            .bind(&product.name)
            .bind(string_to_null(&product.observations))
            .bind(product.price)
            .bind(time_to_null(product.updated_at))
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query(MYSQL.delete_product)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Invoice Headers
// =============================================================================

/// Invoice header repository for MySQL.
#[derive(Debug, Clone)]
pub struct MySqlInvoiceHeaderRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceHeaderRepository {
    /// Creates a new MySqlInvoiceHeaderRepository.
    pub fn new(pool: MySqlPool) -> Self {
        MySqlInvoiceHeaderRepository { pool }
    }
}

#[async_trait]
impl Migrate for MySqlInvoiceHeaderRepository {
    fn table(&self) -> &'static str {
        "invoice_headers"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), MYSQL.migrate_invoice_header).await
    }
}

#[async_trait]
impl InvoiceHeaderStorage for MySqlInvoiceHeaderRepository {
    type Db = sqlx::MySql;

    async fn create_tx(
        &self,
        conn: &mut MySqlConnection,
        header: &mut InvoiceHeader,
    ) -> DbResult<()> {
        let result = sqlx::query(MYSQL.create_invoice_header)
            .bind(&header.client)
            .execute(&mut *conn)
            .await?;

        header.id = inserted_id(&result)?;
        Ok(())
    }
}

// =============================================================================
// Invoice Items
// =============================================================================

/// Invoice item repository for MySQL.
#[derive(Debug, Clone)]
pub struct MySqlInvoiceItemRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceItemRepository {
    /// Creates a new MySqlInvoiceItemRepository.
    pub fn new(pool: MySqlPool) -> Self {
        MySqlInvoiceItemRepository { pool }
    }
}

#[async_trait]
impl Migrate for MySqlInvoiceItemRepository {
    fn table(&self) -> &'static str {
        "invoice_items"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), MYSQL.migrate_invoice_item).await
    }
}

#[async_trait]
impl InvoiceItemStorage for MySqlInvoiceItemRepository {
    type Db = sqlx::MySql;

    async fn create_many_tx(
        &self,
        conn: &mut MySqlConnection,
        header_id: i64,
        items: &mut [InvoiceItem],
    ) -> DbResult<()> {
        for item in items.iter_mut() {
            let result = sqlx::query(MYSQL.create_invoice_item)
                .bind(header_id)
                .bind(item.product_id)
                .execute(&mut *conn)
                .await?;

            item.id = inserted_id(&result)?;
            item.invoice_header_id = header_id;
        }

        debug!(header_id = header_id, count = items.len(), "Invoice items inserted");
        Ok(())
    }
}
