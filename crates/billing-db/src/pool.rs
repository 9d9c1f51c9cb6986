//! # Database Pool Management
//!
//! Pool creation for PostgreSQL / MySQL and the repository factory.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Process startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env(driver) ← .env / environment                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(&config).await ← open pool + ping                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │   DbPool::Postgres(PgPool)              │                           │
//! │  │   DbPool::MySql(MySqlPool)              │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.product_storage(driver)  → Box<dyn ProductStorage>                 │
//! │  db.invoice_storage(driver)  → Box<dyn InvoiceStorage>                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold a clone of the pool; sqlx pools are reference
//! counted and safe to share between tasks.

use std::time::Duration;

use billing_core::Driver;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, MySqlPool, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::repository::invoice::InvoiceRepository;
use crate::repository::mysql::{
    MySqlInvoiceHeaderRepository, MySqlInvoiceItemRepository, MySqlProductRepository,
};
use crate::repository::postgres::{
    PgInvoiceHeaderRepository, PgInvoiceItemRepository, PgProductRepository,
};
use crate::repository::{
    InvoiceHeaderStorage, InvoiceItemStorage, InvoiceStorage, Migrate, ProductStorage,
};

/// The dialect-specific pool behind a [`Database`].
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    MySql(MySqlPool),
}

/// Database handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::connect(&config).await?;
/// db.migrate_all().await?;
///
/// let products = db.product_storage(db.driver())?;
/// let all = products.get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
    transaction_timeout: Option<Duration>,
}

impl Database {
    /// Opens a pool and verifies the server answers a ping.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::ConnectionFailed)` - pool could not be opened or
    ///   the ping failed
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        info!(url = %config.database_url(), "Initializing database connection");

        let pool = match config.driver {
            Driver::Postgres => DbPool::Postgres(
                PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_with(config.pg_options())
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
            ),
            Driver::MySql => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_with(config.mysql_options())
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
            ),
        };

        let db = Database {
            pool,
            transaction_timeout: config.transaction_timeout,
        };
        db.ping().await?;

        info!(
            driver = %config.driver,
            max_connections = config.max_connections,
            "Connected to database"
        );
        Ok(db)
    }

    /// Builds a handle without opening any connection.
    ///
    /// Connections are established on first use.
    pub fn connect_lazy(config: &DbConfig) -> Self {
        debug!(url = %config.database_url(), "Creating lazy database pool");

        let pool = match config.driver {
            Driver::Postgres => DbPool::Postgres(
                PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(config.pg_options()),
            ),
            Driver::MySql => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .connect_lazy_with(config.mysql_options()),
            ),
        };

        Database {
            pool,
            transaction_timeout: config.transaction_timeout,
        }
    }

    /// Wraps an existing PostgreSQL pool.
    pub fn from_pg_pool(pool: PgPool) -> Self {
        Database {
            pool: DbPool::Postgres(pool),
            transaction_timeout: None,
        }
    }

    /// Wraps an existing MySQL pool.
    pub fn from_mysql_pool(pool: MySqlPool) -> Self {
        Database {
            pool: DbPool::MySql(pool),
            transaction_timeout: None,
        }
    }

    /// The dialect this handle talks to.
    pub fn driver(&self) -> Driver {
        match self.pool {
            DbPool::Postgres(_) => Driver::Postgres,
            DbPool::MySql(_) => Driver::MySql,
        }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Acquires one connection and pings the server.
    async fn ping(&self) -> DbResult<()> {
        let result = match &self.pool {
            DbPool::Postgres(pool) => match pool.acquire().await {
                Ok(mut conn) => conn.ping().await,
                Err(e) => Err(e),
            },
            DbPool::MySql(pool) => match pool.acquire().await {
                Ok(mut conn) => conn.ping().await,
                Err(e) => Err(e),
            },
        };

        result.map_err(|e| DbError::ConnectionFailed(format!("ping failed: {e}")))
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        match &self.pool {
            DbPool::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            DbPool::MySql(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        }
    }

    /// Closes the connection pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        match &self.pool {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::MySql(pool) => pool.close().await,
        }
    }

    // =========================================================================
    // Repository Factory
    // =========================================================================

    /// Returns the product storage for `driver`.
    ///
    /// ## Returns
    /// * `Err(DbError::DriverNotImplemented)` - this handle is not connected
    ///   to `driver`
    pub fn product_storage(&self, driver: Driver) -> DbResult<Box<dyn ProductStorage>> {
        match (driver, &self.pool) {
            (Driver::Postgres, DbPool::Postgres(pool)) => {
                Ok(Box::new(PgProductRepository::new(pool.clone())))
            }
            (Driver::MySql, DbPool::MySql(pool)) => {
                Ok(Box::new(MySqlProductRepository::new(pool.clone())))
            }
            _ => Err(self.not_implemented(driver)),
        }
    }

    /// Returns the invoice header storage for `driver`, as a schema
    /// migration handle.
    pub fn invoice_header_storage(&self, driver: Driver) -> DbResult<Box<dyn Migrate>> {
        match (driver, &self.pool) {
            (Driver::Postgres, DbPool::Postgres(pool)) => {
                Ok(Box::new(PgInvoiceHeaderRepository::new(pool.clone())))
            }
            (Driver::MySql, DbPool::MySql(pool)) => {
                Ok(Box::new(MySqlInvoiceHeaderRepository::new(pool.clone())))
            }
            _ => Err(self.not_implemented(driver)),
        }
    }

    /// Returns the invoice item storage for `driver`, as a schema
    /// migration handle.
    pub fn invoice_item_storage(&self, driver: Driver) -> DbResult<Box<dyn Migrate>> {
        match (driver, &self.pool) {
            (Driver::Postgres, DbPool::Postgres(pool)) => {
                Ok(Box::new(PgInvoiceItemRepository::new(pool.clone())))
            }
            (Driver::MySql, DbPool::MySql(pool)) => {
                Ok(Box::new(MySqlInvoiceItemRepository::new(pool.clone())))
            }
            _ => Err(self.not_implemented(driver)),
        }
    }

    /// Returns the transactional invoice storage for `driver`.
    pub fn invoice_storage(&self, driver: Driver) -> DbResult<Box<dyn InvoiceStorage>> {
        match (driver, &self.pool) {
            (Driver::Postgres, DbPool::Postgres(pool)) => Ok(Box::new(self.bounded(
                InvoiceRepository::new(
                    pool.clone(),
                    PgInvoiceHeaderRepository::new(pool.clone()),
                    PgInvoiceItemRepository::new(pool.clone()),
                ),
            ))),
            (Driver::MySql, DbPool::MySql(pool)) => Ok(Box::new(self.bounded(
                InvoiceRepository::new(
                    pool.clone(),
                    MySqlInvoiceHeaderRepository::new(pool.clone()),
                    MySqlInvoiceItemRepository::new(pool.clone()),
                ),
            ))),
            _ => Err(self.not_implemented(driver)),
        }
    }

    /// Creates all tables in foreign-key order: products, invoice headers,
    /// invoice items.
    pub async fn migrate_all(&self) -> DbResult<()> {
        let driver = self.driver();
        info!(driver = %driver, "Running schema migrations");

        self.product_storage(driver)?.migrate().await?;
        self.invoice_header_storage(driver)?.migrate().await?;
        self.invoice_item_storage(driver)?.migrate().await?;

        info!("Migrations complete");
        Ok(())
    }

    fn bounded<H, I>(&self, repo: InvoiceRepository<H, I>) -> InvoiceRepository<H, I>
    where
        H: InvoiceHeaderStorage,
        I: InvoiceItemStorage<Db = H::Db>,
    {
        match self.transaction_timeout {
            Some(timeout) => repo.with_timeout(timeout),
            None => repo,
        }
    }

    fn not_implemented(&self, driver: Driver) -> DbError {
        DbError::DriverNotImplemented(format!("{driver} (connected to {})", self.driver()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy(driver: Driver) -> Database {
        let config = DbConfig::new(driver, "127.0.0.1", 1, "u", "p", "d")
            .acquire_timeout(Duration::from_millis(500));
        Database::connect_lazy(&config)
    }

    #[tokio::test]
    async fn test_factory_matches_driver() {
        let pg = lazy(Driver::Postgres);
        assert_eq!(pg.driver(), Driver::Postgres);
        assert!(pg.product_storage(Driver::Postgres).is_ok());
        assert!(pg.invoice_storage(Driver::Postgres).is_ok());

        let my = lazy(Driver::MySql);
        assert_eq!(my.driver(), Driver::MySql);
        assert!(my.product_storage(Driver::MySql).is_ok());
        assert!(my.invoice_storage(Driver::MySql).is_ok());
    }

    #[tokio::test]
    async fn test_factory_rejects_other_driver() {
        let pg = lazy(Driver::Postgres);

        let err = pg.product_storage(Driver::MySql).err().unwrap();
        assert!(matches!(err, DbError::DriverNotImplemented(_)));
        assert!(err.to_string().starts_with("driver not implemented: MYSQL"));

        assert!(pg.invoice_storage(Driver::MySql).is_err());
        assert!(pg.invoice_header_storage(Driver::MySql).is_err());
        assert!(pg.invoice_item_storage(Driver::MySql).is_err());
    }

    #[tokio::test]
    async fn test_factory_from_unknown_name() {
        let pg = lazy(Driver::Postgres);

        let result = "ORACLE"
            .parse::<Driver>()
            .map_err(DbError::from)
            .and_then(|driver| pg.product_storage(driver));

        assert!(matches!(result, Err(DbError::DriverNotImplemented(name)) if name == "ORACLE"));
    }

    #[tokio::test]
    async fn test_migration_handles_name_their_tables() {
        let my = lazy(Driver::MySql);

        assert_eq!(my.product_storage(Driver::MySql).unwrap().table(), "products");
        assert_eq!(
            my.invoice_header_storage(Driver::MySql).unwrap().table(),
            "invoice_headers"
        );
        assert_eq!(
            my.invoice_item_storage(Driver::MySql).unwrap().table(),
            "invoice_items"
        );
    }

    #[tokio::test]
    async fn test_connect_unreachable_server_fails() {
        let config = DbConfig::new(Driver::Postgres, "127.0.0.1", 1, "u", "p", "d")
            .acquire_timeout(Duration::from_secs(2));

        let err = Database::connect(&config).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_wrapped_pools_report_their_driver() {
        let config = DbConfig::new(Driver::Postgres, "127.0.0.1", 1, "u", "p", "d");
        let pg = Database::from_pg_pool(PgPoolOptions::new().connect_lazy_with(config.pg_options()));
        assert_eq!(pg.driver(), Driver::Postgres);
        assert!(matches!(pg.pool(), DbPool::Postgres(_)));
        assert!(pg.product_storage(Driver::Postgres).is_ok());

        let config = DbConfig::new(Driver::MySql, "127.0.0.1", 1, "u", "p", "d");
        let my = Database::from_mysql_pool(
            MySqlPoolOptions::new().connect_lazy_with(config.mysql_options()),
        );
        assert_eq!(my.driver(), Driver::MySql);
        assert!(matches!(my.pool(), DbPool::MySql(_)));
        assert!(my.invoice_storage(Driver::MySql).is_ok());
        assert!(my.invoice_storage(Driver::Postgres).is_err());
    }

    #[tokio::test]
    async fn test_health_check_false_when_unreachable() {
        let db = lazy(Driver::MySql);
        assert!(!db.health_check().await);
    }
}
