//! # Connection Manager
//!
//! One-time initialization of the shared [`Database`] handle.
//!
//! ## Do-Once Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caller A ──┐                                                          │
//! │  caller B ──┼──► ConnectionManager::connect ──► OnceCell<Database>     │
//! │  caller C ──┘            │                          │                   │
//! │                          │  first caller runs       │  everyone gets    │
//! │                          │  open + ping             │  the same handle  │
//! │                          ▼                          ▼                   │
//! │                     Database::connect          &Database               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate is keyed on nothing but itself: once a handle exists, later
//! calls return it even when they ask for another driver. A failed
//! initialization leaves the gate empty so a later call can try again.
//!
//! The manager is an ordinary value. Construct it once at startup and
//! pass it (or the `&Database` it hands out) to whoever needs storage.

use std::future::Future;

use tokio::sync::OnceCell;
use tracing::warn;

use crate::config::DbConfig;
use crate::error::DbResult;
use crate::pool::Database;

/// Holds the process-wide database handle once it has been established.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    cell: OnceCell<Database>,
}

impl ConnectionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        ConnectionManager {
            cell: OnceCell::new(),
        }
    }

    /// Connects with `config` unless a handle already exists.
    ///
    /// Concurrent callers wait for the first one; the connect-and-ping
    /// sequence runs at most once per successful initialization.
    pub async fn connect(&self, config: &DbConfig) -> DbResult<&Database> {
        let db = self.connect_with(|| Database::connect(config)).await?;

        if db.driver() != config.driver {
            warn!(
                requested = %config.driver,
                active = %db.driver(),
                "Connection already established; ignoring requested driver"
            );
        }

        Ok(db)
    }

    /// Runs `init` unless a handle already exists.
    pub async fn connect_with<F, Fut>(&self, init: F) -> DbResult<&Database>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DbResult<Database>>,
    {
        self.cell.get_or_try_init(init).await
    }

    /// The shared handle, or `None` before a successful connect.
    pub fn pool(&self) -> Option<&Database> {
        self.cell.get()
    }

    /// Returns `true` once a handle has been established.
    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use billing_core::Driver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn lazy(driver: Driver) -> Database {
        let config = DbConfig::new(driver, "127.0.0.1", 1, "u", "p", "d")
            .acquire_timeout(Duration::from_millis(200));
        Database::connect_lazy(&config)
    }

    #[tokio::test]
    async fn test_pool_is_none_before_connect() {
        let manager = ConnectionManager::new();

        assert!(manager.pool().is_none());
        assert!(!manager.is_connected());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_connect_runs_once() {
        let manager = Arc::new(ConnectionManager::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let manager = Arc::clone(&manager);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                let db = manager
                    .connect_with(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Widen the window for racing callers
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(lazy(Driver::Postgres))
                    })
                    .await?;
                Ok::<Driver, DbError>(db.driver())
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), Driver::Postgres);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_second_driver_reuses_first_connection() {
        let manager = ConnectionManager::new();

        manager
            .connect_with(|| async { Ok(lazy(Driver::MySql)) })
            .await
            .unwrap();
        let db = manager
            .connect_with(|| async { Ok(lazy(Driver::Postgres)) })
            .await
            .unwrap();

        assert_eq!(db.driver(), Driver::MySql);
        assert_eq!(manager.pool().map(Database::driver), Some(Driver::MySql));
    }

    #[tokio::test]
    async fn test_failed_init_can_be_retried() {
        let manager = ConnectionManager::new();

        let err = manager
            .connect_with(|| async { Err(DbError::ConnectionFailed("refused".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(manager.pool().is_none());

        manager
            .connect_with(|| async { Ok(lazy(Driver::Postgres)) })
            .await
            .unwrap();
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_connect_unreachable_leaves_manager_empty() {
        let manager = ConnectionManager::new();
        let config = DbConfig::new(Driver::MySql, "127.0.0.1", 1, "u", "p", "d")
            .acquire_timeout(Duration::from_secs(2));

        assert!(manager.connect(&config).await.is_err());
        assert!(manager.pool().is_none());
    }
}
