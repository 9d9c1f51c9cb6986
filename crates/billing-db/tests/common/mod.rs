//! Scenarios shared by the live PostgreSQL and MySQL suites.
//!
//! Each suite only runs when its gate variable is `1`, and reads the
//! connection parameters the same way the demo binary does.

#![allow(dead_code)]

use billing_core::{Driver, Invoice, Product};
use billing_db::{Database, DbConfig, DbError, InvoiceService, ProductService};
use tokio::sync::{Mutex, MutexGuard};

/// Scenarios compare whole-table snapshots, so they run one at a time.
/// This also keeps concurrent CREATE TABLE IF NOT EXISTS off PostgreSQL's
/// catalog.
static SERIAL: Mutex<()> = Mutex::const_new(());

/// Connects and migrates when `gate` is set to `1`, otherwise `None`.
///
/// The returned guard keeps other scenarios out until it is dropped.
pub async fn connect(
    driver: Driver,
    gate: &str,
) -> Option<(Database, MutexGuard<'static, ()>)> {
    if std::env::var(gate).as_deref() != Ok("1") {
        eprintln!("skipping: set {gate}=1 to run against a live {driver} server");
        return None;
    }

    let config = DbConfig::from_env(driver).unwrap().max_connections(4);
    let guard = SERIAL.lock().await;
    let db = Database::connect(&config).await.unwrap();
    db.migrate_all().await.unwrap();

    // Tables already exist now; a second run must be a no-op
    db.migrate_all().await.unwrap();
    Some((db, guard))
}

fn products(db: &Database) -> ProductService {
    ProductService::new(db.product_storage(db.driver()).unwrap())
}

fn invoices(db: &Database) -> InvoiceService {
    InvoiceService::new(db.invoice_storage(db.driver()).unwrap())
}

pub async fn product_lifecycle(db: &Database) {
    let service = products(db);

    let mut product = Product::new("Notebook", "A5, dotted", 1250);
    service.create(&mut product).await.unwrap();
    assert!(product.id > 0);

    let loaded = service.get_by_id(product.id).await.unwrap();
    assert_eq!(loaded.id, product.id);
    assert_eq!(loaded.name, "Notebook");
    assert_eq!(loaded.observations, "A5, dotted");
    assert_eq!(loaded.price, 1250);
    assert!(loaded.updated_at.is_none());

    let mut changed = loaded.clone();
    changed.name = "Notebook XL".to_string();
    changed.observations = String::new();
    changed.price = 1500;
    changed.updated_at = Some(chrono::Utc::now());
    service.update(&changed).await.unwrap();

    let reloaded = service.get_by_id(product.id).await.unwrap();
    assert_eq!(reloaded.name, "Notebook XL");
    assert_eq!(reloaded.observations, "");
    assert_eq!(reloaded.price, 1500);
    assert!(reloaded.updated_at.is_some());

    service.delete(product.id).await.unwrap();
    assert!(service.get_by_id(product.id).await.unwrap_err().is_not_found());
}

pub async fn empty_observation_round_trips(db: &Database) {
    let service = products(db);

    let mut product = Product::new("Stapler", "", 899);
    service.create(&mut product).await.unwrap();

    let loaded = service.get_by_id(product.id).await.unwrap();
    assert_eq!(loaded.observations, "");
    assert_eq!(loaded.name, product.name);
    assert_eq!(loaded.price, product.price);

    service.delete(product.id).await.unwrap();
}

pub async fn missing_rows_are_not_found(db: &Database) {
    let service = products(db);
    let missing = i64::MAX - 7;

    let mut keep = Product::new("Keep", "untouched", 10);
    service.create(&mut keep).await.unwrap();
    let before = snapshot(&service).await;

    assert!(service.get_by_id(missing).await.unwrap_err().is_not_found());
    assert!(service.delete(missing).await.unwrap_err().is_not_found());

    let mut ghost = Product::new("Ghost", "", 1);
    ghost.id = missing;
    assert!(service.update(&ghost).await.unwrap_err().is_not_found());

    assert_eq!(snapshot(&service).await, before);

    service.delete(keep.id).await.unwrap();
}

/// All products sorted by id, since scan order is unspecified.
async fn snapshot(service: &ProductService) -> Vec<Product> {
    let mut all = service.get_all().await.unwrap();
    all.sort_by_key(|p| p.id);
    all
}

pub async fn get_all_includes_created(db: &Database) {
    let service = products(db);
    let before = service.get_all().await.unwrap().len();

    let mut ids = Vec::new();
    for (name, price) in [("Pen", 150), ("Pencil", 90), ("Eraser", 60)] {
        let mut product = Product::new(name, "", price);
        service.create(&mut product).await.unwrap();
        ids.push(product.id);
    }

    let all = service.get_all().await.unwrap();
    assert!(all.len() >= before + 3);
    for id in &ids {
        let found = all.iter().find(|p| p.id == *id).unwrap();
        assert_eq!(found.observations, "");
    }

    for id in ids {
        service.delete(id).await.unwrap();
    }
}

pub async fn invoice_with_two_items(db: &Database) {
    let service = products(db);

    let mut coffee = Product::new("Coffee", "", 350);
    let mut tea = Product::new("Tea", "green", 250);
    service.create(&mut coffee).await.unwrap();
    service.create(&mut tea).await.unwrap();

    let mut invoice = Invoice::new("Acme").with_item(coffee.id).with_item(tea.id);
    invoices(db).create(&mut invoice).await.unwrap();

    assert!(invoice.header.id > 0);
    assert_eq!(invoice.items.len(), 2);
    assert!(invoice.items.iter().all(|i| i.id > 0));
    assert!(invoice
        .items
        .iter()
        .all(|i| i.invoice_header_id == invoice.header.id));
    assert_eq!(invoice.items[0].product_id, coffee.id);
    assert_eq!(invoice.items[1].product_id, tea.id);

    // Items now reference both products
    let err = service.delete(coffee.id).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
}

pub async fn invoice_with_unknown_product_rolls_back(db: &Database) {
    let service = products(db);

    let mut coffee = Product::new("Coffee", "", 350);
    service.create(&mut coffee).await.unwrap();

    let client = format!("Rollback {}", coffee.id);
    let mut invoice = Invoice::new(client.as_str())
        .with_item(coffee.id)
        .with_item(i64::MAX - 11);
    let err = invoices(db).create(&mut invoice).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

    let headers: i64 = match db.pool() {
        billing_db::DbPool::Postgres(pool) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM invoice_headers WHERE client = $1")
                .bind(&client)
                .fetch_one(pool)
                .await
                .unwrap()
        }
        billing_db::DbPool::MySql(pool) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM invoice_headers WHERE client = ?")
                .bind(&client)
                .fetch_one(pool)
                .await
                .unwrap()
        }
    };
    assert_eq!(headers, 0);

    // Nothing references the product, so it can go
    service.delete(coffee.id).await.unwrap();
}
