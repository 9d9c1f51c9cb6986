//! Live PostgreSQL suite. Runs only with `BILLING_TEST_POSTGRES=1` and the
//! `POSTGRES_*_DB` variables set (or present in `.env`).

mod common;

use billing_core::Driver;

const GATE: &str = "BILLING_TEST_POSTGRES";

#[tokio::test]
async fn test_product_lifecycle() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::product_lifecycle(&db).await;
}

#[tokio::test]
async fn test_empty_observation_round_trips() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::empty_observation_round_trips(&db).await;
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::missing_rows_are_not_found(&db).await;
}

#[tokio::test]
async fn test_get_all_includes_created() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::get_all_includes_created(&db).await;
}

#[tokio::test]
async fn test_invoice_with_two_items() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::invoice_with_two_items(&db).await;
}

#[tokio::test]
async fn test_invoice_with_unknown_product_rolls_back() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };
    common::invoice_with_unknown_product_rolls_back(&db).await;
}

#[tokio::test]
async fn test_header_returns_created_at() {
    let Some((db, _serial)) = common::connect(Driver::Postgres, GATE).await else {
        return;
    };

    let mut invoice = billing_core::Invoice::new("Timestamped");
    billing_db::InvoiceService::new(db.invoice_storage(Driver::Postgres).unwrap())
        .create(&mut invoice)
        .await
        .unwrap();

    assert!(invoice.header.created_at.is_some());
}
