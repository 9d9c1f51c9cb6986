//! # Named Queries
//!
//! All SQL text, one table per dialect.
//!
//! ## Dialect Differences
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PostgreSQL              MySQL                       │
//! │  ────────────────   ──────────────────────  ──────────────────────────  │
//! │  placeholders       $1, $2, ...             ?, ?, ...                   │
//! │  generated id       BIGSERIAL + RETURNING   AUTO_INCREMENT +            │
//! │                                             LAST_INSERT_ID()            │
//! │  timestamps         TIMESTAMPTZ             TIMESTAMP                   │
//! │  created_at on      returned by INSERT      not returned                │
//! │  header / item                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Foreign keys on `invoice_items` are `ON UPDATE RESTRICT ON DELETE
//! RESTRICT` in both dialects.

/// Column list shared by every product select.
macro_rules! select_products {
    () => {
        "SELECT id, name, observation, price, created_at, updated_at FROM products"
    };
}

/// SQL statements for one dialect.
#[derive(Debug)]
pub struct Queries {
    pub migrate_product: &'static str,
    pub create_product: &'static str,
    pub get_all_products: &'static str,
    pub get_product_by_id: &'static str,
    pub update_product: &'static str,
    pub delete_product: &'static str,

    pub migrate_invoice_header: &'static str,
    pub create_invoice_header: &'static str,

    pub migrate_invoice_item: &'static str,
    pub create_invoice_item: &'static str,
}

// =============================================================================
// PostgreSQL
// =============================================================================

pub const POSTGRES: Queries = Queries {
    migrate_product: r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL NOT NULL,
            name VARCHAR(25) NOT NULL,
            observation VARCHAR(100),
            price BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ,
            CONSTRAINT products_id_pk PRIMARY KEY (id)
        )
    "#,
    create_product: r#"
        INSERT INTO products (name, observation, price, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    "#,
    get_all_products: select_products!(),
    get_product_by_id: concat!(select_products!(), " WHERE id = $1"),
    update_product: r#"
        UPDATE products
        SET name = $1, observation = $2, price = $3, updated_at = $4
        WHERE id = $5
    "#,
    delete_product: "DELETE FROM products WHERE id = $1",

    migrate_invoice_header: r#"
        CREATE TABLE IF NOT EXISTS invoice_headers (
            id BIGSERIAL NOT NULL,
            client VARCHAR(25) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ,
            CONSTRAINT invoice_headers_id_pk PRIMARY KEY (id)
        )
    "#,
    create_invoice_header: r#"
        INSERT INTO invoice_headers (client)
        VALUES ($1)
        RETURNING id, created_at
    "#,

    migrate_invoice_item: r#"
        CREATE TABLE IF NOT EXISTS invoice_items (
            id BIGSERIAL NOT NULL,
            invoice_header_id BIGINT NOT NULL,
            product_id BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ,
            CONSTRAINT invoice_items_id_pk PRIMARY KEY (id),
            CONSTRAINT invoice_items_invoice_header_id_fk FOREIGN KEY (invoice_header_id)
                REFERENCES invoice_headers (id) ON UPDATE RESTRICT ON DELETE RESTRICT,
            CONSTRAINT invoice_items_product_id_fk FOREIGN KEY (product_id)
                REFERENCES products (id) ON UPDATE RESTRICT ON DELETE RESTRICT
        )
    "#,
    create_invoice_item: r#"
        INSERT INTO invoice_items (invoice_header_id, product_id)
        VALUES ($1, $2)
        RETURNING id, created_at
    "#,
};

// =============================================================================
// MySQL
// =============================================================================

pub const MYSQL: Queries = Queries {
    migrate_product: r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGINT AUTO_INCREMENT NOT NULL PRIMARY KEY,
            name VARCHAR(25) NOT NULL,
            observation VARCHAR(100),
            price BIGINT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NULL DEFAULT NULL
        )
    "#,
    create_product: r#"
        INSERT INTO products (name, observation, price, created_at)
        VALUES (?, ?, ?, ?)
    "#,
    get_all_products: select_products!(),
    get_product_by_id: concat!(select_products!(), " WHERE id = ?"),
    update_product: r#"
        UPDATE products
        SET name = ?, observation = ?, price = ?, updated_at = ?
        WHERE id = ?
    "#,
    delete_product: "DELETE FROM products WHERE id = ?",

    migrate_invoice_header: r#"
        CREATE TABLE IF NOT EXISTS invoice_headers (
            id BIGINT AUTO_INCREMENT NOT NULL PRIMARY KEY,
            client VARCHAR(25) NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NULL DEFAULT NULL
        )
    "#,
    create_invoice_header: "INSERT INTO invoice_headers (client) VALUES (?)",

    migrate_invoice_item: r#"
        CREATE TABLE IF NOT EXISTS invoice_items (
            id BIGINT AUTO_INCREMENT NOT NULL PRIMARY KEY,
            invoice_header_id BIGINT NOT NULL,
            product_id BIGINT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NULL DEFAULT NULL,
            CONSTRAINT invoice_items_invoice_header_id_fk FOREIGN KEY (invoice_header_id)
                REFERENCES invoice_headers (id) ON UPDATE RESTRICT ON DELETE RESTRICT,
            CONSTRAINT invoice_items_product_id_fk FOREIGN KEY (product_id)
                REFERENCES products (id) ON UPDATE RESTRICT ON DELETE RESTRICT
        )
    "#,
    create_invoice_item: "INSERT INTO invoice_items (invoice_header_id, product_id) VALUES (?, ?)",
};
