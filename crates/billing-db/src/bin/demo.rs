//! # Billing Demo
//!
//! Connects to the configured database, creates the tables and prints all
//! products as JSON.
//!
//! ## Usage
//! ```bash
//! # MySQL (default), parameters from .env
//! cargo run -p billing-db --bin demo
//!
//! # PostgreSQL, inserting sample products and one invoice first
//! cargo run -p billing-db --bin demo -- --driver postgres --seed
//! ```
//!
//! The driver can also be chosen with `BILLING_DRIVER`. Log verbosity
//! follows `RUST_LOG` (default `info`).

use std::env;
use std::process;

use billing_core::{Driver, Invoice, Product};
use billing_db::{ConnectionManager, Database, DbConfig, InvoiceService, ProductService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Sample products inserted by `--seed`: (name, observations, price).
const SAMPLE_PRODUCTS: &[(&str, &str, i64)] = &[
    ("Espresso beans 1kg", "single origin", 2450),
    ("Paper filters", "", 399),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let default_driver = env::var("BILLING_DRIVER").unwrap_or_else(|_| "MYSQL".to_string());

    let (driver_name, seed) = match parse_args(&args, default_driver) {
        Ok(Command::Run { driver_name, seed }) => (driver_name, seed),
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Err(e) => {
            error!(error = %e, "Invalid arguments");
            print_usage();
            process::exit(2);
        }
    };

    let driver: Driver = match driver_name.parse() {
        Ok(driver) => driver,
        Err(e) => {
            error!(error = %e, "Unsupported driver");
            process::exit(2);
        }
    };

    let config = match DbConfig::from_env(driver) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Error loading connection parameters");
            process::exit(1);
        }
    };

    // A connection failure is fatal: no retry.
    let manager = ConnectionManager::new();
    let db = match manager.connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Can't connect to database");
            process::exit(1);
        }
    };

    if let Err(e) = run(db, driver, seed).await {
        error!(error = %e, "Demo failed");
        process::exit(1);
    }

    db.close().await;
}

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run { driver_name: String, seed: bool },
    Help,
}

/// Parses the arguments after the program name. `default_driver` applies
/// when `--driver` is absent.
fn parse_args(args: &[String], default_driver: String) -> Result<Command, String> {
    let mut driver_name = default_driver;
    let mut seed = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--driver" => match args.get(i + 1) {
                Some(name) => {
                    driver_name = name.clone();
                    i += 1;
                }
                None => return Err(format!("{} requires a value", args[i])),
            },
            "-s" | "--seed" => seed = true,
            "-h" | "--help" => return Ok(Command::Help),
            _ => {}
        }
        i += 1;
    }

    Ok(Command::Run { driver_name, seed })
}

fn print_usage() {
    println!("Usage: demo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --driver <NAME>  MYSQL or POSTGRES (default: MYSQL)");
    println!("  -s, --seed           Insert sample products and an invoice");
    println!("  -h, --help           Show this help message");
}

async fn run(db: &Database, driver: Driver, seed: bool) -> Result<(), Box<dyn std::error::Error>> {
    db.migrate_all().await?;

    let products = ProductService::new(db.product_storage(driver)?);

    if seed {
        let mut invoice = Invoice::new("Acme");

        for (name, observations, price) in SAMPLE_PRODUCTS {
            let mut product = Product::new(*name, *observations, *price);
            products.create(&mut product).await?;
            invoice.add_item(product.id);
        }

        let invoices = InvoiceService::new(db.invoice_storage(driver)?);
        invoices.create(&mut invoice).await?;

        info!(
            header_id = invoice.header.id,
            items = invoice.items.len(),
            "Sample invoice created"
        );
    }

    let all = products.get_all().await?;
    info!(count = all.len(), "Products loaded");
    println!("{}", serde_json::to_string_pretty(&all)?);

    Ok(())
}
