//! Database initialization
//!
//! Creates the inventory store on first run and brings an existing file up to
//! the current schema. Every `create_*` function is idempotent.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (creating if missing) the inventory database file and ensure the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create an isolated in-memory store
///
/// The pool holds exactly one connection that never expires; every new
/// SQLite in-memory connection would otherwise be a separate empty database.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all inventory tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_lists_table(pool).await?;
    create_categories_table(pool).await?;
    create_food_items_table(pool).await?;
    create_list_items_table(pool).await?;
    create_actions_table(pool).await?;
    create_product_cache_table(pool).await?;

    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the lists table
///
/// List names are not unique per owner.
pub async fn create_lists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lists (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(guid),
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lists_user_name ON lists(user_id, name)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the food_items catalog table
///
/// Catalog entries are independent of any list.
pub async fn create_food_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS food_items (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            barcode TEXT,
            image BLOB,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_food_items_name ON food_items(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_food_items_barcode ON food_items(barcode)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the list_items table
///
/// Removal is a soft delete: `date_removed` is set, the row is kept.
pub async fn create_list_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS list_items (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 1.0,
            date_added TIMESTAMP NOT NULL,
            date_removed TIMESTAMP,
            list_id TEXT NOT NULL REFERENCES lists(guid),
            category_id TEXT NOT NULL REFERENCES categories(guid),
            food_id TEXT REFERENCES food_items(guid),
            CHECK (quantity >= 0.0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_list_items_list_name ON list_items(list_id, name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_list_items_name ON list_items(name)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_actions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS actions (
            guid TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            quantity REAL NOT NULL DEFAULT 1.0,
            date TIMESTAMP NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(guid),
            list_item_id TEXT REFERENCES list_items(guid),
            CHECK (quantity >= 0.0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_actions_user ON actions(user_id, date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the product lookup response cache
pub async fn create_product_cache_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS product_cache (
            barcode TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            cached_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
