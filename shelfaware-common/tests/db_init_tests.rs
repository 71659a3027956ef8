//! Tests for inventory store creation and schema idempotence

use shelfaware_common::db::init::{init_database, init_in_memory};
use tempfile::TempDir;

const TABLES: [&str; 7] = [
    "users",
    "lists",
    "categories",
    "food_items",
    "list_items",
    "actions",
    "product_cache",
];

async fn table_exists(pool: &sqlx::SqlitePool, name: &str) -> bool {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();
    count == 1
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("food_inventory.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");

    let pool = pool.unwrap();
    for table in TABLES {
        assert!(table_exists(&pool, table).await, "missing table {}", table);
    }
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("food_inventory.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO categories (guid, name) VALUES ('c1', 'Dairy')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let reopened = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&reopened)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_in_memory_stores_are_isolated() {
    let first = init_in_memory().await.unwrap();
    let second = init_in_memory().await.unwrap();

    sqlx::query("INSERT INTO categories (guid, name) VALUES ('c1', 'Produce')")
        .execute(&first)
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_usernames_and_category_names_are_unique() {
    let pool = init_in_memory().await.unwrap();

    sqlx::query("INSERT INTO users (guid, username, created_at) VALUES ('u1', 'alice', '2024-01-01T00:00:00Z')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate_user = sqlx::query(
        "INSERT INTO users (guid, username, created_at) VALUES ('u2', 'alice', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(duplicate_user.is_err());

    sqlx::query("INSERT INTO categories (guid, name) VALUES ('c1', 'Meat')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate_category = sqlx::query("INSERT INTO categories (guid, name) VALUES ('c2', 'Meat')")
        .execute(&pool)
        .await;
    assert!(duplicate_category.is_err());
}

#[tokio::test]
async fn test_negative_quantity_rejected_by_schema() {
    let pool = init_in_memory().await.unwrap();

    sqlx::query("INSERT INTO users (guid, username, created_at) VALUES ('u1', 'bob', '2024-01-01T00:00:00Z')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO lists (guid, name, user_id, created_at) VALUES ('l1', 'Pantry', 'u1', '2024-01-01T00:00:00Z')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO categories (guid, name) VALUES ('c1', 'Dairy')")
        .execute(&pool)
        .await
        .unwrap();

    let result = sqlx::query(
        r#"
        INSERT INTO list_items (guid, name, quantity, date_added, list_id, category_id)
        VALUES ('i1', 'Milk', -1.0, '2024-01-01T00:00:00Z', 'l1', 'c1')
        "#,
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "CHECK (quantity >= 0) should reject the row");
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let pool = init_in_memory().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO lists (guid, name, user_id, created_at) VALUES ('l1', 'Pantry', 'nobody', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "list without an owner must be rejected");
}

#[tokio::test]
async fn test_schema_creation_is_idempotent() {
    let pool = init_in_memory().await.unwrap();
    shelfaware_common::db::init::create_schema(&pool).await.unwrap();
    shelfaware_common::db::init::create_schema(&pool).await.unwrap();

    for table in TABLES {
        assert!(table_exists(&pool, table).await);
    }
}
