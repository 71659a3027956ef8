//! Inventory Manager
//!
//! CRUD over users, lists, categories, food items, list items and actions.
//! Every write runs inside one transaction and resolves all referenced rows
//! before mutating anything, so a failed call leaves the store untouched.
//!
//! Item lookups are by name. `update_quantity` and `remove_list_item` match on
//! (list name, item name) and pick the earliest-created entry; the owning user
//! is not consulted, so two users with same-named lists share the match.
//! `add_action` matches on item name alone.
//!
//! Writes through one manager (and its clones) are serialized. A deferred
//! SQLite transaction that reads before writing fails with a stale-snapshot
//! busy error, which the busy timeout never retries, when another connection
//! commits in between. Writers in other processes are not covered.

use shelfaware_common::db::{Action, Category, FoodItem, List, ListItem, User};
use shelfaware_common::{time, uuid_utils, Error, Result};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Action type logged by the scan workflow
pub const ACTION_PURCHASE: &str = "purchase";

/// Catalog entry to create with [`InventoryManager::add_food_item`]
#[derive(Debug, Clone, Default)]
pub struct NewFoodItem {
    pub name: String,
    pub barcode: Option<String>,
    pub image: Option<Vec<u8>>,
    pub description: Option<String>,
}

/// Rows written by [`InventoryManager::add_purchase`]
#[derive(Debug, Clone)]
pub struct PurchaseRecord {
    pub food_item: FoodItem,
    pub list_item: ListItem,
    pub action: Action,
}

/// Inventory operations against an injected store handle
#[derive(Clone)]
pub struct InventoryManager {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl InventoryManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a write transaction; the guard must outlive the commit
    async fn begin_write(&self) -> Result<(MutexGuard<'_, ()>, Transaction<'static, Sqlite>)> {
        let guard = self.write_lock.lock().await;
        let tx = self.pool.begin().await?;
        Ok((guard, tx))
    }

    /// Create a user
    ///
    /// Fails with `AlreadyExists` when the username is taken.
    pub async fn add_user(&self, username: &str) -> Result<User> {
        let user = User {
            guid: uuid_utils::generate(),
            username: username.to_string(),
            created_at: time::now(),
        };

        let (_writer, mut tx) = self.begin_write().await?;
        sqlx::query("INSERT INTO users (guid, username, created_at) VALUES (?, ?, ?)")
            .bind(&user.guid)
            .bind(&user.username)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, || format!("User {} already exists", username)))?;
        tx.commit().await?;

        info!(username = %username, "User added");
        Ok(user)
    }

    /// Create a list owned by `username`
    ///
    /// Duplicate list names for the same user are allowed.
    pub async fn add_list(&self, username: &str, list_name: &str) -> Result<List> {
        let (_writer, mut tx) = self.begin_write().await?;

        let user = find_user(&mut tx, username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;

        let list = List {
            guid: uuid_utils::generate(),
            name: list_name.to_string(),
            user_id: user.guid,
            created_at: time::now(),
        };

        sqlx::query("INSERT INTO lists (guid, name, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&list.guid)
            .bind(&list.name)
            .bind(&list.user_id)
            .bind(list.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(username = %username, list = %list_name, "List added");
        Ok(list)
    }

    /// Create a category unless one with that name already exists
    pub async fn add_category(&self, category_name: &str) -> Result<()> {
        let (_writer, mut tx) = self.begin_write().await?;
        ensure_category(&mut tx, category_name).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Add a catalog entry
    pub async fn add_food_item(&self, food: NewFoodItem) -> Result<FoodItem> {
        let (_writer, mut tx) = self.begin_write().await?;
        let item = insert_food_item(&mut tx, food).await?;
        tx.commit().await?;

        Ok(item)
    }

    /// First catalog entry carrying `barcode`
    pub async fn find_food_item_by_barcode(&self, barcode: &str) -> Result<Option<FoodItem>> {
        let mut conn = self.pool.acquire().await?;
        find_food_by_barcode(&mut conn, barcode).await
    }

    /// Add an entry to one of the user's lists
    ///
    /// The list (by name and owner) and the category must exist. An unknown
    /// `food_name` leaves the entry unlinked.
    pub async fn add_list_item(
        &self,
        username: &str,
        list_name: &str,
        item_name: &str,
        quantity: f64,
        category_name: &str,
        food_name: Option<&str>,
    ) -> Result<ListItem> {
        validate_quantity(quantity)?;

        let (_writer, mut tx) = self.begin_write().await?;

        let list = find_user_list(&mut tx, username, list_name)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("List {} not found for user {}", list_name, username))
            })?;
        let category = find_category(&mut tx, category_name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", category_name)))?;
        let food = match food_name {
            Some(name) => find_food_by_name(&mut tx, name).await?,
            None => None,
        };
        if let (Some(name), None) = (food_name, &food) {
            debug!(food = %name, "Food item not found, list item left unlinked");
        }

        let item = ListItem {
            guid: uuid_utils::generate(),
            name: item_name.to_string(),
            quantity,
            date_added: time::now(),
            date_removed: None,
            list_id: list.guid,
            category_id: category.guid,
            food_id: food.map(|f| f.guid),
        };

        insert_list_item(&mut tx, &item).await?;
        tx.commit().await?;

        info!(
            username = %username,
            list = %list_name,
            item = %item_name,
            quantity,
            category = %category_name,
            "List item added"
        );
        Ok(item)
    }

    /// Record that `quantity` of `food` went into the user's list
    ///
    /// A food item with the same barcode is reused, otherwise `food` is added
    /// to the catalog. The category is created when missing. The new entry is
    /// linked to the food item by guid and gets a purchase action. All rows
    /// are written in one transaction, so nothing is kept when a step fails.
    pub async fn add_purchase(
        &self,
        username: &str,
        list_name: &str,
        food: NewFoodItem,
        category_name: &str,
        quantity: f64,
    ) -> Result<PurchaseRecord> {
        validate_quantity(quantity)?;

        let (_writer, mut tx) = self.begin_write().await?;

        let user = find_user(&mut tx, username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;
        let list = find_user_list(&mut tx, username, list_name)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("List {} not found for user {}", list_name, username))
            })?;

        let existing = match food.barcode.as_deref() {
            Some(barcode) => find_food_by_barcode(&mut tx, barcode).await?,
            None => None,
        };
        let food_item = match existing {
            Some(item) => item,
            None => insert_food_item(&mut tx, food).await?,
        };

        ensure_category(&mut tx, category_name).await?;
        let category = find_category(&mut tx, category_name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", category_name)))?;

        let list_item = ListItem {
            guid: uuid_utils::generate(),
            name: food_item.name.clone(),
            quantity,
            date_added: time::now(),
            date_removed: None,
            list_id: list.guid,
            category_id: category.guid,
            food_id: Some(food_item.guid.clone()),
        };
        insert_list_item(&mut tx, &list_item).await?;

        let action = Action {
            guid: uuid_utils::generate(),
            action_type: ACTION_PURCHASE.to_string(),
            quantity,
            date: time::now(),
            user_id: user.guid,
            list_item_id: Some(list_item.guid.clone()),
        };
        insert_action(&mut tx, &action).await?;

        tx.commit().await?;

        info!(
            username = %username,
            list = %list_name,
            item = %list_item.name,
            barcode = ?food_item.barcode,
            quantity,
            category = %category_name,
            "Purchase recorded"
        );
        Ok(PurchaseRecord { food_item, list_item, action })
    }

    /// Names of the user's lists in creation order; empty for unknown users
    pub async fn get_user_lists(&self, username: &str) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT l.name
            FROM lists l
            JOIN users u ON u.guid = l.user_id
            WHERE u.username = ?
            ORDER BY l.rowid
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Names of every entry in the list, removed entries included
    pub async fn get_list_items(&self, username: &str, list_name: &str) -> Result<Vec<String>> {
        Ok(self
            .get_list_entries(username, list_name)
            .await?
            .into_iter()
            .map(|item| item.name)
            .collect())
    }

    /// Full entries of the list in creation order; empty if unresolved
    pub async fn get_list_entries(&self, username: &str, list_name: &str) -> Result<Vec<ListItem>> {
        let items = sqlx::query_as::<_, ListItem>(
            r#"
            SELECT guid, name, quantity, date_added, date_removed, list_id, category_id, food_id
            FROM list_items
            WHERE list_id = (
                SELECT l.guid
                FROM lists l
                JOIN users u ON u.guid = l.user_id
                WHERE u.username = ? AND l.name = ?
                ORDER BY l.rowid
                LIMIT 1
            )
            ORDER BY rowid
            "#,
        )
        .bind(username)
        .bind(list_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Set the quantity of the matching entry
    ///
    /// Returns `false` without touching the store when nothing matches.
    pub async fn update_quantity(
        &self,
        list_name: &str,
        item_name: &str,
        quantity: f64,
    ) -> Result<bool> {
        validate_quantity(quantity)?;

        let (_writer, mut tx) = self.begin_write().await?;

        // Active entries win over removed ones with the same name
        let guid: Option<String> = sqlx::query_scalar(
            r#"
            SELECT i.guid
            FROM list_items i
            JOIN lists l ON l.guid = i.list_id
            WHERE i.name = ? AND l.name = ?
            ORDER BY (i.date_removed IS NOT NULL), i.rowid
            LIMIT 1
            "#,
        )
        .bind(item_name)
        .bind(list_name)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(guid) = guid else {
            debug!(list = %list_name, item = %item_name, "No list item to update");
            return Ok(false);
        };

        sqlx::query("UPDATE list_items SET quantity = ? WHERE guid = ?")
            .bind(quantity)
            .bind(&guid)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(list = %list_name, item = %item_name, quantity, "Quantity updated");
        Ok(true)
    }

    /// Soft-delete the matching active entry by stamping its removal time
    ///
    /// Returns `false` when no active entry matches.
    pub async fn remove_list_item(&self, list_name: &str, item_name: &str) -> Result<bool> {
        let (_writer, mut tx) = self.begin_write().await?;

        let guid: Option<String> = sqlx::query_scalar(
            r#"
            SELECT i.guid
            FROM list_items i
            JOIN lists l ON l.guid = i.list_id
            WHERE i.name = ? AND l.name = ? AND i.date_removed IS NULL
            ORDER BY i.rowid
            LIMIT 1
            "#,
        )
        .bind(item_name)
        .bind(list_name)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(guid) = guid else {
            debug!(list = %list_name, item = %item_name, "No active list item to remove");
            return Ok(false);
        };

        sqlx::query("UPDATE list_items SET date_removed = ? WHERE guid = ?")
            .bind(time::now())
            .bind(&guid)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(list = %list_name, item = %item_name, "List item removed");
        Ok(true)
    }

    /// Log an action by `username` against the item named `item_name`
    pub async fn add_action(
        &self,
        username: &str,
        item_name: &str,
        action_type: &str,
        quantity: f64,
    ) -> Result<Action> {
        validate_quantity(quantity)?;

        let (_writer, mut tx) = self.begin_write().await?;

        let user = find_user(&mut tx, username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;
        let item_guid: String = sqlx::query_scalar(
            "SELECT guid FROM list_items WHERE name = ? ORDER BY rowid LIMIT 1",
        )
        .bind(item_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("ListItem {} not found", item_name)))?;

        let action = Action {
            guid: uuid_utils::generate(),
            action_type: action_type.to_string(),
            quantity,
            date: time::now(),
            user_id: user.guid,
            list_item_id: Some(item_guid),
        };

        insert_action(&mut tx, &action).await?;
        tx.commit().await?;

        info!(
            username = %username,
            item = %item_name,
            action_type = %action_type,
            quantity,
            "Action logged"
        );
        Ok(action)
    }

    /// Log an action against a specific list entry
    ///
    /// Unlike [`add_action`](Self::add_action) this does not resolve the item
    /// by name, so same-named entries in other lists are never picked.
    pub async fn add_entry_action(
        &self,
        username: &str,
        list_item_guid: &str,
        action_type: &str,
        quantity: f64,
    ) -> Result<Action> {
        validate_quantity(quantity)?;

        let (_writer, mut tx) = self.begin_write().await?;

        let user = find_user(&mut tx, username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM list_items WHERE guid = ?)")
            .bind(list_item_guid)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(Error::NotFound(format!("ListItem {} not found", list_item_guid)));
        }

        let action = Action {
            guid: uuid_utils::generate(),
            action_type: action_type.to_string(),
            quantity,
            date: time::now(),
            user_id: user.guid,
            list_item_id: Some(list_item_guid.to_string()),
        };
        insert_action(&mut tx, &action).await?;
        tx.commit().await?;

        info!(
            username = %username,
            list_item = %list_item_guid,
            action_type = %action_type,
            quantity,
            "Action logged"
        );
        Ok(action)
    }

    /// The user's actions, oldest first; empty for unknown users
    pub async fn get_user_actions(&self, username: &str) -> Result<Vec<Action>> {
        let actions = sqlx::query_as::<_, Action>(
            r#"
            SELECT a.guid, a.action_type, a.quantity, a.date, a.user_id, a.list_item_id
            FROM actions a
            JOIN users u ON u.guid = a.user_id
            WHERE u.username = ?
            ORDER BY a.rowid
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(actions)
    }
}

fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Quantity must be a non-negative number, got {}",
            quantity
        )));
    }
    Ok(())
}

fn unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> Error {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            Error::AlreadyExists(message())
        }
        other => Error::Database(other),
    }
}

async fn insert_food_item(conn: &mut SqliteConnection, food: NewFoodItem) -> Result<FoodItem> {
    let item = FoodItem {
        guid: uuid_utils::generate(),
        name: food.name,
        barcode: food.barcode,
        image: food.image,
        description: food.description,
    };

    sqlx::query(
        "INSERT INTO food_items (guid, name, barcode, image, description) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&item.guid)
    .bind(&item.name)
    .bind(&item.barcode)
    .bind(&item.image)
    .bind(&item.description)
    .execute(&mut *conn)
    .await?;

    info!(name = %item.name, barcode = ?item.barcode, "Food item added");
    Ok(item)
}

/// Insert the category unless the name is taken; true when a row was added
async fn ensure_category(conn: &mut SqliteConnection, name: &str) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO categories (guid, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
    )
    .bind(uuid_utils::generate())
    .bind(name)
    .execute(&mut *conn)
    .await?;

    let added = result.rows_affected() > 0;
    if added {
        info!(category = %name, "Category added");
    } else {
        debug!(category = %name, "Category already exists");
    }
    Ok(added)
}

async fn insert_list_item(conn: &mut SqliteConnection, item: &ListItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO list_items (guid, name, quantity, date_added, date_removed, list_id, category_id, food_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.guid)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(item.date_added)
    .bind(item.date_removed)
    .bind(&item.list_id)
    .bind(&item.category_id)
    .bind(&item.food_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_action(conn: &mut SqliteConnection, action: &Action) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO actions (guid, action_type, quantity, date, user_id, list_item_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&action.guid)
    .bind(&action.action_type)
    .bind(action.quantity)
    .bind(action.date)
    .bind(&action.user_id)
    .bind(&action.list_item_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn find_user(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, username, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

async fn find_user_list(
    conn: &mut SqliteConnection,
    username: &str,
    list_name: &str,
) -> Result<Option<List>> {
    let list = sqlx::query_as::<_, List>(
        r#"
        SELECT l.guid, l.name, l.user_id, l.created_at
        FROM lists l
        JOIN users u ON u.guid = l.user_id
        WHERE u.username = ? AND l.name = ?
        ORDER BY l.rowid
        LIMIT 1
        "#,
    )
    .bind(username)
    .bind(list_name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(list)
}

async fn find_category(conn: &mut SqliteConnection, name: &str) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT guid, name FROM categories WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(category)
}

async fn find_food_by_barcode(
    conn: &mut SqliteConnection,
    barcode: &str,
) -> Result<Option<FoodItem>> {
    let food = sqlx::query_as::<_, FoodItem>(
        r#"
        SELECT guid, name, barcode, image, description
        FROM food_items
        WHERE barcode = ?
        ORDER BY rowid
        LIMIT 1
        "#,
    )
    .bind(barcode)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(food)
}

async fn find_food_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<FoodItem>> {
    let food = sqlx::query_as::<_, FoodItem>(
        r#"
        SELECT guid, name, barcode, image, description
        FROM food_items
        WHERE name = ?
        ORDER BY rowid
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(food)
}
