//! Persistence for the catalog and the order ledger.
//!
//! # Schema: `roomservice`
//!
//! ## Tables
//!
//! - `restaurant` - The single tenant a deployment serves
//! - `category` - Menu groupings
//! - `menu_item` - Sellable items, price and stock
//! - `room_order` - Guest orders
//! - `order_item` - Immutable order lines with the captured unit price
//!
//! Two backends implement [`CatalogStore`] and [`OrderLedger`]:
//! [`PgStore`] (sqlx over `PostgreSQL`) and [`MemoryStore`] (process-local,
//! used for demos and tests).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p roomservice-cli -- migrate
//! ```

mod catalog;
mod memory;
mod orders;
pub mod seed;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use roomservice_core::{
    Category, MenuEntry, MenuItem, MenuItemId, NewMenuItem, NewOrder, Order, OrderId,
    OrderStatus, Restaurant, RestaurantId, StockChange,
};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or a conditional update that did not match.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Menu and stock storage.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The restaurant this deployment serves, if one has been seeded.
    async fn first_restaurant(&self) -> Result<Option<Restaurant>, RepositoryError>;

    async fn create_restaurant(&self, name: &str) -> Result<Restaurant, RepositoryError>;

    async fn create_category(
        &self,
        restaurant_id: RestaurantId,
        name_en: &str,
        name_km: &str,
    ) -> Result<Category, RepositoryError>;

    async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError>;

    /// Every menu item with its category name.
    async fn list_menu(&self) -> Result<Vec<MenuEntry>, RepositoryError>;

    async fn get_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError>;

    /// Switch an item on or off and optionally change its stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    async fn set_availability(
        &self,
        id: MenuItemId,
        available: bool,
        stock: StockChange,
    ) -> Result<MenuEntry, RepositoryError>;

    /// Change an item's catalog price. Existing order lines keep their captured price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    async fn set_price(&self, id: MenuItemId, price: Decimal)
    -> Result<MenuEntry, RepositoryError>;
}

/// The persisted record of orders.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Write an order and all of its lines as one unit.
    ///
    /// Readers never observe the order without its lines.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders, newest first, with menu items joined onto the lines.
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Set the status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError>;

    /// Set the folio-posted flag on a delivered order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist and
    /// `RepositoryError::Conflict` if it is not `DELIVERED`.
    async fn set_folio_posted(&self, id: OrderId, posted: bool)
    -> Result<Order, RepositoryError>;

    /// Set the status and the folio flag in one write, gated on the stored
    /// status being `DELIVERED`. Nothing changes when the gate fails.
    ///
    /// # Errors
    ///
    /// Same as [`OrderLedger::set_folio_posted`].
    async fn update_status_and_folio(
        &self,
        id: OrderId,
        status: OrderStatus,
        posted: bool,
    ) -> Result<Order, RepositoryError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` implementation of both stores.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map foreign-key violations to `Conflict`, everything else to `Database`.
fn map_constraint(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_foreign_key_violation() || db_err.is_check_violation())
    {
        return RepositoryError::Conflict(format!("{what}: {db_err}"));
    }
    RepositoryError::Database(e)
}
