//! `PostgreSQL` catalog queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use roomservice_core::{
    Category, CategoryId, MenuEntry, MenuItem, MenuItemId, NewMenuItem, Restaurant, RestaurantId,
    StockChange,
};

use super::{CatalogStore, PgStore, RepositoryError, map_constraint};

const MENU_ITEM_COLUMNS: &str = "m.id, m.restaurant_id, m.category_id, m.name_en, m.name_km, \
     m.price, m.image_url, m.available, m.stock_count, m.created_at, m.updated_at";

#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: RestaurantId,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    restaurant_id: RestaurantId,
    name_en: String,
    name_km: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            name_en: row.name_en,
            name_km: row.name_km,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MenuItemRow {
    id: MenuItemId,
    restaurant_id: RestaurantId,
    category_id: CategoryId,
    name_en: String,
    name_km: String,
    price: Decimal,
    image_url: Option<String>,
    available: bool,
    stock_count: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            category_id: row.category_id,
            name_en: row.name_en,
            name_km: row.name_km,
            price: row.price,
            image_url: row.image_url,
            available: row.available,
            stock_count: row.stock_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuEntryRow {
    #[sqlx(flatten)]
    item: MenuItemRow,
    category: String,
}

impl From<MenuEntryRow> for MenuEntry {
    fn from(row: MenuEntryRow) -> Self {
        Self {
            item: row.item.into(),
            category: row.category,
        }
    }
}

impl PgStore {
    async fn fetch_menu_entry(&self, id: MenuItemId) -> Result<MenuEntry, RepositoryError> {
        let row: MenuEntryRow = sqlx::query_as(&format!(
            r"
            SELECT {MENU_ITEM_COLUMNS}, c.name_en AS category
            FROM roomservice.menu_item m
            JOIN roomservice.category c ON c.id = m.category_id
            WHERE m.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    #[instrument(skip(self))]
    async fn first_restaurant(&self) -> Result<Option<Restaurant>, RepositoryError> {
        let row: Option<RestaurantRow> = sqlx::query_as(
            r"
            SELECT id, name, created_at
            FROM roomservice.restaurant
            ORDER BY created_at
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Restaurant::from))
    }

    #[instrument(skip(self))]
    async fn create_restaurant(&self, name: &str) -> Result<Restaurant, RepositoryError> {
        let row: RestaurantRow = sqlx::query_as(
            r"
            INSERT INTO roomservice.restaurant (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            ",
        )
        .bind(RestaurantId::generate())
        .bind(name)
        .fetch_one(self.pool())
        .await?;

        debug!(restaurant_id = %row.id, "Created restaurant");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn create_category(
        &self,
        restaurant_id: RestaurantId,
        name_en: &str,
        name_km: &str,
    ) -> Result<Category, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(
            r"
            INSERT INTO roomservice.category (id, restaurant_id, name_en, name_km)
            VALUES ($1, $2, $3, $4)
            RETURNING id, restaurant_id, name_en, name_km, created_at
            ",
        )
        .bind(CategoryId::generate())
        .bind(restaurant_id)
        .bind(name_en)
        .bind(name_km)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_constraint(e, "category"))?;

        Ok(row.into())
    }

    #[instrument(skip(self, item), fields(name = %item.name_en))]
    async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let row: MenuItemRow = sqlx::query_as(
            r"
            INSERT INTO roomservice.menu_item
                (id, restaurant_id, category_id, name_en, name_km, price,
                 image_url, available, stock_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, restaurant_id, category_id, name_en, name_km, price,
                      image_url, available, stock_count, created_at, updated_at
            ",
        )
        .bind(MenuItemId::generate())
        .bind(item.restaurant_id)
        .bind(item.category_id)
        .bind(&item.name_en)
        .bind(&item.name_km)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(item.available)
        .bind(item.stock_count)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_constraint(e, "menu item"))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_menu(&self) -> Result<Vec<MenuEntry>, RepositoryError> {
        let rows: Vec<MenuEntryRow> = sqlx::query_as(&format!(
            r"
            SELECT {MENU_ITEM_COLUMNS}, c.name_en AS category
            FROM roomservice.menu_item m
            JOIN roomservice.category c ON c.id = m.category_id
            ORDER BY c.created_at, m.created_at, m.name_en
            "
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(MenuEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            r"
            SELECT {MENU_ITEM_COLUMNS}
            FROM roomservice.menu_item m
            WHERE m.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(MenuItem::from))
    }

    #[instrument(skip(self))]
    async fn set_availability(
        &self,
        id: MenuItemId,
        available: bool,
        stock: StockChange,
    ) -> Result<MenuEntry, RepositoryError> {
        // $3 selects whether $4 replaces the stock count.
        let (replace_stock, stock_count) = match stock {
            StockChange::Keep => (false, None),
            StockChange::Unlimited => (true, None),
            StockChange::Set(count) => (true, Some(count)),
        };

        let result = sqlx::query(
            r"
            UPDATE roomservice.menu_item
            SET available = $2,
                stock_count = CASE WHEN $3 THEN $4 ELSE stock_count END,
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(available)
        .bind(replace_stock)
        .bind(stock_count)
        .execute(self.pool())
        .await
        .map_err(|e| map_constraint(e, "menu item"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch_menu_entry(id).await
    }

    #[instrument(skip(self))]
    async fn set_price(
        &self,
        id: MenuItemId,
        price: Decimal,
    ) -> Result<MenuEntry, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE roomservice.menu_item
            SET price = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(price)
        .execute(self.pool())
        .await
        .map_err(|e| map_constraint(e, "menu item"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch_menu_entry(id).await
    }
}
