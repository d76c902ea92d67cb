//! Process-local store for demos and tests.
//!
//! Holds the catalog and the ledger behind one `RwLock`, so an order and its
//! lines become visible in a single write.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use roomservice_core::{
    Category, CategoryId, MAX_LINE_QUANTITY, MenuEntry, MenuItem, MenuItemId, NewMenuItem,
    NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Restaurant, RestaurantId,
    StockChange,
};

use super::{CatalogStore, OrderLedger, RepositoryError};

#[derive(Debug, Default)]
struct MemoryState {
    restaurants: Vec<Restaurant>,
    categories: Vec<Category>,
    menu_items: Vec<MenuItem>,
    /// Orders in creation order, lines stored without the joined menu item.
    orders: Vec<Order>,
}

impl MemoryState {
    fn entry(&self, item: &MenuItem) -> MenuEntry {
        let category = self
            .categories
            .iter()
            .find(|category| category.id == item.category_id)
            .map(|category| category.name_en.clone())
            .unwrap_or_default();

        MenuEntry {
            item: item.clone(),
            category,
        }
    }

    fn menu_item_mut(&mut self, id: MenuItemId) -> Result<&mut MenuItem, RepositoryError> {
        self.menu_items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    fn order_mut(&mut self, id: OrderId) -> Result<&mut Order, RepositoryError> {
        self.orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    /// Clone an order with current menu items joined onto its lines.
    fn joined(&self, order: &Order) -> Order {
        let mut order = order.clone();
        for line in &mut order.items {
            line.menu_item = self
                .menu_items
                .iter()
                .find(|item| item.id == line.menu_item_id)
                .cloned();
        }
        order
    }
}

/// In-memory implementation of [`CatalogStore`] and [`OrderLedger`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn first_restaurant(&self) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self.state.read().await.restaurants.first().cloned())
    }

    async fn create_restaurant(&self, name: &str) -> Result<Restaurant, RepositoryError> {
        let restaurant = Restaurant {
            id: RestaurantId::generate(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.state.write().await.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    async fn create_category(
        &self,
        restaurant_id: RestaurantId,
        name_en: &str,
        name_km: &str,
    ) -> Result<Category, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.restaurants.iter().any(|r| r.id == restaurant_id) {
            return Err(RepositoryError::Conflict(format!(
                "category: unknown restaurant {restaurant_id}"
            )));
        }

        let category = Category {
            id: CategoryId::generate(),
            restaurant_id,
            name_en: name_en.to_string(),
            name_km: name_km.to_string(),
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.categories.iter().any(|c| c.id == item.category_id) {
            return Err(RepositoryError::Conflict(format!(
                "menu item: unknown category {}",
                item.category_id
            )));
        }

        let now = Utc::now();
        let menu_item = MenuItem {
            id: MenuItemId::generate(),
            restaurant_id: item.restaurant_id,
            category_id: item.category_id,
            name_en: item.name_en,
            name_km: item.name_km,
            price: item.price,
            image_url: item.image_url,
            available: item.available,
            stock_count: item.stock_count,
            created_at: now,
            updated_at: now,
        };
        state.menu_items.push(menu_item.clone());
        Ok(menu_item)
    }

    async fn list_menu(&self) -> Result<Vec<MenuEntry>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .menu_items
            .iter()
            .map(|item| state.entry(item))
            .collect())
    }

    async fn get_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.menu_items.iter().find(|item| item.id == id).cloned())
    }

    #[instrument(skip(self))]
    async fn set_availability(
        &self,
        id: MenuItemId,
        available: bool,
        stock: StockChange,
    ) -> Result<MenuEntry, RepositoryError> {
        let mut state = self.state.write().await;
        let item = state.menu_item_mut(id)?;
        item.available = available;
        item.stock_count = stock.apply(item.stock_count);
        item.updated_at = Utc::now();
        let item = item.clone();
        Ok(state.entry(&item))
    }

    #[instrument(skip(self))]
    async fn set_price(
        &self,
        id: MenuItemId,
        price: Decimal,
    ) -> Result<MenuEntry, RepositoryError> {
        let mut state = self.state.write().await;
        let item = state.menu_item_mut(id)?;
        item.price = price;
        item.updated_at = Utc::now();
        let item = item.clone();
        Ok(state.entry(&item))
    }
}

#[async_trait]
impl OrderLedger for MemoryStore {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;

        if !state.restaurants.iter().any(|r| r.id == order.restaurant_id) {
            return Err(RepositoryError::Conflict(format!(
                "order: unknown restaurant {}",
                order.restaurant_id
            )));
        }
        // Validate every line before anything is written.
        for line in &order.lines {
            if !state.menu_items.iter().any(|item| item.id == line.menu_item_id) {
                return Err(RepositoryError::Conflict(format!(
                    "order line: unknown menu item {}",
                    line.menu_item_id
                )));
            }
            if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
                return Err(RepositoryError::Conflict(format!(
                    "order line: quantity must be between 1 and {MAX_LINE_QUANTITY}"
                )));
            }
        }

        let id = OrderId::generate();
        let items = order
            .lines
            .iter()
            .map(|line| OrderItem {
                id: OrderItemId::generate(),
                order_id: id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                price_at_time: line.price_at_time,
                menu_item: None,
            })
            .collect();

        let stored = Order {
            id,
            order_number: order.order_number,
            room_id: order.room_id,
            total_usd: order.total_usd,
            payment_method: order.payment_method,
            status: order.status,
            is_posted_to_folio: false,
            guest_name: order.guest_name,
            special_requests: order.special_requests,
            restaurant_id: order.restaurant_id,
            created_at: order.created_at,
            updated_at: order.created_at,
            items,
        };
        let joined = state.joined(&stored);
        state.orders.push(stored);

        debug!(order_id = %id, "Created order");
        Ok(joined)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .rev()
            .map(|order| state.joined(order))
            .collect();
        // Stable sort keeps later-inserted orders first among equal timestamps.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .find(|order| order.id == id)
            .map(|order| state.joined(order)))
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        let order = state.order_mut(id)?;
        order.status = status;
        order.updated_at = Utc::now();
        let order = order.clone();
        Ok(state.joined(&order))
    }

    #[instrument(skip(self))]
    async fn set_folio_posted(
        &self,
        id: OrderId,
        posted: bool,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        let order = state.order_mut(id)?;
        if !order.status.allows_folio_posting() {
            return Err(RepositoryError::Conflict(format!(
                "order is {}, not DELIVERED",
                order.status
            )));
        }
        order.is_posted_to_folio = posted;
        order.updated_at = Utc::now();
        let order = order.clone();
        Ok(state.joined(&order))
    }

    #[instrument(skip(self))]
    async fn update_status_and_folio(
        &self,
        id: OrderId,
        status: OrderStatus,
        posted: bool,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        let order = state.order_mut(id)?;
        if !order.status.allows_folio_posting() {
            return Err(RepositoryError::Conflict(format!(
                "order is {}, not DELIVERED",
                order.status
            )));
        }
        order.status = status;
        order.is_posted_to_folio = posted;
        order.updated_at = Utc::now();
        let order = order.clone();
        Ok(state.joined(&order))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use roomservice_core::{NewOrderLine, PaymentMethod, order_number_at};

    use super::*;

    async fn store_with_item(stock_count: Option<i32>) -> (MemoryStore, Restaurant, MenuItem) {
        let store = MemoryStore::new();
        let restaurant = store.create_restaurant("The Grand Hotel").await.unwrap();
        let category = store
            .create_category(restaurant.id, "Beverages", "ភេសជ្ជៈ")
            .await
            .unwrap();
        let item = store
            .create_menu_item(NewMenuItem {
                restaurant_id: restaurant.id,
                category_id: category.id,
                name_en: "Iced Latte".to_string(),
                name_km: "កាហ្វេទឹកដោះគោទឹកកក".to_string(),
                price: Decimal::new(350, 2),
                image_url: None,
                available: true,
                stock_count,
            })
            .await
            .unwrap();
        (store, restaurant, item)
    }

    fn new_order(restaurant: &Restaurant, lines: Vec<NewOrderLine>) -> NewOrder {
        let now = Utc::now();
        NewOrder {
            order_number: order_number_at(now),
            room_id: "204".to_string(),
            total_usd: lines
                .iter()
                .map(|line| line.price_at_time * Decimal::from(line.quantity))
                .sum(),
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::PendingKitchen,
            guest_name: None,
            special_requests: None,
            restaurant_id: restaurant.id,
            created_at: now,
            lines,
        }
    }

    #[tokio::test]
    async fn test_set_availability_three_way_stock() {
        let (store, _, item) = store_with_item(Some(4)).await;

        let entry = store
            .set_availability(item.id, false, StockChange::Keep)
            .await
            .unwrap();
        assert!(!entry.item.available);
        assert_eq!(entry.item.stock_count, Some(4));
        assert_eq!(entry.category, "Beverages");

        let entry = store
            .set_availability(item.id, true, StockChange::Unlimited)
            .await
            .unwrap();
        assert_eq!(entry.item.stock_count, None);

        let entry = store
            .set_availability(item.id, true, StockChange::Set(0))
            .await
            .unwrap();
        assert_eq!(entry.item.stock_count, Some(0));
        assert!(!entry.item.is_purchasable());
    }

    #[tokio::test]
    async fn test_set_availability_unknown_item() {
        let store = MemoryStore::new();
        let result = store
            .set_availability(MenuItemId::generate(), true, StockChange::Keep)
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_item_without_writing() {
        let (store, restaurant, item) = store_with_item(None).await;
        let order = new_order(
            &restaurant,
            vec![
                NewOrderLine {
                    menu_item_id: item.id,
                    quantity: 1,
                    price_at_time: item.price,
                },
                NewOrderLine {
                    menu_item_id: MenuItemId::generate(),
                    quantity: 1,
                    price_at_time: Decimal::ONE,
                },
            ],
        );

        let result = store.create_order(order).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_rejects_quantity_beyond_limit() {
        let (store, restaurant, item) = store_with_item(None).await;
        let order = new_order(
            &restaurant,
            vec![NewOrderLine {
                menu_item_id: item.id,
                quantity: MAX_LINE_QUANTITY + 1,
                price_at_time: item.price,
            }],
        );

        let result = store.create_order(order).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_edit_leaves_order_lines_alone() {
        let (store, restaurant, item) = store_with_item(None).await;
        let order = store
            .create_order(new_order(
                &restaurant,
                vec![NewOrderLine {
                    menu_item_id: item.id,
                    quantity: 2,
                    price_at_time: item.price,
                }],
            ))
            .await
            .unwrap();

        store.set_price(item.id, Decimal::new(400, 2)).await.unwrap();

        let reloaded = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.items[0].price_at_time, Decimal::new(350, 2));
        assert_eq!(
            reloaded.items[0].menu_item.as_ref().unwrap().price,
            Decimal::new(400, 2)
        );
        assert_eq!(reloaded.total_usd, Decimal::new(700, 2));
    }

    #[tokio::test]
    async fn test_folio_flag_requires_delivered() {
        let (store, restaurant, item) = store_with_item(None).await;
        let order = store
            .create_order(new_order(
                &restaurant,
                vec![NewOrderLine {
                    menu_item_id: item.id,
                    quantity: 1,
                    price_at_time: item.price,
                }],
            ))
            .await
            .unwrap();

        let result = store.set_folio_posted(order.id, true).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert!(
            !store
                .get_order(order.id)
                .await
                .unwrap()
                .unwrap()
                .is_posted_to_folio
        );

        store
            .update_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        let posted = store.set_folio_posted(order.id, true).await.unwrap();
        assert!(posted.is_posted_to_folio);
    }

    #[tokio::test]
    async fn test_refused_status_and_folio_update_changes_nothing() {
        let (store, restaurant, item) = store_with_item(None).await;
        let order = store
            .create_order(new_order(
                &restaurant,
                vec![NewOrderLine {
                    menu_item_id: item.id,
                    quantity: 1,
                    price_at_time: item.price,
                }],
            ))
            .await
            .unwrap();

        let result = store
            .update_status_and_folio(order.id, OrderStatus::Delivered, true)
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let reloaded = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::PendingKitchen);
        assert!(!reloaded.is_posted_to_folio);

        store
            .update_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        let updated = store
            .update_status_and_folio(order.id, OrderStatus::Delivered, true)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert!(updated.is_posted_to_folio);

        let missing = store
            .update_status_and_folio(OrderId::generate(), OrderStatus::Delivered, true)
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let (store, restaurant, item) = store_with_item(None).await;
        let line = NewOrderLine {
            menu_item_id: item.id,
            quantity: 1,
            price_at_time: item.price,
        };
        let first = store
            .create_order(new_order(&restaurant, vec![line.clone()]))
            .await
            .unwrap();
        let second = store
            .create_order(new_order(&restaurant, vec![line]))
            .await
            .unwrap();

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);
    }
}
