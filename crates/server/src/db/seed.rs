//! Demo catalog used by `rs-cli seed` and the in-memory backend.

use rust_decimal::Decimal;
use tracing::info;

use roomservice_core::{NewMenuItem, Restaurant};

use super::{CatalogStore, RepositoryError};

/// Name of the seeded restaurant.
pub const DEMO_RESTAURANT: &str = "The Grand Hotel";

struct DemoItem {
    name_en: &'static str,
    name_km: &'static str,
    cents: i64,
    image_url: &'static str,
}

struct DemoCategory {
    name_en: &'static str,
    name_km: &'static str,
    items: &'static [DemoItem],
}

const DEMO_MENU: &[DemoCategory] = &[
    DemoCategory {
        name_en: "Breakfast",
        name_km: "អាហារពេលព្រឹក",
        items: &[
            DemoItem {
                name_en: "American Breakfast",
                name_km: "អាហារពេលព្រឹកអាមេរិក",
                cents: 850,
                image_url: "https://images.unsplash.com/photo-1533089860892-a7c6f0a88666?w=500&q=80",
            },
            DemoItem {
                name_en: "Kuy Teav (Cambodian Noodle Soup)",
                name_km: "គុយទាវ",
                cents: 450,
                image_url: "https://images.unsplash.com/photo-1552611052-33e04de081de?w=500&q=80",
            },
        ],
    },
    DemoCategory {
        name_en: "Main Courses",
        name_km: "ម្ហូបចម្បង",
        items: &[
            DemoItem {
                name_en: "Beef Lok Lak",
                name_km: "ឡុកឡាក់សាច់គោ",
                cents: 900,
                image_url: "https://images.unsplash.com/photo-1620916297397-a4a5402a3c6c?w=500&q=80",
            },
            DemoItem {
                name_en: "Fish Amok",
                name_km: "អាម៉ុកត្រី",
                cents: 850,
                image_url: "https://images.unsplash.com/photo-1548943487-a2e4142f9e16?w=500&q=80",
            },
        ],
    },
    DemoCategory {
        name_en: "Beverages",
        name_km: "ភេសជ្ជៈ",
        items: &[
            DemoItem {
                name_en: "Iced Latte",
                name_km: "កាហ្វេទឹកដោះគោទឹកកក",
                cents: 350,
                image_url: "https://images.unsplash.com/photo-1517701604599-bb29b565090c?w=500&q=80",
            },
            DemoItem {
                name_en: "Fresh Coconut",
                name_km: "ទឹកដូង",
                cents: 250,
                image_url: "https://images.unsplash.com/photo-1523428461295-829d89ebb9b1?w=500&q=80",
            },
        ],
    },
];

/// Seed the demo restaurant, categories and menu.
///
/// Does nothing if a restaurant already exists; returns the existing one.
///
/// # Errors
///
/// Returns `RepositoryError` if any insert fails.
pub async fn seed_demo_catalog(store: &dyn CatalogStore) -> Result<Restaurant, RepositoryError> {
    if let Some(existing) = store.first_restaurant().await? {
        info!(restaurant = %existing.name, "Catalog already seeded, skipping");
        return Ok(existing);
    }

    let restaurant = store.create_restaurant(DEMO_RESTAURANT).await?;
    let mut count = 0_usize;

    for demo_category in DEMO_MENU {
        let category = store
            .create_category(restaurant.id, demo_category.name_en, demo_category.name_km)
            .await?;

        for demo_item in demo_category.items {
            store
                .create_menu_item(NewMenuItem {
                    restaurant_id: restaurant.id,
                    category_id: category.id,
                    name_en: demo_item.name_en.to_string(),
                    name_km: demo_item.name_km.to_string(),
                    price: Decimal::new(demo_item.cents, 2),
                    image_url: Some(demo_item.image_url.to_string()),
                    available: true,
                    stock_count: None,
                })
                .await?;
            count += 1;
        }
    }

    info!(restaurant = %restaurant.name, items = count, "Seeded demo catalog");
    Ok(restaurant)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_seed_creates_menu() {
        let store = MemoryStore::new();
        let restaurant = seed_demo_catalog(&store).await.unwrap();
        assert_eq!(restaurant.name, DEMO_RESTAURANT);

        let menu = store.list_menu().await.unwrap();
        assert_eq!(menu.len(), 6);
        let amok = menu
            .iter()
            .find(|entry| entry.item.name_en == "Fish Amok")
            .unwrap();
        assert_eq!(amok.category, "Main Courses");
        assert_eq!(amok.item.price.to_string(), "8.50");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        let first = seed_demo_catalog(&store).await.unwrap();
        let second = seed_demo_catalog(&store).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.list_menu().await.unwrap().len(), 6);
    }
}
