//! New-order alerts for hotel staff via chat relay webhooks.
//!
//! Delivery is best effort. Each target gets its own detached task; the order
//! path never waits on it and a failed post is only logged.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use roomservice_core::{Order, PaymentMethod, WALK_IN_ROOM};

use super::pricing::PricedLine;
use crate::config::NotificationConfig;

const RELAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from a single relay post.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay answered {0}")]
    Status(u16),
}

/// Payload for the Telegram relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegramAlert {
    /// Human-facing order number.
    pub order_id: String,
    pub room: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_usd: Decimal,
    pub payment_method: &'static str,
    pub status: &'static str,
    pub items: Vec<TelegramItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegramItem {
    pub name: String,
    pub qty: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for the WhatsApp bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatsAppAlert {
    pub hotel_room: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_usd: Decimal,
    pub method: &'static str,
    pub guest: String,
    pub notes: String,
    /// Item names, one per unit, comma separated.
    pub items: String,
}

/// Build the Telegram relay payload.
#[must_use]
pub fn telegram_alert(order: &Order, lines: &[PricedLine]) -> TelegramAlert {
    let status = match order.payment_method {
        PaymentMethod::Khqr => "pending_verification",
        PaymentMethod::Cash => "pending_kitchen",
    };

    TelegramAlert {
        order_id: order.order_number.clone(),
        room: non_empty(&order.room_id).unwrap_or(WALK_IN_ROOM).to_string(),
        total_usd: order.total_usd,
        payment_method: order.payment_method.relay_tag(),
        status,
        items: lines
            .iter()
            .map(|line| TelegramItem {
                name: line.name_en.clone(),
                qty: line.quantity,
                price: line.price_at_time,
            })
            .collect(),
        guest_name: order.guest_name.as_deref().and_then(non_empty).map(String::from),
        special_requests: order
            .special_requests
            .as_deref()
            .and_then(non_empty)
            .map(String::from),
    }
}

/// Build the WhatsApp bridge payload.
#[must_use]
pub fn whatsapp_alert(order: &Order, lines: &[PricedLine]) -> WhatsAppAlert {
    WhatsAppAlert {
        hotel_room: order.room_id.clone(),
        total_usd: order.total_usd,
        method: order.payment_method.relay_tag(),
        guest: order
            .guest_name
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(WALK_IN_ROOM)
            .to_string(),
        notes: order
            .special_requests
            .as_deref()
            .and_then(non_empty)
            .unwrap_or("None")
            .to_string(),
        items: unit_names(lines),
    }
}

/// Item names repeated once per unit, comma separated.
fn unit_names(lines: &[PricedLine]) -> String {
    let mut names = String::new();
    for line in lines {
        for _ in 0..line.quantity.max(0) {
            if !names.is_empty() {
                names.push_str(", ");
            }
            names.push_str(&line.name_en);
        }
    }
    names
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Posts new-order alerts to the configured relays.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    telegram: Option<Url>,
    whatsapp: Option<Url>,
}

impl Notifier {
    /// Create a notifier for the configured targets.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;

        Ok(Self {
            client,
            telegram: config.telegram_webhook_url.clone(),
            whatsapp: config.whatsapp_webhook_url.clone(),
        })
    }

    /// Number of configured relay targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        usize::from(self.telegram.is_some()) + usize::from(self.whatsapp.is_some())
    }

    /// Dispatch alerts for a newly placed order without waiting for delivery.
    pub fn order_placed(&self, order: &Order, lines: &[PricedLine]) {
        if let Some(url) = &self.telegram {
            self.dispatch("telegram", url.clone(), telegram_alert(order, lines));
        }
        if let Some(url) = &self.whatsapp {
            self.dispatch("whatsapp", url.clone(), whatsapp_alert(order, lines));
        }
    }

    fn dispatch<T>(&self, relay: &'static str, url: Url, payload: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = post(&client, relay, url, &payload).await {
                warn!(relay, error = %e, "Order notification failed");
            }
        });
    }
}

#[instrument(skip(client, url, payload))]
async fn post<T: Serialize>(
    client: &reqwest::Client,
    relay: &'static str,
    url: Url,
    payload: &T,
) -> Result<(), NotifyError> {
    let response = client.post(url).json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::Status(status.as_u16()));
    }
    debug!(relay, "Order notification delivered");
    Ok(())
}
