//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::db::{CatalogStore, OrderLedger};
use crate::services::notifications::NotifyError;
use crate::services::{Notifier, OrderService, PaywaySigner, SigningError};

/// Error building application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("payment signer: {0}")]
    Signer(#[from] SigningError),
    #[error("notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, the order workflow and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn OrderLedger>,
    orders: OrderService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `catalog` - Menu storage
    /// * `ledger` - Order storage
    ///
    /// # Errors
    ///
    /// Returns an error if the payment signer or the notifier cannot be built.
    pub fn new(
        config: ServerConfig,
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn OrderLedger>,
    ) -> Result<Self, StateError> {
        let signer = PaywaySigner::new(&config.payway, &config.frontend_url)?;
        let notifier = Notifier::new(&config.notifications)?;
        let orders = OrderService::new(catalog.clone(), ledger.clone(), signer, notifier);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                ledger,
                orders,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the menu store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    /// Get a reference to the order ledger.
    #[must_use]
    pub fn ledger(&self) -> &dyn OrderLedger {
        self.inner.ledger.as_ref()
    }

    /// Get a reference to the order workflow.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
