//! The storefront session: one catalog query plus one cart.

use std::sync::Arc;

use bookstore_cart::{CartEngine, KeyValueStore, NotificationSink};
use bookstore_catalog::{Book, CatalogQuery, CatalogSource};
use bookstore_core::{DomainError, Sku};

use crate::config::StorefrontConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("unknown sku: {0}")]
    UnknownSku(Sku),
}

/// Composes the catalog engine and the cart engine for one session.
///
/// Cart operations that take a [`Sku`] resolve it against the loaded
/// catalog first.
pub struct Storefront {
    catalog: CatalogQuery,
    cart: CartEngine,
}

impl Storefront {
    pub fn new(catalog: CatalogQuery, cart: CartEngine) -> Self {
        Self { catalog, cart }
    }

    /// Build an empty catalog sized per `config` and restore the cart.
    pub async fn launch(
        config: &StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, StorefrontError> {
        let catalog = CatalogQuery::with_page_size(config.page_size)?;
        let cart = CartEngine::restore(store, sink, config.cart_debounce).await;
        Ok(Self::new(catalog, cart))
    }

    /// Fetch the catalog from `source`; see [`CatalogQuery::refresh`].
    pub async fn refresh<S>(&mut self, source: &S)
    where
        S: CatalogSource + ?Sized,
    {
        self.catalog.refresh(source).await;
    }

    pub fn add_to_cart(&mut self, sku: &Sku, quantity: u32) -> Result<(), StorefrontError> {
        let book = self.lookup(sku)?.clone();
        self.cart.add_to_cart(book, quantity)?;
        Ok(())
    }

    /// Remove the book if it is in the cart, otherwise add one copy.
    /// Returns whether the book is in the cart afterwards.
    pub fn toggle_in_cart(&mut self, sku: &Sku) -> Result<bool, StorefrontError> {
        if self.cart.cart().contains(sku) {
            self.cart.remove_from_cart(sku);
            return Ok(false);
        }
        self.add_to_cart(sku, 1)?;
        Ok(true)
    }

    /// Swap `current` for one copy of `substitute`.
    ///
    /// The substitute is resolved before anything changes, so an unknown
    /// SKU leaves the cart untouched.
    pub fn replace_with_substitute(
        &mut self,
        current: &Sku,
        substitute: &Sku,
    ) -> Result<(), StorefrontError> {
        let replacement = self.lookup(substitute)?.clone();
        self.cart.remove_from_cart(current);
        self.cart.add_to_cart(replacement, 1)?;
        Ok(())
    }

    /// Related books for `sku` within the current filters.
    pub fn related(&self, sku: &Sku) -> Result<Vec<&Book>, StorefrontError> {
        let book = self.lookup(sku)?;
        Ok(self.catalog.related_books(book))
    }

    pub fn catalog(&self) -> &CatalogQuery {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogQuery {
        &mut self.catalog
    }

    pub fn cart(&self) -> &CartEngine {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartEngine {
        &mut self.cart
    }

    /// Flush pending cart writes and stop the persist worker.
    pub async fn shutdown(self) {
        self.cart.shutdown().await;
    }

    fn lookup(&self, sku: &Sku) -> Result<&Book, StorefrontError> {
        self.catalog
            .book(sku)
            .ok_or_else(|| StorefrontError::UnknownSku(sku.clone()))
    }
}
