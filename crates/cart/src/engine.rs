//! Cart engine: the pure [`Cart`] plus persistence and notices.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use bookstore_catalog::Book;
use bookstore_core::{DomainResult, Sku};

use crate::cart::{Cart, CartChange};
use crate::notification::NotificationSink;
use crate::persist::{PersistHandle, PersistWorker};
use crate::snapshot::{CartSnapshot, SnapshotError};
use crate::store::KeyValueStore;

/// Quiet period before a changed cart is written out.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Owns the cart for one session.
///
/// In-memory state is authoritative: every mutation applies immediately,
/// emits one notice, and schedules a debounced write. Store failures are
/// logged and never reach the caller.
pub struct CartEngine {
    cart: Cart,
    sink: Arc<dyn NotificationSink>,
    persist: PersistHandle,
}

impl CartEngine {
    /// Load the persisted cart (if any) and start the persist worker.
    ///
    /// A missing, malformed, or unreadable snapshot yields an empty cart.
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn NotificationSink>,
        debounce: Duration,
    ) -> Self {
        let cart = match CartSnapshot::load(store.as_ref()).await {
            Ok(Some(snapshot)) => snapshot.into_cart(),
            Ok(None) => Cart::new(),
            Err(e @ SnapshotError::Malformed { .. }) => {
                tracing::debug!(error = %e, "discarding malformed persisted cart");
                Cart::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted cart; starting empty");
                Cart::new()
            }
        };

        tracing::info!(entries = cart.count(), "cart restored");

        Self {
            cart,
            sink,
            persist: PersistWorker::start(store, debounce),
        }
    }

    pub fn add_to_cart(&mut self, book: Book, quantity: u32) -> DomainResult<()> {
        let change = self.cart.add(book, quantity)?;
        self.commit(change);
        Ok(())
    }

    pub fn remove_from_cart(&mut self, sku: &Sku) {
        if let Some(change) = self.cart.remove(sku) {
            self.commit(change);
        }
    }

    /// Set an absolute quantity; `<= 0` removes the entry.
    pub fn update_quantity(&mut self, sku: &Sku, quantity: i64) {
        if let Some(change) = self.cart.update_quantity(sku, quantity) {
            self.commit(change);
        }
    }

    pub fn clear_cart(&mut self) {
        let change = self.cart.clear();
        self.commit(change);
    }

    pub fn total(&self) -> DomainResult<Decimal> {
        self.cart.total()
    }

    pub fn count(&self) -> usize {
        self.cart.count()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Write any pending snapshot now.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    /// Flush and stop the persist worker.
    pub async fn shutdown(self) {
        self.persist.shutdown().await;
    }

    fn commit(&self, change: CartChange) {
        match &change {
            CartChange::Cleared => self.persist.erase(),
            _ => self.persist.schedule(CartSnapshot::capture(&self.cart)),
        }
        self.sink.notify(change.notice());
    }
}
