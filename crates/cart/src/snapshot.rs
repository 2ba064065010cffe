//! Persisted cart shape.
//!
//! Two independent keys: `cartItems` holds the books as a JSON array and
//! `quantities` maps SKU to count. Loading reconciles the two, since they are
//! written separately and can drift.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use bookstore_catalog::Book;
use bookstore_core::{Entity, Sku};

use crate::cart::Cart;
use crate::store::KeyValueStore;

pub const CART_ITEMS_KEY: &str = "cartItems";
pub const QUANTITIES_KEY: &str = "quantities";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("malformed value under {key:?}: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The cart as written to (or read from) the key/value store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<Book>,
    pub quantities: BTreeMap<Sku, i64>,
}

impl CartSnapshot {
    pub fn capture(cart: &Cart) -> Self {
        let mut snapshot = Self::default();
        for entry in cart.entries() {
            snapshot.items.push(entry.book().clone());
            snapshot
                .quantities
                .insert(entry.id().clone(), i64::from(entry.quantity()));
        }
        snapshot
    }

    /// Rebuild a cart, repairing drift between the two keys:
    /// repeated items keep the first, a missing quantity means 1, a
    /// non-positive quantity drops the item, and orphan quantities are ignored.
    pub fn into_cart(self) -> Cart {
        let mut quantities = self.quantities;
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.items.len());

        for book in self.items {
            if !seen.insert(book.sku.clone()) {
                tracing::debug!(sku = %book.sku, "dropping repeated persisted cart item");
                continue;
            }
            let quantity = quantities.remove(&book.sku).unwrap_or(1);
            if quantity <= 0 {
                continue;
            }
            entries.push((book, u32::try_from(quantity).unwrap_or(u32::MAX)));
        }

        if !quantities.is_empty() {
            tracing::debug!(orphans = quantities.len(), "ignoring quantities without a cart item");
        }

        Cart::from_entries(entries)
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), SnapshotError> {
        let items = serde_json::to_string(&self.items).map_err(|source| SnapshotError::Malformed {
            key: CART_ITEMS_KEY,
            source,
        })?;
        let quantities =
            serde_json::to_string(&self.quantities).map_err(|source| SnapshotError::Malformed {
                key: QUANTITIES_KEY,
                source,
            })?;

        store.set(CART_ITEMS_KEY, &items).await?;
        store.set(QUANTITIES_KEY, &quantities).await?;
        Ok(())
    }

    /// `Ok(None)` when nothing was ever persisted.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, SnapshotError> {
        let Some(raw_items) = store.get(CART_ITEMS_KEY).await? else {
            return Ok(None);
        };
        let items: Vec<Book> =
            serde_json::from_str(&raw_items).map_err(|source| SnapshotError::Malformed {
                key: CART_ITEMS_KEY,
                source,
            })?;

        let quantities = match store.get(QUANTITIES_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| SnapshotError::Malformed {
                key: QUANTITIES_KEY,
                source,
            })?,
            None => BTreeMap::new(),
        };

        Ok(Some(Self { items, quantities }))
    }

    pub async fn erase(store: &dyn KeyValueStore) -> Result<(), SnapshotError> {
        store.remove(CART_ITEMS_KEY).await?;
        store.remove(QUANTITIES_KEY).await?;
        Ok(())
    }
}
