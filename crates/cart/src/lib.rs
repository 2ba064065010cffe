//! Cart domain module.
//!
//! [`Cart`] is the pure state: one entry per SKU, positive quantities, totals
//! computed from parsed prices. [`CartEngine`] layers the side effects on top:
//! debounced persistence to a [`KeyValueStore`] and a [`Notice`] for every
//! committed change.

pub mod cart;
pub mod engine;
pub mod notification;
pub mod persist;
pub mod snapshot;
pub mod store;

pub use cart::{Cart, CartChange, CartEntry};
pub use engine::{CartEngine, DEFAULT_DEBOUNCE};
pub use notification::{NOTICE_DURATION, Notice, NoticeBus, NotificationSink, Severity, Subscription};
pub use persist::{PersistHandle, PersistWorker};
pub use snapshot::{CART_ITEMS_KEY, CartSnapshot, QUANTITIES_KEY, SnapshotError};
pub use store::{InMemoryKeyValueStore, KeyValueStore};
