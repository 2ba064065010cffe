//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Books and cart entries are entities keyed by [`crate::Sku`]; engines use
/// `id()` for every lookup and de-duplication.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
