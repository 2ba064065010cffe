//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// [`crate::Price`] of `100.00` equals any other price of `100.00`; a book
/// with SKU `X1` is an entity and is compared by identity instead.
///
/// ```ignore
/// let a: Price = "100.00".parse()?;
/// let b: Price = "100".parse()?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
