//! Pure cart state.

use rust_decimal::Decimal;

use bookstore_catalog::Book;
use bookstore_core::{DomainError, DomainResult, Entity, Sku};

use crate::notification::{Notice, Severity};

/// One selected book and how many copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    book: Book,
    quantity: u32,
}

impl CartEntry {
    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price * quantity`; fails if the book's price is not a decimal or
    /// the product overflows.
    pub fn line_total(&self) -> DomainResult<Decimal> {
        self.book
            .unit_price()?
            .times(self.quantity)
            .map_err(|_| DomainError::overflow(format!("line total for {}", self.book.sku)))
    }
}

impl Entity for CartEntry {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.book.sku
    }
}

/// What a committed mutation did, with the data a notice needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    Added { sku: Sku, name: String, quantity: u32 },
    /// An add merged into an existing entry; `quantity` is the new total.
    Incremented { sku: Sku, name: String, quantity: u32 },
    QuantitySet { sku: Sku, name: String, quantity: u32 },
    Removed { sku: Sku, name: String },
    Cleared,
}

impl CartChange {
    pub fn notice(&self) -> Notice {
        match self {
            CartChange::Added { name, .. } => Notice::new(
                Severity::Success,
                "Item Added to Cart",
                format!("{name} has been added to your cart."),
            ),
            CartChange::Incremented { name, quantity, .. } => Notice::new(
                Severity::Info,
                "Item Updated in Cart",
                format!("{name} quantity updated to {quantity}."),
            ),
            CartChange::QuantitySet { name, quantity, .. } => Notice::new(
                Severity::Info,
                "Quantity Updated",
                format!("Quantity for {name} has been updated to {quantity}."),
            ),
            CartChange::Removed { name, .. } => Notice::new(
                Severity::Warning,
                "Item Removed",
                format!("{name} has been removed from your cart."),
            ),
            CartChange::Cleared => Notice::new(
                Severity::Warning,
                "Cart Cleared",
                "All items have been removed from your cart.",
            ),
        }
    }
}

/// Selected books keyed by SKU, in the order they were first added.
///
/// Invariants: at most one entry per SKU; every quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(book, quantity)` pairs, merging repeated SKUs and
    /// dropping zero quantities.
    pub fn from_entries(entries: impl IntoIterator<Item = (Book, u32)>) -> Self {
        let mut cart = Self::new();
        for (book, quantity) in entries {
            if quantity > 0 {
                let _ = cart.add(book, quantity);
            }
        }
        cart
    }

    /// Add `quantity` copies, merging into an existing entry for the same SKU.
    pub fn add(&mut self, book: Book, quantity: u32) -> DomainResult<CartChange> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }

        if let Some(entry) = self.entry_mut(book.id()) {
            entry.quantity = entry.quantity.saturating_add(quantity);
            return Ok(CartChange::Incremented {
                sku: book.sku,
                name: entry.book.name.clone(),
                quantity: entry.quantity,
            });
        }

        let change = CartChange::Added {
            sku: book.sku.clone(),
            name: book.name.clone(),
            quantity,
        };
        self.entries.push(CartEntry { book, quantity });
        Ok(change)
    }

    /// Remove the entry for `sku`. `None` if it was not in the cart.
    pub fn remove(&mut self, sku: &Sku) -> Option<CartChange> {
        let idx = self.entries.iter().position(|e| e.id() == sku)?;
        let entry = self.entries.remove(idx);
        Some(CartChange::Removed {
            sku: entry.book.sku,
            name: entry.book.name,
        })
    }

    /// Set an absolute quantity; `<= 0` removes. `None` if `sku` is absent.
    pub fn update_quantity(&mut self, sku: &Sku, quantity: i64) -> Option<CartChange> {
        if quantity <= 0 {
            return self.remove(sku);
        }
        let entry = self.entry_mut(sku)?;
        entry.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Some(CartChange::QuantitySet {
            sku: sku.clone(),
            name: entry.book.name.clone(),
            quantity: entry.quantity,
        })
    }

    pub fn clear(&mut self) -> CartChange {
        self.entries.clear();
        CartChange::Cleared
    }

    /// Sum of `price * quantity` over all entries.
    pub fn total(&self) -> DomainResult<Decimal> {
        self.entries.iter().try_fold(Decimal::ZERO, |acc, entry| {
            acc.checked_add(entry.line_total()?)
                .ok_or_else(|| DomainError::overflow("cart total"))
        })
    }

    pub fn line_total(&self, sku: &Sku) -> DomainResult<Decimal> {
        self.entry(sku)
            .ok_or_else(|| DomainError::not_found(sku.to_string()))?
            .line_total()
    }

    /// Number of distinct entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of quantities.
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    pub fn quantity(&self, sku: &Sku) -> Option<u32> {
        self.entry(sku).map(CartEntry::quantity)
    }

    pub fn contains(&self, sku: &Sku) -> bool {
        self.entry(sku).is_some()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, sku: &Sku) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id() == sku)
    }

    fn entry_mut(&mut self, sku: &Sku) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.id() == sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(sku: &str, price: &str) -> Book {
        Book::new(Sku::new(sku).unwrap(), format!("Book {sku}"), price)
    }

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    #[test]
    fn repeated_add_merges_into_one_entry() {
        let mut cart = Cart::new();
        let first = cart.add(book("X1", "100.00"), 2).unwrap();
        let second = cart.add(book("X1", "100.00"), 3).unwrap();

        assert!(matches!(first, CartChange::Added { quantity: 2, .. }));
        assert!(matches!(second, CartChange::Incremented { quantity: 5, .. }));
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.quantity(&sku("X1")), Some(5));
    }

    #[test]
    fn zero_quantity_add_is_rejected() {
        let mut cart = Cart::new();
        let err = cart.add(book("X1", "1"), 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn total_and_count_for_two_books() {
        let mut cart = Cart::new();
        cart.add(book("X1", "100.00"), 2).unwrap();
        cart.add(book("X2", "50.00"), 1).unwrap();

        assert_eq!(cart.total().unwrap(), Decimal::new(25000, 2));
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total_units(), 3);
        assert_eq!(cart.line_total(&sku("X1")).unwrap(), Decimal::new(200, 0));
    }

    #[test]
    fn update_to_zero_removes_and_total_excludes_it() {
        let mut cart = Cart::new();
        cart.add(book("X1", "100.00"), 2).unwrap();
        cart.add(book("X2", "50.00"), 1).unwrap();

        let change = cart.update_quantity(&sku("X1"), 0);
        assert!(matches!(change, Some(CartChange::Removed { .. })));
        assert!(!cart.contains(&sku("X1")));
        assert_eq!(cart.total().unwrap(), Decimal::new(50, 0));
    }

    #[test]
    fn update_sets_absolute_quantity() {
        let mut cart = Cart::new();
        cart.add(book("X1", "10"), 4).unwrap();
        let change = cart.update_quantity(&sku("X1"), 2).unwrap();
        assert!(matches!(change, CartChange::QuantitySet { quantity: 2, .. }));
        assert_eq!(cart.quantity(&sku("X1")), Some(2));
    }

    #[test]
    fn update_of_absent_sku_is_a_no_op() {
        let mut cart = Cart::new();
        assert_eq!(cart.update_quantity(&sku("NOPE"), 3), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add(book("X1", "10"), 1).unwrap();
        assert!(cart.remove(&sku("X1")).is_some());
        assert!(cart.remove(&sku("X1")).is_none());
    }

    #[test]
    fn malformed_price_fails_loudly() {
        let mut cart = Cart::new();
        cart.add(book("X1", "10"), 1).unwrap();
        cart.add(book("BAD", "ten shillings"), 1).unwrap();
        let err = cart.total().unwrap_err();
        assert_eq!(err, DomainError::invalid_price("BAD", "ten shillings"));
    }

    #[test]
    fn huge_prices_overflow_into_an_error() {
        let max = "79228162514264337593543950335";

        let mut cart = Cart::new();
        cart.add(book("BIG", max), 2).unwrap();
        assert!(matches!(cart.total(), Err(DomainError::Overflow(_))));
        assert!(matches!(
            cart.line_total(&sku("BIG")),
            Err(DomainError::Overflow(_))
        ));

        // Each line fits; their sum does not.
        let mut cart = Cart::new();
        cart.add(book("A", max), 1).unwrap();
        cart.add(book("B", max), 1).unwrap();
        assert_eq!(cart.line_total(&sku("A")).unwrap().to_string(), max);
        assert!(matches!(cart.total(), Err(DomainError::Overflow(_))));
    }

    #[test]
    fn line_total_of_absent_sku_is_not_found() {
        let cart = Cart::new();
        assert!(matches!(
            cart.line_total(&sku("X1")),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn notices_carry_name_and_quantity() {
        let change = CartChange::Incremented {
            sku: sku("X1"),
            name: "Atlas".into(),
            quantity: 3,
        };
        let notice = change.notice();
        assert_eq!(notice.severity, Severity::Info);
        assert_eq!(notice.title, "Item Updated in Cart");
        assert_eq!(notice.message, "Atlas quantity updated to 3.");

        assert_eq!(CartChange::Cleared.notice().severity, Severity::Warning);
    }

    #[test]
    fn from_entries_merges_and_skips_zero() {
        let cart = Cart::from_entries(vec![
            (book("X1", "1"), 1),
            (book("X2", "1"), 0),
            (book("X1", "1"), 2),
        ]);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.quantity(&sku("X1")), Some(3));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, u32),
            Remove(usize),
            Update(usize, i64),
            Clear,
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0usize..5, 1u32..10).prop_map(|(i, q)| Op::Add(i, q)),
                2 => (0usize..5).prop_map(Op::Remove),
                2 => (0usize..5, -3i64..10).prop_map(|(i, q)| Op::Update(i, q)),
                1 => Just(Op::Clear),
            ]
        }

        proptest! {
            /// Property: SKUs stay unique and quantities stay positive.
            #[test]
            fn invariants_hold_under_any_sequence(ops in prop::collection::vec(arb_op(), 0..40)) {
                let mut cart = Cart::new();
                for op in ops {
                    match op {
                        Op::Add(i, q) => { cart.add(book(&format!("S{i}"), "1.50"), q).unwrap(); }
                        Op::Remove(i) => { cart.remove(&sku(&format!("S{i}"))); }
                        Op::Update(i, q) => { cart.update_quantity(&sku(&format!("S{i}")), q); }
                        Op::Clear => { cart.clear(); }
                    }
                }

                let mut skus: Vec<&Sku> = cart.entries().iter().map(|e| e.id()).collect();
                skus.sort();
                skus.dedup();
                prop_assert_eq!(skus.len(), cart.count());
                prop_assert!(cart.entries().iter().all(|e| e.quantity() >= 1));

                let expected = Decimal::new(150, 2) * Decimal::from(cart.total_units());
                prop_assert_eq!(cart.total().unwrap(), expected);
            }

            /// Property: add(p, q) then add(p, q2) yields one entry of q + q2.
            #[test]
            fn adds_accumulate(q in 1u32..1000, q2 in 1u32..1000) {
                let mut cart = Cart::new();
                cart.add(book("P", "2"), q).unwrap();
                cart.add(book("P", "2"), q2).unwrap();
                prop_assert_eq!(cart.count(), 1);
                prop_assert_eq!(cart.quantity(&sku("P")), Some(q + q2));
            }
        }
    }
}
