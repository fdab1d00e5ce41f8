//! Product catalog and order pricing
//!
//! The catalog is fixed at startup. Selection codes are the 1-based
//! positions shown to the customer.


/// A purchasable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    /// Price per unit in whole currency units
    pub unit_price: u64,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, unit_price: u64) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
        }
    }
}

/// Price breakdown for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: u64,
    pub delivery_charge: u64,
    pub total: u64,
}

/// Immutable product list plus the flat delivery surcharge
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    delivery_charge: u64,
}

/// Default delivery surcharge, applied once per order
pub const DEFAULT_DELIVERY_CHARGE: u64 = 200;

impl Default for Catalog {
    fn default() -> Self {
        Self::with_delivery_charge(DEFAULT_DELIVERY_CHARGE)
    }
}

impl Catalog {
    /// The shop's standard product list
    pub fn with_delivery_charge(delivery_charge: u64) -> Self {
        Self::new(
            vec![
                Product::new(1, "Maize Flour 2kg", 180),
                Product::new(2, "Cooking Oil 1L", 350),
                Product::new(3, "Sugar 1kg", 160),
                Product::new(4, "Rice 5kg", 950),
            ],
            delivery_charge,
        )
    }

    /// Build a catalog from an explicit product list, ordered by id
    pub fn new(mut products: Vec<Product>, delivery_charge: u64) -> Self {
        products.sort_by_key(|p| p.id);
        products.dedup_by_key(|p| p.id);
        Self {
            products,
            delivery_charge,
        }
    }

    /// Products in stable, numbered order
    pub fn list_products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn delivery_charge(&self) -> u64 {
        self.delivery_charge
    }

    /// Price `quantity` units of a product.
    ///
    /// Returns `None` for an unknown product or when the amount does not fit
    /// in a `u64`.
    pub fn price_for(&self, product_id: u32, quantity: u32) -> Option<Quote> {
        let product = self.get(product_id)?;
        quote(product.unit_price, quantity, self.delivery_charge)
    }
}

/// `unit_price * quantity + delivery_charge` in checked integer arithmetic
pub fn quote(unit_price: u64, quantity: u32, delivery_charge: u64) -> Option<Quote> {
    let subtotal = unit_price.checked_mul(u64::from(quantity))?;
    let total = subtotal.checked_add(delivery_charge)?;
    Some(Quote {
        subtotal,
        delivery_charge,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_listed_in_id_order() {
        let catalog = Catalog::new(
            vec![
                Product::new(3, "C", 30),
                Product::new(1, "A", 10),
                Product::new(2, "B", 20),
            ],
            5,
        );
        let ids: Vec<u32> = catalog.list_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_price_for_adds_delivery_once() {
        let catalog = Catalog::default();
        let quote = catalog.price_for(2, 4).unwrap();
        assert_eq!(quote.subtotal, 350 * 4);
        assert_eq!(quote.delivery_charge, DEFAULT_DELIVERY_CHARGE);
        assert_eq!(quote.total, 350 * 4 + DEFAULT_DELIVERY_CHARGE);
    }

    #[test]
    fn test_price_for_unknown_product() {
        let catalog = Catalog::default();
        assert!(catalog.price_for(0, 1).is_none());
        assert!(catalog.price_for(99, 1).is_none());
    }

    #[test]
    fn test_quote_overflow_is_rejected() {
        assert!(quote(u64::MAX, 2, 0).is_none());
        assert!(quote(u64::MAX, 1, 1).is_none());
    }

    #[test]
    fn test_custom_delivery_charge() {
        let catalog = Catalog::with_delivery_charge(0);
        assert_eq!(catalog.price_for(1, 3).unwrap().total, 180 * 3);
    }
}
