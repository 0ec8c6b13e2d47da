//! Client-side cart store.
//!
//! # Design
//!
//! The cart is an explicit store object constructed with its own file path;
//! there is no ambient global state. It holds only `product_id → quantity`;
//! prices and names are intentionally **not** stored and are resolved
//! against the live catalog at render time, so a price change is always
//! reflected before checkout.
//!
//! Every mutation persists synchronously. The file is named by a versioned
//! store name: a cart schema change is rolled out by bumping the version in
//! [`CART_STORE_NAME`], which orphans the old file. Old incompatible data
//! is discarded, never migrated. For the same reason a missing or unreadable
//! file loads as an empty cart.
//!
//! Invariant: every stored quantity is ≥ 1. Decreasing a quantity-1 item
//! removes it; nothing is ever stored at zero.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use blc_schemas::{NewOrderItem, Product};

/// Versioned store file name. Bump the version to force a schema reset.
pub const CART_STORE_NAME: &str = "balcao-cart-v2.json";

// ---------------------------------------------------------------------------
// CartItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Direction for [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Increase,
    Decrease,
}

/// A cart item joined against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    /// Integer cents.
    pub unit_price: i64,
    pub quantity: u32,
    /// Integer cents: `unit_price * quantity`.
    pub line_total: i64,
}

// ---------------------------------------------------------------------------
// CartStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CartStore {
    path: PathBuf,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Open (or create) the cart persisted under `data_dir`.
    ///
    /// A missing, unreadable, or unparseable store file yields an empty
    /// cart. That is the schema-reset story, not an error.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("create cart dir failed: {}", data_dir.display()))?;
        let path = data_dir.join(CART_STORE_NAME);
        let items = load_items(&path);
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the cart badge number).
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Increment quantity if the product is present, else insert at 1.
    pub fn add(&mut self, product_id: &str) -> Result<()> {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem {
                product_id: product_id.to_string(),
                quantity: 1,
            }),
        }
        self.persist()
    }

    /// Remove the product entirely, whatever its quantity.
    pub fn remove(&mut self, product_id: &str) -> Result<()> {
        self.items.retain(|i| i.product_id != product_id);
        self.persist()
    }

    /// Step a quantity up or down. Decreasing a quantity-1 item removes it.
    /// Unknown product ids are a no-op (still persisted, harmless).
    pub fn update_quantity(&mut self, product_id: &str, change: QuantityChange) -> Result<()> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            match change {
                QuantityChange::Increase => item.quantity += 1,
                QuantityChange::Decrease if item.quantity > 1 => item.quantity -= 1,
                QuantityChange::Decrease => {
                    self.items.retain(|i| i.product_id != product_id);
                }
            }
        }
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persist()
    }

    // -----------------------------------------------------------------------
    // Catalog join
    // -----------------------------------------------------------------------

    /// Join cart items against the live catalog. Items whose product no
    /// longer exists are omitted: they stay in the stored cart but never
    /// reach a priced view or a checkout payload.
    pub fn resolve(&self, catalog: &[Product]) -> Vec<PricedLine> {
        self.items
            .iter()
            .filter_map(|item| {
                let product = catalog.iter().find(|p| p.id == item.product_id)?;
                Some(PricedLine {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    unit_price: product.price,
                    quantity: item.quantity,
                    line_total: product.price * i64::from(item.quantity),
                })
            })
            .collect()
    }

    /// Total of all resolvable lines, integer cents.
    pub fn total_cents(&self, catalog: &[Product]) -> i64 {
        self.resolve(catalog).iter().map(|l| l.line_total).sum()
    }

    /// Checkout line items, built from the resolved view so vanished
    /// products are never submitted.
    pub fn checkout_items(&self, catalog: &[Product]) -> Vec<NewOrderItem> {
        self.resolve(catalog)
            .into_iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.items).context("serialize cart failed")?;
        fs::write(&self.path, format!("{json}\n"))
            .with_context(|| format!("write cart failed: {}", self.path.display()))?;
        Ok(())
    }
}

/// Read items from disk, dropping anything that violates the quantity
/// invariant. Any read or parse failure yields an empty cart.
fn load_items(path: &Path) -> Vec<CartItem> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<CartItem>>(&raw) {
        Ok(items) => items.into_iter().filter(|i| i.quantity >= 1).collect(),
        Err(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Produto {id}"),
            description: String::new(),
            price,
            category: "Lanches".to_string(),
            image_url: None,
            stock: 10,
            is_active: true,
        }
    }

    fn open_cart(dir: &tempfile::TempDir) -> CartStore {
        CartStore::open(dir.path()).unwrap()
    }

    #[test]
    fn add_inserts_at_one_then_increments() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open_cart(&dir);
        cart.add("a").unwrap();
        cart.add("a").unwrap();
        cart.add("b").unwrap();
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn decrease_at_quantity_one_removes_the_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open_cart(&dir);
        cart.add("a").unwrap();
        cart.update_quantity("a", QuantityChange::Decrease).unwrap();
        assert!(cart.is_empty());
        assert!(!cart.items().iter().any(|i| i.product_id == "a"));
    }

    #[test]
    fn count_always_equals_sum_of_quantities_and_no_zero_quantities() {
        enum Op {
            Add(&'static str),
            Inc(&'static str),
            Dec(&'static str),
            Remove(&'static str),
        }
        use Op::*;

        let dir = tempfile::tempdir().unwrap();
        let mut cart = open_cart(&dir);

        // A mixed mutation sequence; the invariant must hold after each step.
        let steps = [
            Add("a"),
            Add("b"),
            Add("a"),
            Dec("a"),
            Inc("b"),
            Inc("missing"),
            Remove("a"),
            Dec("b"),
            Dec("b"),
            Add("c"),
        ];
        for step in steps {
            match step {
                Add(id) => cart.add(id).unwrap(),
                Inc(id) => cart.update_quantity(id, QuantityChange::Increase).unwrap(),
                Dec(id) => cart.update_quantity(id, QuantityChange::Decrease).unwrap(),
                Remove(id) => cart.remove(id).unwrap(),
            }
            let sum: u32 = cart.items().iter().map(|i| i.quantity).sum();
            assert_eq!(cart.count(), sum);
            assert!(cart.items().iter().all(|i| i.quantity >= 1));
        }
    }

    #[test]
    fn totals_join_against_the_live_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open_cart(&dir);
        cart.add("a").unwrap();
        cart.add("a").unwrap();
        cart.add("b").unwrap();

        let catalog = vec![product("a", 500), product("b", 1200)];
        assert_eq!(cart.total_cents(&catalog), 2200);

        let lines = cart.resolve(&catalog);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_total, 1000);
        assert_eq!(lines[1].name, "Produto b");
    }

    #[test]
    fn vanished_products_are_dropped_from_priced_views_and_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = open_cart(&dir);
        cart.add("a").unwrap();
        cart.add("gone").unwrap();

        let catalog = vec![product("a", 500)];
        assert_eq!(cart.total_cents(&catalog), 500);
        let items = cart.checkout_items(&catalog);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "a");
        // The stored cart still remembers the item.
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn cart_survives_reopen_from_the_same_path() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cart = open_cart(&dir);
            cart.add("a").unwrap();
            cart.add("a").unwrap();
        }
        let reopened = open_cart(&dir);
        assert_eq!(reopened.count(), 2);
        assert_eq!(reopened.items()[0].product_id, "a");
    }

    #[test]
    fn unreadable_store_file_resets_to_an_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CART_STORE_NAME), "not json at all").unwrap();
        let cart = open_cart(&dir);
        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_rows_are_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CART_STORE_NAME),
            r#"[{"product_id":"a","quantity":0},{"product_id":"b","quantity":2}]"#,
        )
        .unwrap();
        let cart = open_cart(&dir);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id, "b");
    }
}
