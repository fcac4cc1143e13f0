use std::collections::HashMap;
use std::sync::RwLock;

use brigade_core::{AggregateRoot, ExpectedVersion};
use brigade_inventory::{Product, ProductId, StockMovement};
use brigade_menus::{Menu, MenuId};

use super::r#trait::{MenuStore, ProductStore, StockCommitLine, StoreError};

/// In-memory product + movement store.
///
/// Intended for tests/dev. Not optimized for performance. A single lock
/// covers products and movements, so a `commit` batch is observed either in
/// full or not at all.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<Shelf>,
}

#[derive(Debug, Default)]
struct Shelf {
    products: HashMap<ProductId, Product>,
    movements: HashMap<ProductId, Vec<StockMovement>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for InMemoryProductStore {
    fn insert(
        &self,
        product: Product,
        initial_movement: Option<StockMovement>,
    ) -> Result<(), StoreError> {
        let mut shelf = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let id = product.id_typed();
        if shelf.products.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("product {id}")));
        }

        shelf.products.insert(id, product);
        let ledger = shelf.movements.entry(id).or_default();
        if let Some(movement) = initial_movement {
            ledger.push(movement);
        }
        Ok(())
    }

    fn load(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let shelf = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(shelf.products.get(&id).cloned())
    }

    fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let shelf = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(shelf
            .products
            .values()
            .filter(|p| !p.is_deleted())
            .cloned()
            .collect())
    }

    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut shelf = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let id = product.id_typed();
        let current = shelf.products.get(&id).ok_or(StoreError::NotFound)?;
        if !expected.matches(current.version()) {
            return Err(StoreError::Concurrency(format!(
                "product {id}: expected {expected:?}, found {}",
                current.version()
            )));
        }
        shelf.products.insert(id, product);
        Ok(())
    }

    fn commit(&self, lines: Vec<StockCommitLine>) -> Result<(), StoreError> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut shelf = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        // Validate the whole batch before touching anything.
        for (idx, line) in lines.iter().enumerate() {
            let id = line.product.id_typed();
            if line.movement.product_id != id {
                return Err(StoreError::InvalidCommit(format!(
                    "movement targets a different product (index {idx})"
                )));
            }
            if lines[..idx].iter().any(|l| l.product.id_typed() == id) {
                return Err(StoreError::InvalidCommit(format!(
                    "batch contains product {id} twice (index {idx})"
                )));
            }
            let current = shelf.products.get(&id).ok_or(StoreError::NotFound)?;
            if !line.expected.matches(current.version()) {
                return Err(StoreError::Concurrency(format!(
                    "product {id}: expected {:?}, found {}",
                    line.expected,
                    current.version()
                )));
            }
        }

        // All checks passed: apply product updates and append movements.
        for line in lines {
            let id = line.product.id_typed();
            shelf.products.insert(id, line.product);
            shelf.movements.entry(id).or_default().push(line.movement);
        }
        Ok(())
    }

    fn movements_for(&self, id: ProductId) -> Result<Vec<StockMovement>, StoreError> {
        let shelf = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(shelf.movements.get(&id).cloned().unwrap_or_default())
    }
}

/// In-memory menu store.
#[derive(Debug, Default)]
pub struct InMemoryMenuStore {
    inner: RwLock<HashMap<MenuId, Menu>>,
}

impl InMemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MenuStore for InMemoryMenuStore {
    fn insert(&self, menu: Menu) -> Result<(), StoreError> {
        let mut menus = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let id = menu.id_typed();
        if menus.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("menu {id}")));
        }
        menus.insert(id, menu);
        Ok(())
    }

    fn load(&self, id: MenuId) -> Result<Option<Menu>, StoreError> {
        let menus = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(menus.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Menu>, StoreError> {
        let menus = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(menus.values().cloned().collect())
    }

    fn save(&self, menu: Menu, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut menus = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let id = menu.id_typed();
        let current = menus.get(&id).ok_or(StoreError::NotFound)?;
        if !expected.matches(current.version()) {
            return Err(StoreError::Concurrency(format!(
                "menu {id}: expected {expected:?}, found {}",
                current.version()
            )));
        }
        menus.insert(id, menu);
        Ok(())
    }

    fn delete(&self, id: MenuId) -> Result<(), StoreError> {
        let mut menus = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        menus.remove(&id).ok_or(StoreError::NotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_core::{Actor, AggregateId};
    use brigade_inventory::{MovementId, RegisterProduct};
    use brigade_units::Unit;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn test_product(stock: &str) -> Product {
        Product::register(&RegisterProduct {
            product_id: ProductId::new(AggregateId::new()),
            name: "Cream".to_string(),
            initial_stock: dec(stock),
            stock_unit: Unit::Litre,
            unit_price: dec("2.10"),
            alert_threshold: dec("1"),
            expiry_date: None,
            occurred_at: Utc::now(),
            actor: Actor::new("chef").unwrap(),
        })
        .unwrap()
    }

    fn exit_line(product: &mut Product, quantity: &str) -> StockCommitLine {
        let expected = ExpectedVersion::Exact(product.version());
        product.issue(dec(quantity), Utc::now()).unwrap();
        let movement = StockMovement::exit(
            MovementId::new(AggregateId::new()),
            product,
            dec(quantity),
            product.stock_unit(),
            None,
            "test exit",
            Utc::now(),
            Actor::new("chef").unwrap(),
        );
        StockCommitLine {
            product: product.clone(),
            expected,
            movement,
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let store = InMemoryProductStore::new();
        let product = test_product("5");
        store.insert(product.clone(), None).unwrap();
        assert!(matches!(
            store.insert(product, None),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn commit_applies_all_lines() {
        let store = InMemoryProductStore::new();
        let mut a = test_product("5");
        let mut b = test_product("3");
        store.insert(a.clone(), None).unwrap();
        store.insert(b.clone(), None).unwrap();

        let lines = vec![exit_line(&mut a, "2"), exit_line(&mut b, "1")];
        store.commit(lines).unwrap();

        assert_eq!(store.load(a.id_typed()).unwrap().unwrap().stock(), dec("3"));
        assert_eq!(store.load(b.id_typed()).unwrap().unwrap().stock(), dec("2"));
        assert_eq!(store.movements_for(a.id_typed()).unwrap().len(), 1);
    }

    #[test]
    fn commit_with_one_stale_line_applies_nothing() {
        let store = InMemoryProductStore::new();
        let mut a = test_product("5");
        let mut b = test_product("3");
        store.insert(a.clone(), None).unwrap();
        store.insert(b.clone(), None).unwrap();

        let good = exit_line(&mut a, "2");
        let mut stale = exit_line(&mut b, "1");
        stale.expected = ExpectedVersion::Exact(99);

        let err = store.commit(vec![good, stale]).unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));

        // Neither product moved, no movement was appended.
        assert_eq!(store.load(a.id_typed()).unwrap().unwrap().stock(), dec("5"));
        assert_eq!(store.load(b.id_typed()).unwrap().unwrap().stock(), dec("3"));
        assert!(store.movements_for(a.id_typed()).unwrap().is_empty());
        assert!(store.movements_for(b.id_typed()).unwrap().is_empty());
    }

    #[test]
    fn commit_rejects_a_product_listed_twice() {
        let store = InMemoryProductStore::new();
        let mut a = test_product("5");
        store.insert(a.clone(), None).unwrap();

        let first = exit_line(&mut a, "1");
        let second = exit_line(&mut a, "1");
        let err = store.commit(vec![first, second]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCommit(_)));
    }

    #[test]
    fn list_active_filters_retired_products() {
        let store = InMemoryProductStore::new();
        let mut a = test_product("5");
        let b = test_product("3");
        store.insert(a.clone(), None).unwrap();
        store.insert(b.clone(), None).unwrap();

        let expected = ExpectedVersion::Exact(a.version());
        a.retire(Utc::now()).unwrap();
        store.save(a.clone(), expected).unwrap();

        let active = store.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id_typed(), b.id_typed());

        // Still loadable by id for movement history.
        assert!(store.load(a.id_typed()).unwrap().is_some());
    }
}
