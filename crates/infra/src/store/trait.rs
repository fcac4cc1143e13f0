use std::sync::Arc;

use thiserror::Error;

use brigade_core::ExpectedVersion;
use brigade_inventory::{Product, ProductId, StockMovement};
use brigade_menus::{Menu, MenuId};

/// Storage operation error.
///
/// These are **infrastructure errors** (stale versions, duplicate keys,
/// backend failures) as opposed to domain errors (validation, invariants).
/// The services map them onto the caller-facing taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("record already exists: {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    #[error("invalid commit: {0}")]
    InvalidCommit(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// One line of an atomic stock commit: the updated product, the version the
/// store must still hold for it, and the movement describing the change.
#[derive(Debug, Clone)]
pub struct StockCommitLine {
    pub product: Product,
    pub expected: ExpectedVersion,
    pub movement: StockMovement,
}

/// Key-addressed storage for products and their movement ledger.
///
/// ## Commit semantics
///
/// `commit()` is the only write path for stock changes. Implementations
/// must:
/// - check every line's `ExpectedVersion` against the stored product before
///   touching anything (per-product serialization of read-modify-write
///   cycles: two concurrent decrements based on the same stale quantity
///   must not both succeed);
/// - apply the whole batch or none of it (a multi-product menu decrement is
///   a single logical unit);
/// - append each line's movement in the same unit of work as its product
///   update, so the resulting-quantity chain always reconciles with the
///   stored product.
///
/// ## Soft deletion
///
/// Retired products stay loadable by id (movement history references them);
/// `list_active()` filters them out at the query boundary.
pub trait ProductStore: Send + Sync {
    /// Insert a newly registered product, with its initial entry movement
    /// when the starting stock is non-zero. Fails with `Duplicate` if the id
    /// is already taken.
    fn insert(
        &self,
        product: Product,
        initial_movement: Option<StockMovement>,
    ) -> Result<(), StoreError>;

    fn load(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products not soft-deleted.
    fn list_active(&self) -> Result<Vec<Product>, StoreError>;

    /// Save a product without a movement (soft delete only; every stock
    /// change goes through `commit`).
    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// Apply a batch of product updates + movement appends atomically.
    fn commit(&self, lines: Vec<StockCommitLine>) -> Result<(), StoreError>;

    /// Movement ledger for a product, in append order.
    fn movements_for(&self, id: ProductId) -> Result<Vec<StockMovement>, StoreError>;
}

/// Key-addressed storage for menus (each menu owns its ingredient lines, so
/// they travel with the record).
pub trait MenuStore: Send + Sync {
    /// Fails with `Duplicate` if the id is already taken.
    fn insert(&self, menu: Menu) -> Result<(), StoreError>;

    fn load(&self, id: MenuId) -> Result<Option<Menu>, StoreError>;

    fn list(&self) -> Result<Vec<Menu>, StoreError>;

    /// Replace the stored menu after an `ExpectedVersion` check.
    fn save(&self, menu: Menu, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// Physical removal (draft menus only; the services enforce that).
    fn delete(&self, id: MenuId) -> Result<(), StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn insert(
        &self,
        product: Product,
        initial_movement: Option<StockMovement>,
    ) -> Result<(), StoreError> {
        (**self).insert(product, initial_movement)
    }

    fn load(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).load(id)
    }

    fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_active()
    }

    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(product, expected)
    }

    fn commit(&self, lines: Vec<StockCommitLine>) -> Result<(), StoreError> {
        (**self).commit(lines)
    }

    fn movements_for(&self, id: ProductId) -> Result<Vec<StockMovement>, StoreError> {
        (**self).movements_for(id)
    }
}

impl<S> MenuStore for Arc<S>
where
    S: MenuStore + ?Sized,
{
    fn insert(&self, menu: Menu) -> Result<(), StoreError> {
        (**self).insert(menu)
    }

    fn load(&self, id: MenuId) -> Result<Option<Menu>, StoreError> {
        (**self).load(id)
    }

    fn list(&self) -> Result<Vec<Menu>, StoreError> {
        (**self).list()
    }

    fn save(&self, menu: Menu, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(menu, expected)
    }

    fn delete(&self, id: MenuId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
