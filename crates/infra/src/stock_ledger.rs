//! Stock ledger service (application-level orchestration).
//!
//! Every operation follows the same pipeline: load the product, decide
//! through the pure domain methods, then persist the updated product and the
//! movement describing the change in one atomic store commit guarded by an
//! optimistic version check. A failed decision or a stale version leaves the
//! store untouched; no movement is ever written for a rejected operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use brigade_core::{Actor, AggregateId, AggregateRoot, ExpectedVersion};
use brigade_inventory::{
    MovementId, MovementKind, Product, ProductId, RegisterProduct, RetireProduct, StockAdjustment,
    StockEntry, StockExit, StockLevel, StockMovement,
};
use brigade_units::convert;

use crate::error::ServiceError;
use crate::store::{ProductStore, StockCommitLine};

/// One product's share of a multi-product operation, already expressed in
/// the product's stock unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDemand {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

/// Application service owning all stock mutations.
#[derive(Debug)]
pub struct StockLedger<S> {
    store: S,
}

impl<S> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> StockLedger<S>
where
    S: ProductStore,
{
    /// Register a product. The starting quantity is recorded as an entry
    /// movement without mutating the (already-set) stock field, so it is
    /// not counted twice.
    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id, name = %cmd.name))]
    pub fn register(&self, cmd: RegisterProduct) -> Result<Product, ServiceError> {
        let product = Product::register(&cmd)?;

        let initial_movement = if product.stock() > Decimal::ZERO {
            Some(StockMovement::entry(
                MovementId::new(AggregateId::new()),
                &product,
                product.stock(),
                "initial stock",
                cmd.occurred_at,
                cmd.actor,
            ))
        } else {
            None
        };

        self.store.insert(product.clone(), initial_movement)?;
        tracing::info!(stock = %product.stock(), unit = %product.stock_unit(), "product registered");
        Ok(product)
    }

    /// Manual goods-in. Always succeeds for a positive quantity (no upper
    /// bound); returns the new quantity.
    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub fn entry(&self, cmd: StockEntry) -> Result<Decimal, ServiceError> {
        ensure_reason(&cmd.reason)?;
        let mut product = self.load_product(cmd.product_id)?;
        let expected = ExpectedVersion::Exact(product.version());

        let new_quantity = product.receive(cmd.quantity, cmd.occurred_at)?;
        let movement = StockMovement::entry(
            MovementId::new(AggregateId::new()),
            &product,
            cmd.quantity,
            cmd.reason,
            cmd.occurred_at,
            cmd.actor,
        );

        self.store.commit(vec![StockCommitLine {
            product,
            expected,
            movement,
        }])?;
        Ok(new_quantity)
    }

    /// Goods-out. When the command names a unit other than the product's
    /// stock unit, the quantity is converted before the stock check, but the
    /// movement keeps the original request values: the audit trail shows
    /// what the caller actually asked for, while `resulting_stock` stays in
    /// the stock unit.
    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub fn exit(&self, cmd: StockExit) -> Result<StockLevel, ServiceError> {
        ensure_reason(&cmd.reason)?;
        let mut product = self.load_product(cmd.product_id)?;
        let expected = ExpectedVersion::Exact(product.version());

        let request_unit = cmd.unit.unwrap_or_else(|| product.stock_unit());
        let consumed = convert(cmd.quantity, request_unit, product.stock_unit())?;

        let level = product.issue(consumed, cmd.occurred_at)?;
        if level.under_threshold {
            tracing::warn!(
                product = %product.name(),
                stock = %level.quantity,
                threshold = %product.alert_threshold(),
                "stock fell under the alert threshold"
            );
        }

        let movement = StockMovement::exit(
            MovementId::new(AggregateId::new()),
            &product,
            cmd.quantity,
            request_unit,
            cmd.menu_id,
            cmd.reason,
            cmd.occurred_at,
            cmd.actor,
        );

        self.store.commit(vec![StockCommitLine {
            product,
            expected,
            movement,
        }])?;
        Ok(level)
    }

    /// Signed correction recorded under one of the adjustment kinds
    /// (inventory count, manual fix, expiry write-off).
    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id, kind = ?cmd.kind))]
    pub fn adjust(&self, cmd: StockAdjustment) -> Result<Decimal, ServiceError> {
        ensure_reason(&cmd.reason)?;
        if !matches!(
            cmd.kind,
            MovementKind::InventoryAdjustment | MovementKind::ManualCorrection | MovementKind::Expiry
        ) {
            return Err(ServiceError::Validation(format!(
                "movement kind {:?} is not an adjustment",
                cmd.kind
            )));
        }

        let mut product = self.load_product(cmd.product_id)?;
        let expected = ExpectedVersion::Exact(product.version());

        let new_quantity = product.adjust(cmd.delta, cmd.occurred_at)?;
        let movement = StockMovement::adjustment(
            MovementId::new(AggregateId::new()),
            &product,
            cmd.kind,
            cmd.delta,
            cmd.reason,
            cmd.occurred_at,
            cmd.actor,
        );

        self.store.commit(vec![StockCommitLine {
            product,
            expected,
            movement,
        }])?;
        Ok(new_quantity)
    }

    /// Soft delete. No movement: the stock itself is untouched, and history
    /// keeps referencing the product.
    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id))]
    pub fn retire(&self, cmd: RetireProduct) -> Result<(), ServiceError> {
        let mut product = self.load_product(cmd.product_id)?;
        let expected = ExpectedVersion::Exact(product.version());
        product.retire(cmd.occurred_at)?;
        self.store.save(product, expected)?;
        Ok(())
    }

    /// Load a product; soft-deleted products behave as absent.
    pub fn product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.load_product(id)
    }

    pub fn products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.list_active()?)
    }

    /// Movement ledger for a product, in append order.
    pub fn movements(&self, id: ProductId) -> Result<Vec<StockMovement>, ServiceError> {
        self.load_product(id)?;
        Ok(self.store.movements_for(id)?)
    }

    /// Decrement many products as one logical unit (all succeed or none
    /// take effect). Two phases: every demand is validated against a
    /// freshly-loaded product first, then the whole batch goes to the store
    /// as a single atomic commit with per-product version checks.
    #[instrument(skip(self, demands, actor), fields(lines = demands.len(), menu_id = ?menu_id))]
    pub fn consume_batch(
        &self,
        demands: &[StockDemand],
        reason: &str,
        menu_id: Option<AggregateId>,
        occurred_at: DateTime<Utc>,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        ensure_reason(reason)?;

        let mut lines = Vec::with_capacity(demands.len());
        for demand in demands {
            let mut product = self.load_product(demand.product_id)?;
            let expected = ExpectedVersion::Exact(product.version());

            let level = product.issue(demand.quantity, occurred_at)?;
            if level.under_threshold {
                tracing::warn!(
                    product = %product.name(),
                    stock = %level.quantity,
                    threshold = %product.alert_threshold(),
                    "stock fell under the alert threshold"
                );
            }

            let movement = StockMovement::exit(
                MovementId::new(AggregateId::new()),
                &product,
                demand.quantity,
                product.stock_unit(),
                menu_id,
                reason,
                occurred_at,
                actor.clone(),
            );
            lines.push(StockCommitLine {
                product,
                expected,
                movement,
            });
        }

        self.store.commit(lines)?;
        Ok(())
    }

    /// Inverse of [`consume_batch`](Self::consume_batch): add each demand
    /// back as an entry movement, atomically.
    #[instrument(skip(self, demands, actor), fields(lines = demands.len(), menu_id = ?menu_id))]
    pub fn restore_batch(
        &self,
        demands: &[StockDemand],
        reason: &str,
        menu_id: Option<AggregateId>,
        occurred_at: DateTime<Utc>,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        ensure_reason(reason)?;

        let mut lines = Vec::with_capacity(demands.len());
        for demand in demands {
            let mut product = self.load_product(demand.product_id)?;
            let expected = ExpectedVersion::Exact(product.version());

            product.receive(demand.quantity, occurred_at)?;
            let mut movement = StockMovement::entry(
                MovementId::new(AggregateId::new()),
                &product,
                demand.quantity,
                reason,
                occurred_at,
                actor.clone(),
            );
            movement.menu_id = menu_id;
            lines.push(StockCommitLine {
                product,
                expected,
                movement,
            });
        }

        self.store.commit(lines)?;
        Ok(())
    }

    fn load_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        let product = self.store.load(id)?.ok_or(ServiceError::NotFound)?;
        if product.is_deleted() {
            return Err(ServiceError::NotFound);
        }
        Ok(product)
    }
}

fn ensure_reason(reason: &str) -> Result<(), ServiceError> {
    if reason.trim().is_empty() {
        return Err(ServiceError::Validation("reason cannot be blank".to_string()));
    }
    Ok(())
}
