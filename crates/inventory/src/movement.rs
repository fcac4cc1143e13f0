use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brigade_core::{Actor, AggregateId};
use brigade_units::Unit;

use crate::product::{Product, ProductId};

/// Movement identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(pub AggregateId);

impl MovementId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What caused a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
    InventoryAdjustment,
    ManualCorrection,
    Expiry,
}

/// An immutable ledger record describing one stock change.
///
/// `quantity` is signed (negative for exits) and expressed in the unit of
/// the original request (not necessarily the product's stock unit), so the
/// audit trail preserves what the caller actually asked for.
/// `resulting_stock` is always in the product's stock unit. Once written a
/// movement is never mutated or deleted; the chain of `resulting_stock`
/// values for a product, in order, always reconciles with the product's
/// current quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub movement_id: MovementId,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub unit: Unit,
    pub resulting_stock: Decimal,
    pub reason: String,
    pub menu_id: Option<AggregateId>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

impl StockMovement {
    /// Entry movement: positive quantity in the product's stock unit.
    ///
    /// `resulting_stock` is read from the product, so build the movement
    /// after the mutation (or, for registration, from the starting stock).
    pub fn entry(
        movement_id: MovementId,
        product: &Product,
        quantity: Decimal,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
        actor: Actor,
    ) -> Self {
        Self {
            movement_id,
            product_id: product.id_typed(),
            kind: MovementKind::Entry,
            quantity,
            unit: product.stock_unit(),
            resulting_stock: product.stock(),
            reason: reason.into(),
            menu_id: None,
            occurred_at,
            actor,
        }
    }

    /// Exit movement: `requested` is the positive quantity as the caller
    /// expressed it, in `request_unit`; the stored quantity is negated.
    pub fn exit(
        movement_id: MovementId,
        product: &Product,
        requested: Decimal,
        request_unit: Unit,
        menu_id: Option<AggregateId>,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
        actor: Actor,
    ) -> Self {
        Self {
            movement_id,
            product_id: product.id_typed(),
            kind: MovementKind::Exit,
            quantity: -requested,
            unit: request_unit,
            resulting_stock: product.stock(),
            reason: reason.into(),
            menu_id,
            occurred_at,
            actor,
        }
    }

    /// Correction movement: signed delta in the product's stock unit, under
    /// one of the adjustment kinds.
    pub fn adjustment(
        movement_id: MovementId,
        product: &Product,
        kind: MovementKind,
        delta: Decimal,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
        actor: Actor,
    ) -> Self {
        Self {
            movement_id,
            product_id: product.id_typed(),
            kind,
            quantity: delta,
            unit: product.stock_unit(),
            resulting_stock: product.stock(),
            reason: reason.into(),
            menu_id: None,
            occurred_at,
            actor,
        }
    }

    pub fn is_outbound(&self) -> bool {
        self.quantity.is_sign_negative()
    }
}
