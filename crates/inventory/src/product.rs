use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brigade_core::{Actor, AggregateId, AggregateRoot, DomainError, DomainResult};
use brigade_units::Unit;

use crate::movement::MovementKind;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Product.
///
/// The `stock` field is the authoritative quantity, always expressed in
/// `stock_unit` and never negative. It is mutated only through the ledger
/// operations below; each successful mutation bumps `version` so the
/// persistence boundary can reject stale read-modify-write cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    stock: Decimal,
    stock_unit: Unit,
    unit_price: Decimal,
    alert_threshold: Decimal,
    expiry_date: Option<NaiveDate>,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Snapshot returned by exit operations: the new quantity and whether it now
/// sits strictly below the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub quantity: Decimal,
    pub under_threshold: bool,
}

impl Product {
    /// Validate a registration command and build the product at version 1.
    ///
    /// The starting stock is set here; the ledger records the matching entry
    /// movement separately so the quantity is not counted twice.
    pub fn register(cmd: &RegisterProduct) -> DomainResult<Self> {
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.initial_stock.is_sign_negative() {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }
        if cmd.unit_price.is_sign_negative() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if cmd.alert_threshold.is_sign_negative() {
            return Err(DomainError::validation("alert threshold cannot be negative"));
        }

        Ok(Self {
            id: cmd.product_id,
            name: cmd.name.trim().to_string(),
            stock: cmd.initial_stock,
            stock_unit: cmd.stock_unit,
            unit_price: cmd.unit_price,
            alert_threshold: cmd.alert_threshold,
            expiry_date: cmd.expiry_date,
            deleted: false,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> Decimal {
        self.stock
    }

    pub fn stock_unit(&self) -> Unit {
        self.stock_unit
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn alert_threshold(&self) -> Decimal {
        self.alert_threshold
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Strict comparison: stock equal to the threshold is not in alert.
    pub fn is_under_threshold(&self) -> bool {
        self.stock < self.alert_threshold
    }

    pub fn level(&self) -> StockLevel {
        StockLevel {
            quantity: self.stock,
            under_threshold: self.is_under_threshold(),
        }
    }

    /// Add stock. Quantity must be strictly positive; there is no upper bound.
    pub fn receive(&mut self, quantity: Decimal, at: DateTime<Utc>) -> DomainResult<Decimal> {
        ensure_positive(quantity)?;
        self.stock += quantity;
        self.touch(at);
        Ok(self.stock)
    }

    /// Remove stock, already expressed in the product's stock unit.
    ///
    /// Fails with [`DomainError::InsufficientStock`] when more is requested
    /// than is available; the product is left untouched in that case.
    pub fn issue(&mut self, quantity: Decimal, at: DateTime<Utc>) -> DomainResult<StockLevel> {
        ensure_positive(quantity)?;
        if quantity > self.stock {
            return Err(DomainError::insufficient_stock(
                self.name.clone(),
                self.stock,
                quantity,
            ));
        }
        self.stock -= quantity;
        self.touch(at);
        Ok(self.level())
    }

    /// Apply a signed correction (inventory count, manual fix, expiry
    /// write-off). The non-negative floor still holds.
    pub fn adjust(&mut self, delta: Decimal, at: DateTime<Utc>) -> DomainResult<Decimal> {
        if delta.is_zero() {
            return Err(DomainError::validation("adjustment delta cannot be zero"));
        }
        let new_stock = self.stock + delta;
        if new_stock.is_sign_negative() {
            return Err(DomainError::insufficient_stock(
                self.name.clone(),
                self.stock,
                -delta,
            ));
        }
        self.stock = new_stock;
        self.touch(at);
        Ok(self.stock)
    }

    /// Logical removal. Movement history keeps referencing the product, so
    /// it is never physically erased.
    pub fn retire(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.deleted {
            return Err(DomainError::invalid_state("product is already retired"));
        }
        self.deleted = true;
        self.touch(at);
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
        self.version += 1;
    }
}

fn ensure_positive(quantity: Decimal) -> DomainResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "quantity must be strictly positive (got {quantity})"
        )));
    }
    Ok(())
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub name: String,
    pub initial_stock: Decimal,
    pub stock_unit: Unit,
    pub unit_price: Decimal,
    pub alert_threshold: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: StockEntry (manual goods-in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: StockExit (manual goods-out or menu consumption).
///
/// `unit` is the unit the caller expressed the quantity in; when present and
/// different from the product's stock unit the ledger converts before
/// mutating, but records the movement with the original request values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockExit {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit: Option<Unit>,
    pub reason: String,
    pub menu_id: Option<AggregateId>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: StockAdjustment (inventory count, manual correction, expiry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub delta: Decimal,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: RetireProduct (soft delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetireProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn test_actor() -> Actor {
        Actor::new("chef").unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn register_cmd(stock: &str, threshold: &str) -> RegisterProduct {
        RegisterProduct {
            product_id: ProductId::new(AggregateId::new()),
            name: "Butter".to_string(),
            initial_stock: dec(stock),
            stock_unit: Unit::Kilogram,
            unit_price: dec("7.20"),
            alert_threshold: dec(threshold),
            expiry_date: None,
            occurred_at: test_time(),
            actor: test_actor(),
        }
    }

    #[test]
    fn register_builds_product_at_version_one() {
        let product = Product::register(&register_cmd("10", "2")).unwrap();
        assert_eq!(product.stock(), dec("10"));
        assert_eq!(product.version(), 1);
        assert!(!product.is_deleted());
        assert!(!product.is_under_threshold());
    }

    #[test]
    fn register_rejects_blank_name_and_negative_fields() {
        let mut cmd = register_cmd("10", "2");
        cmd.name = "   ".to_string();
        assert!(matches!(Product::register(&cmd), Err(DomainError::Validation(_))));

        let mut cmd = register_cmd("10", "2");
        cmd.initial_stock = dec("-1");
        assert!(matches!(Product::register(&cmd), Err(DomainError::Validation(_))));

        let mut cmd = register_cmd("10", "2");
        cmd.unit_price = dec("-0.01");
        assert!(matches!(Product::register(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn issue_and_receive_restore_the_original_stock() {
        let mut product = Product::register(&register_cmd("10", "2")).unwrap();
        let level = product.issue(dec("3.5"), test_time()).unwrap();
        assert_eq!(level.quantity, dec("6.5"));
        let restored = product.receive(dec("3.5"), test_time()).unwrap();
        assert_eq!(restored, dec("10"));
    }

    #[test]
    fn issue_beyond_stock_fails_and_leaves_stock_unchanged() {
        let mut product = Product::register(&register_cmd("2", "1")).unwrap();
        let before_version = product.version();
        let err = product.issue(dec("2.5"), test_time()).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                product: name,
                available,
                requested,
            } => {
                assert_eq!(name, "Butter");
                assert_eq!(available, dec("2"));
                assert_eq!(requested, dec("2.5"));
            }
            e => panic!("expected InsufficientStock, got: {e:?}"),
        }
        assert_eq!(product.stock(), dec("2"));
        assert_eq!(product.version(), before_version);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let mut product = Product::register(&register_cmd("10", "2")).unwrap();

        let level = product.issue(dec("3"), test_time()).unwrap();
        assert_eq!(level.quantity, dec("7"));
        assert!(!level.under_threshold);

        let level = product.issue(dec("6"), test_time()).unwrap();
        assert_eq!(level.quantity, dec("1"));
        assert!(level.under_threshold);

        // Back to exactly the threshold: not in alert.
        product.receive(dec("1"), test_time()).unwrap();
        assert_eq!(product.stock(), product.alert_threshold());
        assert!(!product.is_under_threshold());
    }

    #[test]
    fn zero_and_negative_quantities_are_validation_errors() {
        let mut product = Product::register(&register_cmd("10", "2")).unwrap();
        assert!(matches!(
            product.issue(Decimal::ZERO, test_time()),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            product.receive(dec("-1"), test_time()),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            product.adjust(Decimal::ZERO, test_time()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn adjust_respects_the_non_negative_floor() {
        let mut product = Product::register(&register_cmd("5", "1")).unwrap();
        assert_eq!(product.adjust(dec("-2"), test_time()).unwrap(), dec("3"));
        assert!(matches!(
            product.adjust(dec("-4"), test_time()),
            Err(DomainError::InsufficientStock { .. })
        ));
        assert_eq!(product.stock(), dec("3"));
    }

    #[test]
    fn retire_is_terminal() {
        let mut product = Product::register(&register_cmd("5", "1")).unwrap();
        product.retire(test_time()).unwrap();
        assert!(product.is_deleted());
        assert!(matches!(
            product.retire(test_time()),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn version_increments_once_per_mutation() {
        let mut product = Product::register(&register_cmd("10", "2")).unwrap();
        assert_eq!(product.version(), 1);
        product.receive(dec("1"), test_time()).unwrap();
        assert_eq!(product.version(), 2);
        product.issue(dec("1"), test_time()).unwrap();
        assert_eq!(product.version(), 3);
        product.retire(test_time()).unwrap();
        assert_eq!(product.version(), 4);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                max_global_rejects: 100_000,
                ..ProptestConfig::default()
            })]

            /// Property: issue followed by receive of the same quantity is a
            /// no-op on the stock value.
            #[test]
            fn issue_then_receive_round_trips(
                stock in 1i64..1_000_000,
                taken in 1i64..1_000_000,
            ) {
                prop_assume!(taken <= stock);
                let mut cmd = register_cmd("0", "0");
                cmd.initial_stock = Decimal::new(stock, 3);
                let mut product = Product::register(&cmd).unwrap();

                let q = Decimal::new(taken, 3);
                product.issue(q, test_time()).unwrap();
                product.receive(q, test_time()).unwrap();
                prop_assert_eq!(product.stock(), Decimal::new(stock, 3));
            }

            /// Property: stock never goes negative, whatever sequence of
            /// issues is attempted.
            #[test]
            fn stock_never_goes_negative(
                stock in 0i64..100_000,
                takes in proptest::collection::vec(1i64..50_000, 1..20),
            ) {
                let mut cmd = register_cmd("0", "0");
                cmd.initial_stock = Decimal::new(stock, 3);
                let mut product = Product::register(&cmd).unwrap();

                for t in takes {
                    let _ = product.issue(Decimal::new(t, 3), test_time());
                    prop_assert!(!product.stock().is_sign_negative());
                }
            }
        }
    }
}
