use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use brigade_core::{DomainError, DomainResult, ValueObject};

/// Number of decimal places a converted quantity is rounded to.
const QUANTITY_SCALE: u32 = 3;

/// Measurement category. Units only convert within the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Weight,
    Volume,
    Count,
}

/// Measurement unit a quantity can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Gram,
    Kilogram,
    Millilitre,
    Litre,
    Piece,
    Each,
}

/// Per-unit conversion record: the category the unit belongs to and the
/// factor that maps one of this unit into the category's base unit (gram for
/// weight, millilitre for volume). Count units all carry factor 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    pub category: UnitCategory,
    pub factor_to_base: Decimal,
}

impl ValueObject for UnitSpec {}

impl UnitSpec {
    fn new(category: UnitCategory, factor_to_base: i64) -> Self {
        Self {
            category,
            factor_to_base: Decimal::from(factor_to_base),
        }
    }
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Unit::Gram,
        Unit::Kilogram,
        Unit::Millilitre,
        Unit::Litre,
        Unit::Piece,
        Unit::Each,
    ];

    /// Lookup entry for this unit. Conversion is driven entirely by this
    /// table; adding a unit means adding one row here.
    pub fn spec(self) -> UnitSpec {
        match self {
            Unit::Gram => UnitSpec::new(UnitCategory::Weight, 1),
            Unit::Kilogram => UnitSpec::new(UnitCategory::Weight, 1_000),
            Unit::Millilitre => UnitSpec::new(UnitCategory::Volume, 1),
            Unit::Litre => UnitSpec::new(UnitCategory::Volume, 1_000),
            Unit::Piece => UnitSpec::new(UnitCategory::Count, 1),
            Unit::Each => UnitSpec::new(UnitCategory::Count, 1),
        }
    }

    pub fn category(self) -> UnitCategory {
        self.spec().category
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Gram => "gram",
            Unit::Kilogram => "kilogram",
            Unit::Millilitre => "millilitre",
            Unit::Litre => "litre",
            Unit::Piece => "piece",
            Unit::Each => "each",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert `quantity` from one unit to another.
///
/// Pure and stateless; safe to call concurrently.
///
/// - Same unit: returned unchanged.
/// - Count units: all equivalent, returned unchanged.
/// - Weight/volume: converted through the category base unit and rounded
///   half-up to three decimal places.
/// - Cross-category conversion fails with [`DomainError::IncompatibleUnits`]
///   naming both units; a negative quantity fails with a distinct
///   [`DomainError::Validation`].
pub fn convert(quantity: Decimal, from: Unit, to: Unit) -> DomainResult<Decimal> {
    if quantity.is_sign_negative() {
        return Err(DomainError::validation(format!(
            "quantity cannot be negative (got {quantity})"
        )));
    }

    if from == to {
        return Ok(quantity);
    }

    let from_spec = from.spec();
    let to_spec = to.spec();

    if from_spec.category != to_spec.category {
        return Err(DomainError::incompatible_units(from.name(), to.name()));
    }

    if from_spec.category == UnitCategory::Count {
        return Ok(quantity);
    }

    let in_base = quantity * from_spec.factor_to_base;
    let converted = in_base / to_spec.factor_to_base;
    Ok(converted.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
