//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, state-machine rejections). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank reason, negative quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A stock exit asked for more than the product currently holds.
    #[error("insufficient stock for '{product}': available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A conversion was attempted across measurement categories.
    #[error("incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    /// A lifecycle operation was attempted in a status that forbids it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(
        product: impl Into<String>,
        available: Decimal,
        requested: Decimal,
    ) -> Self {
        Self::InsufficientStock {
            product: product.into(),
            available,
            requested,
        }
    }

    pub fn incompatible_units(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::IncompatibleUnits {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
