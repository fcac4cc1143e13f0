//! Service-level error model.

use rust_decimal::Decimal;
use thiserror::Error;

use brigade_core::DomainError;

use crate::store::StoreError;

/// Error surfaced by the application services.
///
/// Domain failures keep their taxonomy; store failures are folded in where
/// they have a domain meaning (a stale version is a conflict, a missing
/// record is not-found) and wrapped otherwise. Nothing is swallowed or
/// retried here: every failure reaches the caller as a typed value and
/// leaves all state as it was before the call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A value failed validation (blank reason, non-positive quantity, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced product or menu does not exist.
    #[error("not found")]
    NotFound,

    /// The requested quantity exceeds the available stock.
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

    /// Optimistic concurrency failure (stale version, duplicate insert).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage backend failed for a non-domain reason.
    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::InsufficientStock {
                product,
                available,
                requested,
            } => ServiceError::InsufficientStock {
                product,
                available,
                requested,
            },
            DomainError::IncompatibleUnits { from, to } => {
                ServiceError::IncompatibleUnits { from, to }
            }
            DomainError::InvalidState(msg) => ServiceError::InvalidState(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => ServiceError::Conflict(msg),
            StoreError::Duplicate(msg) => ServiceError::Conflict(msg),
            StoreError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}
