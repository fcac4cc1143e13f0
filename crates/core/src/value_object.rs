//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two value
/// objects with the same attributes are the same value. Measurement units
/// and quantities are the canonical examples in this domain; entities like
/// products and menus are not (they carry identity).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
