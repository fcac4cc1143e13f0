//! Unit conversion module.
//!
//! This crate contains the measurement-unit model and the pure conversion
//! function used to normalize quantities between compatible units (no IO,
//! no storage).

pub mod conversion;

pub use conversion::{Unit, UnitCategory, UnitSpec, convert};
