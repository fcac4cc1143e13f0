//! Storage boundary: narrow persistence traits + in-memory implementations.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryMenuStore, InMemoryProductStore};
pub use r#trait::{MenuStore, ProductStore, StockCommitLine, StoreError};
