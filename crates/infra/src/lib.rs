//! Infrastructure layer: storage adapters and application services.
//!
//! The domain crates stay pure; everything that loads, persists or
//! orchestrates across aggregates lives here. Storage is consumed through
//! the narrow [`store`] traits (the in-memory implementations serve tests,
//! development and the demo; a durable backend plugs in behind the same
//! traits without touching the services).

pub mod error;
pub mod menu_service;
pub mod stock_ledger;
pub mod store;


pub use error::ServiceError;
pub use menu_service::MenuService;
pub use stock_ledger::{StockDemand, StockLedger};
pub use store::{
    InMemoryMenuStore, InMemoryProductStore, MenuStore, ProductStore, StockCommitLine, StoreError,
};
