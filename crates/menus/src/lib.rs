//! Menu domain module.
//!
//! A menu reserves named quantities of products and is confirmed, prepared
//! or cancelled through a small state machine. This crate holds the pure
//! domain logic (ownership of ingredient lines, cached costs, lifecycle
//! guards); the multi-product stock coordination lives in the application
//! services, which drive the inventory ledger.

pub mod menu;

pub use menu::{
    AddIngredient, CancelMenu, ConfirmMenu, CreateMenu, DeleteMenu, IngredientId, MarkPrepared,
    Menu, MenuId, MenuIngredient, MenuStatus, RemoveIngredient, UpdateMenu,
};
