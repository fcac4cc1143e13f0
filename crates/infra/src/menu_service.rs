//! Menu service: ingredient coordination + lifecycle orchestration.
//!
//! The menu aggregate enforces its own guards (draft-only mutation,
//! duplicate lines, status transitions); this service adds everything that
//! needs the product side: unit conversion into the stock unit, the
//! sufficiency pre-check, cost caching from current prices, and the
//! all-or-nothing stock coordination on confirm/cancel. The status field is
//! written only after every stock operation for the transition has
//! completed; if that final write is rejected, the stock batch is undone by
//! the inverse batch before the failure is surfaced.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::instrument;

use brigade_core::{AggregateId, AggregateRoot, ExpectedVersion};
use brigade_menus::{
    AddIngredient, CancelMenu, ConfirmMenu, CreateMenu, DeleteMenu, IngredientId, MarkPrepared,
    Menu, MenuId, MenuIngredient, MenuStatus, RemoveIngredient, UpdateMenu,
};
use brigade_units::convert;

use crate::error::ServiceError;
use crate::stock_ledger::{StockDemand, StockLedger};
use crate::store::{MenuStore, ProductStore};

/// Application service owning the menu lifecycle and its stock coordination.
#[derive(Debug)]
pub struct MenuService<P, M> {
    ledger: StockLedger<P>,
    menus: M,
}

impl<P, M> MenuService<P, M> {
    pub fn new(ledger: StockLedger<P>, menus: M) -> Self {
        Self { ledger, menus }
    }

    pub fn ledger(&self) -> &StockLedger<P> {
        &self.ledger
    }
}

impl<P, M> MenuService<P, M>
where
    P: ProductStore,
    M: MenuStore,
{
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id, name = %cmd.name))]
    pub fn create(&self, cmd: CreateMenu) -> Result<Menu, ServiceError> {
        let menu = Menu::create(&cmd)?;
        self.menus.insert(menu.clone())?;
        Ok(menu)
    }

    pub fn get(&self, id: MenuId) -> Result<Menu, ServiceError> {
        self.load_menu(id)
    }

    pub fn list(&self) -> Result<Vec<Menu>, ServiceError> {
        Ok(self.menus.list()?)
    }

    /// Update base fields. Draft only; recomputes the cached costs since
    /// sale price and portion count feed the margin.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id))]
    pub fn update(&self, cmd: UpdateMenu) -> Result<Menu, ServiceError> {
        let mut menu = self.load_menu(cmd.menu_id)?;
        let expected = ExpectedVersion::Exact(menu.version());
        menu.update_details(&cmd)?;
        self.menus.save(menu.clone(), expected)?;
        Ok(menu)
    }

    /// Physical removal. Draft only.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id))]
    pub fn delete(&self, cmd: DeleteMenu) -> Result<(), ServiceError> {
        let menu = self.load_menu(cmd.menu_id)?;
        menu.ensure_deletable()?;
        self.menus.delete(cmd.menu_id)?;
        Ok(())
    }

    /// Attach an ingredient line to a draft menu.
    ///
    /// Converts the quantity into the product's stock unit (no-op when the
    /// units already match) and checks current sufficiency. The check is a
    /// **pre-check only**: nothing is reserved; stock moves at
    /// confirmation.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id, product_id = %cmd.product_id))]
    pub fn add_ingredient(&self, cmd: AddIngredient) -> Result<MenuIngredient, ServiceError> {
        if cmd.quantity <= Decimal::ZERO {
            return Err(ServiceError::Validation(format!(
                "quantity must be strictly positive (got {})",
                cmd.quantity
            )));
        }

        let mut menu = self.load_menu(cmd.menu_id)?;
        let product = self.ledger.product(cmd.product_id)?;

        let converted = convert(cmd.quantity, cmd.unit, product.stock_unit())?;
        if converted > product.stock() {
            return Err(ServiceError::InsufficientStock {
                product: product.name().to_string(),
                available: product.stock(),
                requested: converted,
            });
        }

        let ingredient = MenuIngredient::new(
            IngredientId::new(AggregateId::new()),
            cmd.menu_id,
            cmd.product_id,
            cmd.quantity,
            cmd.unit,
            converted,
            product.unit_price(),
            cmd.note.clone(),
        );

        let expected = ExpectedVersion::Exact(menu.version());
        menu.add_ingredient(ingredient.clone(), cmd.occurred_at)?;
        self.menus.save(menu, expected)?;
        Ok(ingredient)
    }

    /// Detach the ingredient line for a product from a draft menu.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id, product_id = %cmd.product_id))]
    pub fn remove_ingredient(&self, cmd: RemoveIngredient) -> Result<(), ServiceError> {
        let mut menu = self.load_menu(cmd.menu_id)?;
        let expected = ExpectedVersion::Exact(menu.version());
        menu.remove_ingredient(cmd.product_id, cmd.occurred_at)?;
        self.menus.save(menu, expected)?;
        Ok(())
    }

    /// Read-only check: does every ingredient line fit in current stock?
    pub fn verify_stock_sufficiency(&self, id: MenuId) -> Result<bool, ServiceError> {
        let menu = self.load_menu(id)?;
        for ingredient in menu.ingredients() {
            let product = self.ledger.product(ingredient.product_id)?;
            if product.stock() < ingredient.converted_quantity {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Refresh every line's cost cache from current product prices. Draft
    /// only (confirmed menus keep confirmation-time costs).
    #[instrument(skip(self), fields(menu_id = %id))]
    pub fn refresh_costs(
        &self,
        id: MenuId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Menu, ServiceError> {
        let mut menu = self.load_menu(id)?;
        let expected = ExpectedVersion::Exact(menu.version());
        let product_ids: Vec<_> = menu.ingredients().iter().map(|i| i.product_id).collect();
        for product_id in product_ids {
            let product = self.ledger.product(product_id)?;
            menu.reprice_ingredient(product_id, product.unit_price(), occurred_at)?;
        }
        self.menus.save(menu.clone(), expected)?;
        Ok(menu)
    }

    /// `Draft → Confirmed`: consume every ingredient's stock as one atomic
    /// unit, then write the status.
    ///
    /// No-op returning the current menu when already confirmed. Any failure
    /// (empty menu, terminal status, insufficient stock on any line, stale
    /// version) leaves every product and the menu status unchanged.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id))]
    pub fn confirm(&self, cmd: ConfirmMenu) -> Result<Menu, ServiceError> {
        let mut menu = self.load_menu(cmd.menu_id)?;
        if menu.status() == MenuStatus::Confirmed {
            return Ok(menu);
        }
        menu.ensure_confirmable()?;

        let demands = demands_for(&menu);
        let reason = format!("confirmation of menu '{}'", menu.name());
        self.ledger.consume_batch(
            &demands,
            &reason,
            Some(menu.id_typed().0),
            cmd.occurred_at,
            &cmd.actor,
        )?;

        let expected = ExpectedVersion::Exact(menu.version());
        menu.mark_confirmed(cmd.occurred_at);
        if let Err(err) = self.menus.save(menu.clone(), expected) {
            // The stock already moved; put it back before surfacing the
            // failed status write.
            let rollback_reason = format!("rollback of failed confirmation of menu '{}'", menu.name());
            if let Err(rollback_err) = self.ledger.restore_batch(
                &demands,
                &rollback_reason,
                Some(menu.id_typed().0),
                cmd.occurred_at,
                &cmd.actor,
            ) {
                tracing::error!(
                    menu = %menu.name(),
                    error = %rollback_err,
                    "compensating restore failed after rejected confirmation"
                );
            }
            return Err(err.into());
        }

        tracing::info!(menu = %menu.name(), cost = %menu.total_cost(), "menu confirmed");
        Ok(menu)
    }

    /// `Draft/Confirmed → Cancelled`: restore stock first when the menu was
    /// confirmed, then write the status. No-op when already cancelled;
    /// prepared menus cannot be cancelled.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id))]
    pub fn cancel(&self, cmd: CancelMenu) -> Result<Menu, ServiceError> {
        if cmd.reason.trim().is_empty() {
            return Err(ServiceError::Validation("reason cannot be blank".to_string()));
        }

        let mut menu = self.load_menu(cmd.menu_id)?;
        if menu.status() == MenuStatus::Cancelled {
            return Ok(menu);
        }
        menu.ensure_cancellable()?;

        let was_confirmed = menu.status() == MenuStatus::Confirmed;
        let demands = demands_for(&menu);
        if was_confirmed {
            let reason = format!("cancellation of menu '{}': {}", menu.name(), cmd.reason);
            self.ledger.restore_batch(
                &demands,
                &reason,
                Some(menu.id_typed().0),
                cmd.occurred_at,
                &cmd.actor,
            )?;
        }

        let expected = ExpectedVersion::Exact(menu.version());
        menu.mark_cancelled(cmd.occurred_at);
        if let Err(err) = self.menus.save(menu.clone(), expected) {
            if was_confirmed {
                // Undo the restore so stock reflects the still-confirmed menu.
                let rollback_reason =
                    format!("rollback of failed cancellation of menu '{}'", menu.name());
                if let Err(rollback_err) = self.ledger.consume_batch(
                    &demands,
                    &rollback_reason,
                    Some(menu.id_typed().0),
                    cmd.occurred_at,
                    &cmd.actor,
                ) {
                    tracing::error!(
                        menu = %menu.name(),
                        error = %rollback_err,
                        "compensating decrement failed after rejected cancellation"
                    );
                }
            }
            return Err(err.into());
        }

        Ok(menu)
    }

    /// `Confirmed → Prepared`. No stock moves; the consumption happened at
    /// confirmation.
    #[instrument(skip(self, cmd), fields(menu_id = %cmd.menu_id))]
    pub fn mark_prepared(&self, cmd: MarkPrepared) -> Result<Menu, ServiceError> {
        let mut menu = self.load_menu(cmd.menu_id)?;
        let expected = ExpectedVersion::Exact(menu.version());
        menu.mark_prepared(cmd.occurred_at)?;
        self.menus.save(menu.clone(), expected)?;
        Ok(menu)
    }

    fn load_menu(&self, id: MenuId) -> Result<Menu, ServiceError> {
        self.menus.load(id)?.ok_or(ServiceError::NotFound)
    }
}

fn demands_for(menu: &Menu) -> Vec<StockDemand> {
    menu.ingredients()
        .iter()
        .map(|i| StockDemand {
            product_id: i.product_id,
            quantity: i.converted_quantity,
        })
        .collect()
}
