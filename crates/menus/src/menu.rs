use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use brigade_core::{Actor, AggregateId, AggregateRoot, DomainError, DomainResult};
use brigade_inventory::ProductId;
use brigade_units::Unit;

/// Number of decimal places costs and margins are rounded to.
const COST_SCALE: u32 = 2;

/// Menu identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuId(pub AggregateId);

impl MenuId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MenuId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Ingredient line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub AggregateId);

impl IngredientId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for IngredientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Menu status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    Draft,
    Confirmed,
    Prepared,
    Cancelled,
}

impl core::fmt::Display for MenuStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            MenuStatus::Draft => "draft",
            MenuStatus::Confirmed => "confirmed",
            MenuStatus::Prepared => "prepared",
            MenuStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Ingredient line: a non-owning product reference plus the required
/// quantity in the caller's unit, with the stock-unit conversion and the
/// monetary cost cached on the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuIngredient {
    pub ingredient_id: IngredientId,
    pub menu_id: MenuId,
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit: Unit,
    pub converted_quantity: Decimal,
    pub cost: Decimal,
    pub note: Option<String>,
}

impl MenuIngredient {
    /// Build a line with its cost cache (`converted_quantity × unit_price`,
    /// rounded half-up to two decimals).
    pub fn new(
        ingredient_id: IngredientId,
        menu_id: MenuId,
        product_id: ProductId,
        quantity: Decimal,
        unit: Unit,
        converted_quantity: Decimal,
        unit_price: Decimal,
        note: Option<String>,
    ) -> Self {
        Self {
            ingredient_id,
            menu_id,
            product_id,
            quantity,
            unit,
            converted_quantity,
            cost: round_cost(converted_quantity * unit_price),
            note,
        }
    }

    /// Refresh the cost cache after a product price change.
    pub fn reprice(&mut self, unit_price: Decimal) {
        self.cost = round_cost(self.converted_quantity * unit_price);
    }
}

fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Aggregate root: Menu.
///
/// Owns its ingredient lines (their lifetime is bound to the menu); each
/// line references its product by id only. Base fields and ingredients are
/// mutable in draft only. The status field is written exclusively through
/// the lifecycle methods below, and the services that call them only do so
/// after all stock coordination for the transition has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    id: MenuId,
    name: String,
    description: Option<String>,
    service_date: NaiveDate,
    portions: u32,
    sale_price: Option<Decimal>,
    status: MenuStatus,
    ingredients: Vec<MenuIngredient>,
    total_cost: Decimal,
    margin_percent: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Menu {
    /// Validate a creation command and build the menu in draft at version 1.
    pub fn create(cmd: &CreateMenu) -> DomainResult<Self> {
        validate_base_fields(&cmd.name, cmd.portions, cmd.sale_price)?;

        let mut menu = Self {
            id: cmd.menu_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            service_date: cmd.service_date,
            portions: cmd.portions,
            sale_price: cmd.sale_price,
            status: MenuStatus::Draft,
            ingredients: Vec::new(),
            total_cost: Decimal::ZERO,
            margin_percent: None,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
            version: 1,
        };
        menu.recompute_costs();
        Ok(menu)
    }

    pub fn id_typed(&self) -> MenuId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn portions(&self) -> u32 {
        self.portions
    }

    pub fn sale_price(&self) -> Option<Decimal> {
        self.sale_price
    }

    pub fn status(&self) -> MenuStatus {
        self.status
    }

    pub fn ingredients(&self) -> &[MenuIngredient] {
        &self.ingredients
    }

    pub fn ingredient_for(&self, product_id: ProductId) -> Option<&MenuIngredient> {
        self.ingredients.iter().find(|i| i.product_id == product_id)
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn margin_percent(&self) -> Option<Decimal> {
        self.margin_percent
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, MenuStatus::Draft)
    }

    fn ensure_modifiable(&self) -> DomainResult<()> {
        if !self.is_modifiable() {
            return Err(DomainError::invalid_state(format!(
                "menu '{}' can only be modified in draft (status: {})",
                self.name, self.status
            )));
        }
        Ok(())
    }

    /// Attach an ingredient line. Draft only; at most one line per product.
    pub fn add_ingredient(
        &mut self,
        ingredient: MenuIngredient,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if self.ingredient_for(ingredient.product_id).is_some() {
            return Err(DomainError::invalid_state(format!(
                "menu '{}' already has an ingredient for product {}",
                self.name, ingredient.product_id
            )));
        }
        self.ingredients.push(ingredient);
        self.recompute_costs();
        self.touch(at);
        Ok(())
    }

    /// Detach the ingredient line for a product. Draft only.
    pub fn remove_ingredient(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> DomainResult<MenuIngredient> {
        self.ensure_modifiable()?;
        let idx = self
            .ingredients
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(DomainError::NotFound)?;
        let removed = self.ingredients.remove(idx);
        self.recompute_costs();
        self.touch(at);
        Ok(removed)
    }

    /// Update base fields. Draft only.
    pub fn update_details(&mut self, cmd: &UpdateMenu) -> DomainResult<()> {
        self.ensure_modifiable()?;
        validate_base_fields(&cmd.name, cmd.portions, cmd.sale_price)?;

        self.name = cmd.name.trim().to_string();
        self.description = cmd.description.clone();
        self.service_date = cmd.service_date;
        self.portions = cmd.portions;
        self.sale_price = cmd.sale_price;
        self.recompute_costs();
        self.touch(cmd.occurred_at);
        Ok(())
    }

    /// Refresh one line's cost cache after a product price change. Draft
    /// only: once confirmed, cached costs are frozen at confirmation-time
    /// prices.
    pub fn reprice_ingredient(
        &mut self,
        product_id: ProductId,
        unit_price: Decimal,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_modifiable()?;
        let ingredient = self
            .ingredients
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(DomainError::NotFound)?;
        ingredient.reprice(unit_price);
        self.recompute_costs();
        self.touch(at);
        Ok(())
    }

    /// Guard for confirmation. `Confirmed` is not an error here; the
    /// service treats it as a no-op before calling this.
    pub fn ensure_confirmable(&self) -> DomainResult<()> {
        match self.status {
            MenuStatus::Cancelled => Err(DomainError::invalid_state(format!(
                "menu '{}' is cancelled and cannot be confirmed",
                self.name
            ))),
            MenuStatus::Prepared => Err(DomainError::invalid_state(format!(
                "menu '{}' is already prepared",
                self.name
            ))),
            MenuStatus::Confirmed | MenuStatus::Draft => {
                if self.ingredients.is_empty() {
                    return Err(DomainError::invalid_state(format!(
                        "menu '{}' has no ingredients",
                        self.name
                    )));
                }
                Ok(())
            }
        }
    }

    /// Guard for cancellation. `Cancelled` is the service-side no-op case.
    pub fn ensure_cancellable(&self) -> DomainResult<()> {
        if self.status == MenuStatus::Prepared {
            return Err(DomainError::invalid_state(format!(
                "menu '{}' is already prepared and cannot be cancelled",
                self.name
            )));
        }
        Ok(())
    }

    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status != MenuStatus::Draft {
            return Err(DomainError::invalid_state(format!(
                "menu '{}' can only be deleted in draft (status: {})",
                self.name, self.status
            )));
        }
        Ok(())
    }

    /// Status write for a completed confirmation. Callers run every stock
    /// operation for the transition before this.
    pub fn mark_confirmed(&mut self, at: DateTime<Utc>) {
        self.status = MenuStatus::Confirmed;
        self.touch(at);
    }

    /// Status write for a completed cancellation.
    pub fn mark_cancelled(&mut self, at: DateTime<Utc>) {
        self.status = MenuStatus::Cancelled;
        self.touch(at);
    }

    /// `Confirmed → Prepared`; every other source status is rejected.
    pub fn mark_prepared(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status != MenuStatus::Confirmed {
            return Err(DomainError::invalid_state(format!(
                "menu '{}' must be confirmed before preparation (status: {})",
                self.name, self.status
            )));
        }
        self.status = MenuStatus::Prepared;
        self.touch(at);
        Ok(())
    }

    /// Recompute the cached total cost and margin from the ingredient lines.
    fn recompute_costs(&mut self) {
        let total: Decimal = self.ingredients.iter().map(|i| i.cost).sum();
        self.total_cost = round_cost(total);

        self.margin_percent = self.sale_price.and_then(|price| {
            if price <= Decimal::ZERO {
                return None;
            }
            let revenue = price * Decimal::from(self.portions);
            let margin = (revenue - self.total_cost) / revenue * Decimal::from(100);
            Some(round_cost(margin))
        });
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
        self.version += 1;
    }
}

fn validate_base_fields(name: &str, portions: u32, sale_price: Option<Decimal>) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if portions == 0 {
        return Err(DomainError::validation("portion count must be at least 1"));
    }
    if let Some(price) = sale_price {
        if price.is_sign_negative() {
            return Err(DomainError::validation("sale price cannot be negative"));
        }
    }
    Ok(())
}

impl AggregateRoot for Menu {
    type Id = MenuId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateMenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMenu {
    pub menu_id: MenuId,
    pub name: String,
    pub description: Option<String>,
    pub service_date: NaiveDate,
    pub portions: u32,
    pub sale_price: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: UpdateMenu (base fields only, draft only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMenu {
    pub menu_id: MenuId,
    pub name: String,
    pub description: Option<String>,
    pub service_date: NaiveDate,
    pub portions: u32,
    pub sale_price: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: AddIngredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddIngredient {
    pub menu_id: MenuId,
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit: Unit,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: RemoveIngredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIngredient {
    pub menu_id: MenuId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: ConfirmMenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmMenu {
    pub menu_id: MenuId,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: CancelMenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMenu {
    pub menu_id: MenuId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: MarkPrepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPrepared {
    pub menu_id: MenuId,
    pub occurred_at: DateTime<Utc>,
    pub actor: Actor,
}

/// Command: DeleteMenu (draft only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMenu {
    pub menu_id: MenuId,
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

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn create_cmd(sale_price: Option<&str>) -> CreateMenu {
        CreateMenu {
            menu_id: MenuId::new(AggregateId::new()),
            name: "Coq au vin".to_string(),
            description: Some("Tuesday special".to_string()),
            service_date: test_date(),
            portions: 4,
            sale_price: sale_price.map(dec),
            occurred_at: test_time(),
            actor: test_actor(),
        }
    }

    fn ingredient(menu: &Menu, qty: &str, unit: Unit, converted: &str, price: &str) -> MenuIngredient {
        MenuIngredient::new(
            IngredientId::new(AggregateId::new()),
            menu.id_typed(),
            ProductId::new(AggregateId::new()),
            dec(qty),
            unit,
            dec(converted),
            dec(price),
            None,
        )
    }

    #[test]
    fn create_starts_in_draft_with_zero_cost() {
        let menu = Menu::create(&create_cmd(None)).unwrap();
        assert_eq!(menu.status(), MenuStatus::Draft);
        assert!(menu.is_modifiable());
        assert_eq!(menu.total_cost(), Decimal::ZERO);
        assert_eq!(menu.margin_percent(), None);
        assert_eq!(menu.version(), 1);
    }

    #[test]
    fn create_rejects_invalid_base_fields() {
        let mut cmd = create_cmd(None);
        cmd.name = " ".to_string();
        assert!(matches!(Menu::create(&cmd), Err(DomainError::Validation(_))));

        let mut cmd = create_cmd(None);
        cmd.portions = 0;
        assert!(matches!(Menu::create(&cmd), Err(DomainError::Validation(_))));

        let cmd = create_cmd(Some("-1"));
        assert!(matches!(Menu::create(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn ingredient_costs_accumulate_into_the_total() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        // 1 kg at 3.50/kg and 0.3 kg at 8.00/kg.
        let a = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        let b = ingredient(&menu, "0.3", Unit::Kilogram, "0.3", "8.00");
        assert_eq!(a.cost, dec("3.50"));
        assert_eq!(b.cost, dec("2.40"));

        menu.add_ingredient(a, test_time()).unwrap();
        menu.add_ingredient(b, test_time()).unwrap();
        assert_eq!(menu.total_cost(), dec("5.90"));
    }

    #[test]
    fn duplicate_product_lines_are_rejected() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        let duplicate = MenuIngredient::new(
            IngredientId::new(AggregateId::new()),
            menu.id_typed(),
            line.product_id,
            dec("2"),
            Unit::Kilogram,
            dec("2"),
            dec("3.50"),
            None,
        );
        menu.add_ingredient(line, test_time()).unwrap();
        let err = menu.add_ingredient(duplicate, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(menu.ingredients().len(), 1);
    }

    #[test]
    fn remove_ingredient_recomputes_the_total() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        let a = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        let b = ingredient(&menu, "0.3", Unit::Kilogram, "0.3", "8.00");
        let a_product = a.product_id;
        menu.add_ingredient(a, test_time()).unwrap();
        menu.add_ingredient(b, test_time()).unwrap();

        let removed = menu.remove_ingredient(a_product, test_time()).unwrap();
        assert_eq!(removed.cost, dec("3.50"));
        assert_eq!(menu.total_cost(), dec("2.40"));

        assert!(matches!(
            menu.remove_ingredient(a_product, test_time()),
            Err(DomainError::NotFound)
        ));
    }

    #[test]
    fn margin_uses_portion_revenue() {
        let mut menu = Menu::create(&create_cmd(Some("2.95"))).unwrap();
        let a = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        let b = ingredient(&menu, "0.3", Unit::Kilogram, "0.3", "8.00");
        menu.add_ingredient(a, test_time()).unwrap();
        menu.add_ingredient(b, test_time()).unwrap();

        // Revenue = 2.95 × 4 = 11.80; cost = 5.90; margin = 50%.
        assert_eq!(menu.total_cost(), dec("5.90"));
        assert_eq!(menu.margin_percent(), Some(dec("50.00")));
    }

    #[test]
    fn confirmed_menus_reject_modification() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        let product = line.product_id;
        menu.add_ingredient(line, test_time()).unwrap();
        menu.mark_confirmed(test_time());

        let extra = ingredient(&menu, "1", Unit::Litre, "1", "2.00");
        assert!(matches!(
            menu.add_ingredient(extra, test_time()),
            Err(DomainError::InvalidState(_))
        ));
        assert!(matches!(
            menu.remove_ingredient(product, test_time()),
            Err(DomainError::InvalidState(_))
        ));

        let update = UpdateMenu {
            menu_id: menu.id_typed(),
            name: "New name".to_string(),
            description: None,
            service_date: test_date(),
            portions: 2,
            sale_price: None,
            occurred_at: test_time(),
            actor: test_actor(),
        };
        assert!(matches!(
            menu.update_details(&update),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn confirm_guard_covers_every_terminal_case() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();

        // No ingredients yet.
        assert!(matches!(
            menu.ensure_confirmable(),
            Err(DomainError::InvalidState(_))
        ));

        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        menu.add_ingredient(line, test_time()).unwrap();
        assert!(menu.ensure_confirmable().is_ok());

        menu.mark_cancelled(test_time());
        assert!(matches!(
            menu.ensure_confirmable(),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn prepared_menus_cannot_be_cancelled() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        menu.add_ingredient(line, test_time()).unwrap();
        menu.mark_confirmed(test_time());
        menu.mark_prepared(test_time()).unwrap();

        assert!(matches!(
            menu.ensure_cancellable(),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn preparation_requires_confirmed_status() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        assert!(matches!(
            menu.mark_prepared(test_time()),
            Err(DomainError::InvalidState(_))
        ));
        assert_eq!(menu.status(), MenuStatus::Draft);

        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        menu.add_ingredient(line, test_time()).unwrap();
        menu.mark_confirmed(test_time());
        menu.mark_prepared(test_time()).unwrap();
        assert_eq!(menu.status(), MenuStatus::Prepared);
    }

    #[test]
    fn delete_is_draft_only() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        assert!(menu.ensure_deletable().is_ok());
        let line = ingredient(&menu, "1", Unit::Kilogram, "1", "3.50");
        menu.add_ingredient(line, test_time()).unwrap();
        menu.mark_confirmed(test_time());
        assert!(matches!(
            menu.ensure_deletable(),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn reprice_refreshes_the_line_and_total() {
        let mut menu = Menu::create(&create_cmd(None)).unwrap();
        let line = ingredient(&menu, "2", Unit::Kilogram, "2", "3.50");
        let product = line.product_id;
        menu.add_ingredient(line, test_time()).unwrap();
        assert_eq!(menu.total_cost(), dec("7.00"));

        menu.reprice_ingredient(product, dec("4.25"), test_time()).unwrap();
        assert_eq!(menu.total_cost(), dec("8.50"));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: the cached total always equals the sum of the
            /// ingredient line costs, whatever sequence of adds built it.
            #[test]
            fn total_cost_matches_line_sum(
                lines in proptest::collection::vec((1i64..100_000, 1i64..10_000), 1..12),
            ) {
                let mut menu = Menu::create(&create_cmd(None)).unwrap();
                for (qty, price) in lines {
                    let line = ingredient(
                        &menu,
                        &Decimal::new(qty, 3).to_string(),
                        Unit::Kilogram,
                        &Decimal::new(qty, 3).to_string(),
                        &Decimal::new(price, 2).to_string(),
                    );
                    menu.add_ingredient(line, test_time()).unwrap();
                }
                let expected: Decimal = menu.ingredients().iter().map(|i| i.cost).sum();
                prop_assert_eq!(menu.total_cost(), expected);
            }

            /// Property: line costs always carry at most two decimals.
            #[test]
            fn line_costs_are_rounded_to_cents(
                qty in 1i64..1_000_000,
                price in 1i64..100_000,
            ) {
                let menu = Menu::create(&create_cmd(None)).unwrap();
                let line = ingredient(
                    &menu,
                    &Decimal::new(qty, 3).to_string(),
                    Unit::Kilogram,
                    &Decimal::new(qty, 3).to_string(),
                    &Decimal::new(price, 2).to_string(),
                );
                prop_assert!(line.cost.scale() <= 2);
            }
        }
    }
}
