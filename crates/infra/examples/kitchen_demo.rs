//! End-to-end walkthrough: register products, build a menu, confirm it,
//! inspect the movement ledger, then cancel and watch the stock come back.
//!
//! Run with `RUST_LOG=debug` for the full trace output.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use brigade_core::{Actor, AggregateId};
use brigade_infra::menu_service::MenuService;
use brigade_infra::stock_ledger::StockLedger;
use brigade_infra::store::{InMemoryMenuStore, InMemoryProductStore};
use brigade_inventory::{ProductId, RegisterProduct};
use brigade_menus::{AddIngredient, CancelMenu, ConfirmMenu, CreateMenu, MenuId};
use brigade_units::Unit;

fn dec(s: &str) -> Decimal {
    s.parse().expect("literal decimal")
}

fn main() -> Result<()> {
    brigade_observability::init();

    let actor = Actor::new("chef.martin")?;
    let now = Utc::now();
    let products = Arc::new(InMemoryProductStore::new());
    let service = MenuService::new(
        StockLedger::new(products.clone()),
        Arc::new(InMemoryMenuStore::new()),
    );

    let chicken = service.ledger().register(RegisterProduct {
        product_id: ProductId::new(AggregateId::new()),
        name: "Chicken".to_string(),
        initial_stock: dec("5"),
        stock_unit: Unit::Kilogram,
        unit_price: dec("3.50"),
        alert_threshold: dec("1"),
        expiry_date: NaiveDate::from_ymd_opt(2026, 3, 20),
        occurred_at: now,
        actor: actor.clone(),
    })?;
    let mushrooms = service.ledger().register(RegisterProduct {
        product_id: ProductId::new(AggregateId::new()),
        name: "Mushrooms".to_string(),
        initial_stock: dec("2"),
        stock_unit: Unit::Kilogram,
        unit_price: dec("8.00"),
        alert_threshold: dec("0.5"),
        expiry_date: None,
        occurred_at: now,
        actor: actor.clone(),
    })?;

    let menu = service.create(CreateMenu {
        menu_id: MenuId::new(AggregateId::new()),
        name: "Coq au vin".to_string(),
        description: Some("Friday service".to_string()),
        service_date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        portions: 4,
        sale_price: Some(dec("2.95")),
        occurred_at: now,
        actor: actor.clone(),
    })?;

    service.add_ingredient(AddIngredient {
        menu_id: menu.id_typed(),
        product_id: chicken.id_typed(),
        quantity: dec("1000"),
        unit: Unit::Gram,
        note: Some("thighs preferred".to_string()),
        occurred_at: now,
        actor: actor.clone(),
    })?;
    service.add_ingredient(AddIngredient {
        menu_id: menu.id_typed(),
        product_id: mushrooms.id_typed(),
        quantity: dec("0.3"),
        unit: Unit::Kilogram,
        note: None,
        occurred_at: now,
        actor: actor.clone(),
    })?;

    let menu = service.get(menu.id_typed())?;
    println!(
        "menu '{}': cost {} / margin {:?}",
        menu.name(),
        menu.total_cost(),
        menu.margin_percent()
    );

    let confirmed = service.confirm(ConfirmMenu {
        menu_id: menu.id_typed(),
        occurred_at: now,
        actor: actor.clone(),
    })?;
    println!("confirmed '{}' ({})", confirmed.name(), confirmed.status());

    for product in [&chicken, &mushrooms] {
        let current = service.ledger().product(product.id_typed())?;
        println!("  {}: {} {}", current.name(), current.stock(), current.stock_unit());
        for movement in service.ledger().movements(product.id_typed())? {
            println!(
                "    {:?} {} {} -> {} ({})",
                movement.kind, movement.quantity, movement.unit, movement.resulting_stock,
                movement.reason
            );
        }
    }

    let cancelled = service.cancel(CancelMenu {
        menu_id: menu.id_typed(),
        reason: "supplier failure".to_string(),
        occurred_at: Utc::now(),
        actor,
    })?;
    println!("cancelled '{}' ({})", cancelled.name(), cancelled.status());

    for product in [&chicken, &mushrooms] {
        let current = service.ledger().product(product.id_typed())?;
        println!("  {} restored to {} {}", current.name(), current.stock(), current.stock_unit());
    }

    Ok(())
}
