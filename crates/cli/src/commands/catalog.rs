//! Catalog and order history commands.

#![allow(clippy::print_stdout)]

use super::{App, CliError};

/// List products, optionally searched and filtered by category.
pub async fn products(app: &App, query: Option<&str>, category: Option<&str>) -> Result<(), CliError> {
    app.store.refresh_all(query).await;

    let products = app.store.products_in_category(category);
    if products.is_empty() {
        println!("No products");
        return Ok(());
    }
    for product in products {
        println!(
            "{:<12} {:<32} {:<14} {:>10}",
            product.id.as_str(),
            product.name,
            product.category,
            product.price.to_string()
        );
    }
    Ok(())
}

pub async fn orders(app: &App) -> Result<(), CliError> {
    app.require_login()?;
    app.store.refresh_all(None).await;

    let orders = app.store.orders();
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }
    for order in orders {
        println!(
            "{}  {}  {:<10} {:>10}",
            order.id,
            order.date.format("%Y-%m-%d %H:%M"),
            order.status.label(),
            order.total.to_string()
        );
        for line in &order.items {
            println!("    {} x{}  {}", line.name, line.quantity, line.line_total());
        }
    }
    Ok(())
}
