//! Cart and checkout commands.
//!
//! Every command loads the catalog and cart first, so mutations operate on
//! what the server currently holds.

#![allow(clippy::print_stdout)]

use ai_store_client::experiment::{CheckoutButton, ExperimentUser};
use ai_store_core::ProductId;

use super::{App, CliError};

async fn load(app: &App) -> Result<(), CliError> {
    app.require_login()?;
    app.store.refresh_all(None).await;
    Ok(())
}

pub async fn show(app: &App) -> Result<(), CliError> {
    load(app).await?;
    print_cart(app);
    Ok(())
}

pub async fn add(app: &App, product_id: &str) -> Result<(), CliError> {
    load(app).await?;
    let product = app
        .store
        .products()
        .into_iter()
        .find(|p| p.id.as_str() == product_id)
        .ok_or_else(|| CliError::UnknownProduct(product_id.to_string()))?;

    app.store.add_item_to_cart(&product).await?;
    print_cart(app);
    Ok(())
}

pub async fn remove(app: &App, product_id: &str) -> Result<(), CliError> {
    load(app).await?;
    app.store
        .remove_item_from_cart(&ProductId::new(product_id))
        .await?;
    print_cart(app);
    Ok(())
}

/// Change a line's quantity by `delta`. Lines not in the cart are ignored.
pub async fn adjust(app: &App, product_id: &str, delta: i64) -> Result<(), CliError> {
    load(app).await?;
    app.store
        .change_quantity(&ProductId::new(product_id), delta)
        .await?;
    print_cart(app);
    Ok(())
}

pub async fn clear(app: &App) -> Result<(), CliError> {
    load(app).await?;
    app.store.clear_all_cart().await?;
    print_cart(app);
    Ok(())
}

/// Place an order, labelling it with the experiment's checkout button.
pub async fn checkout(app: &App) -> Result<(), CliError> {
    load(app).await?;
    if app.store.cart().is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    let identity = app.session.current();
    let user = ExperimentUser::from_identity(identity.as_ref());
    let button = CheckoutButton::resolve(&app.decisions, &user);
    println!("[{}]", button.text);

    let placed = app
        .store
        .checkout(Some(&button))
        .await
        .ok_or(CliError::Failed("Checkout"))?;
    match placed.order_id {
        Some(order_id) => println!("Order {order_id} placed"),
        None => println!("Order placed"),
    }
    Ok(())
}

fn print_cart(app: &App) {
    let cart = app.store.cart();
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in &cart {
        println!(
            "{:<12} {:<32} x{:<4} {:>10}",
            line.id.as_str(),
            line.name,
            line.quantity,
            line.line_total().to_string()
        );
    }
    let summary = app.store.cart_summary();
    println!("{} item(s), total {}", summary.item_count, summary.total);
}
