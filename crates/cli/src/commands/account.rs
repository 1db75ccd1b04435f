//! Account commands.

#![allow(clippy::print_stdout)]

use secrecy::SecretString;

use ai_store_client::experiment::{ExperimentUser, resolve_ui_config};

use super::{App, CliError};

/// Log in and persist the session.
pub async fn login(app: &App, email: &str, password: String) -> Result<(), CliError> {
    let password = SecretString::from(password);
    if !app.session.login(email, &password).await {
        return Err(CliError::Failed("Login"));
    }
    whoami(app);
    Ok(())
}

/// Register, then log in as the new account.
pub async fn register(app: &App, email: &str, name: &str, password: String) -> Result<(), CliError> {
    let password = SecretString::from(password);
    if !app.session.register(email, name, &password).await {
        return Err(CliError::Failed("Registration"));
    }
    whoami(app);
    Ok(())
}

pub async fn logout(app: &App) {
    app.session.logout().await;
    println!("Logged out");
}

pub fn whoami(app: &App) {
    match app.session.current() {
        Some(identity) => {
            print!("{} <{}>", identity.name, identity.email);
            if let Some(country) = &identity.country {
                print!(" [{country}]");
            }
            println!();
        }
        None => println!("Not logged in"),
    }
}

/// Show the stored UI variation next to the one the decisions resolve to.
pub fn ui(app: &App) {
    let stored = app.session.ui_config().current();
    let identity = app.session.current();
    let user = ExperimentUser::from_identity(identity.as_ref());
    let resolved = resolve_ui_config(&app.decisions, &user);

    println!("experiment user: {}", user.id);
    for (label, config) in [("session", &stored), ("decisions", &resolved)] {
        println!("{label}:");
        println!("  theme: {}", config.theme);
        println!("  primary color: {}", config.primary_color);
        println!("  discount banner: {}", config.show_discount);
        println!("  header: {}", config.header_message);
        println!("  featured: {}", config.featured_categories.join(", "));
    }
}
