//! AI Store CLI - drive the store client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! ai-store products --query lamp --category Electronics
//!
//! # Sign in (the session is kept in AI_STORE_DATA_DIR)
//! ai-store login -e shopper@example.com -p secret
//!
//! # Work with the cart
//! ai-store cart add p-100
//! ai-store cart inc p-100
//! ai-store cart show
//!
//! # Place the order
//! ai-store checkout
//! ```
//!
//! Each invocation restores the persisted session, runs one command and exits.
//!
//! # Environment Variables
//!
//! - `AI_STORE_API_BASE_URL` - Store API address
//! - `AI_STORE_PLATFORM` - `simulator` or `emulator`, picks the default address
//! - `AI_STORE_DATA_DIR` - Where the session record lives
//! - `AI_STORE_DECISIONS_FILE` - JSON file of static experiment decisions
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::App;

#[derive(Parser)]
#[command(name = "ai-store")]
#[command(author, version, about = "AI Store command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Search query
        #[arg(short, long)]
        query: Option<String>,

        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Log in to an existing account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout,
    /// Show order history
    Orders,
    /// Show the active UI variation
    Ui,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add one unit of a product
    Add { product_id: String },
    /// Remove a line
    Remove { product_id: String },
    /// Increase a line's quantity by one
    Inc { product_id: String },
    /// Decrease a line's quantity by one
    Dec { product_id: String },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ai_store_client=info,ai_store_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::from_env().await?;

    match cli.command {
        Commands::Products { query, category } => {
            commands::catalog::products(&app, query.as_deref(), category.as_deref()).await?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&app, &email, password).await?;
        }
        Commands::Register {
            email,
            name,
            password,
        } => commands::account::register(&app, &email, &name, password).await?,
        Commands::Logout => commands::account::logout(&app).await,
        Commands::Whoami => commands::account::whoami(&app),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app).await?,
            CartAction::Add { product_id } => commands::cart::add(&app, &product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&app, &product_id).await?,
            CartAction::Inc { product_id } => commands::cart::adjust(&app, &product_id, 1).await?,
            CartAction::Dec { product_id } => commands::cart::adjust(&app, &product_id, -1).await?,
            CartAction::Clear => commands::cart::clear(&app).await?,
        },
        Commands::Checkout => commands::cart::checkout(&app).await?,
        Commands::Orders => commands::catalog::orders(&app).await?,
        Commands::Ui => commands::account::ui(&app),
    }
    Ok(())
}
