//! GoMarketplace cart CLI - inspect and edit the on-device cart.
//!
//! # Usage
//!
//! ```bash
//! # Print the stored cart
//! marketplace-cart show
//!
//! # Add a product (or bump its quantity)
//! marketplace-cart add --id 1 --title "Apple" --image-url https://img/apple.png --price 1.5
//!
//! # Change quantities
//! marketplace-cart increment 1
//! marketplace-cart decrement 1
//!
//! # Forget the stored cart
//! marketplace-cart clear-storage
//! ```
//!
//! Every command prints the resulting cart as JSON on stdout. Logs go to
//! stderr and are controlled with `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use marketplace_cart::{commands, AppState, CartConfig, CartProvider, CartResponse};
use marketplace_core::NewCartItem;
use marketplace_storage::migrations::migration_status;
use marketplace_storage::{Database, DbConfig, KeyValueStore};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "marketplace-cart")]
#[command(author, version, about = "GoMarketplace cart tools")]
struct Cli {
    /// Path to cart.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price
        #[arg(long)]
        price: f64,
    },
    /// Increase the quantity of a product by one
    Increment {
        /// Product id
        id: String,
    },
    /// Decrease the quantity of a product by one
    Decrement {
        /// Product id
        id: String,
    },
    /// Delete the stored cart
    ClearStorage,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` for verbose output
/// - `RUST_LOG=marketplace=trace` for cart-specific tracing
/// - Default: INFO level, debug for marketplace crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marketplace=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = CartConfig::load_or_default(cli.config);
    let db = Arc::new(open_database(&config).await?);

    if let Commands::ClearStorage = cli.command {
        db.remove(config.storage_key()).await?;
        info!(key = %config.storage_key(), "Stored cart removed");
    }

    let provider = CartProvider::mount(db.clone(), config).await;
    let mut state = AppState::new();
    state.manage(&provider);

    let response = match cli.command {
        Commands::Show | Commands::ClearStorage => commands::get_cart(&state)?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::add_to_cart(&state, NewCartItem::new(id, title, image_url, price))?,
        Commands::Increment { id } => commands::increment(&state, &id)?,
        Commands::Decrement { id } => commands::decrement(&state, &id)?,
    };

    provider.unmount().await?;
    db.close().await;

    print_cart(&response)
}

/// Opens the SQLite store, creating its directory if needed, and checks
/// that it answers queries.
async fn open_database(config: &CartConfig) -> CliResult<Database> {
    let path = config
        .database_path()
        .ok_or("Could not determine app data directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    debug!(path = %path.display(), "Opening cart database");
    let db = Database::new(DbConfig::new(path)).await?;

    if !db.health_check().await {
        return Err("Cart database is not answering queries".into());
    }

    let (total, applied) = migration_status(db.pool()).await?;
    debug!(total, applied, "Cart database schema");

    Ok(db)
}

fn print_cart(response: &CartResponse) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
