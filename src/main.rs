//! Storefront CLI - initialize the store and manage users and products

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use storefront::config::{self, StorefrontConfig};
use storefront::ui::{self, Icons};
use storefront::{Ack, Error, InitOutcome, ProductFields, SqliteStore, UserFields};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(version)]
#[command(about = "Users and products over a single SQLite file")]
#[command(long_about = r#"
Storefront keeps two tables, users and products, in one SQLite database.
The database is created and seeded on first run; later runs reuse it.

Example usage:
  storefront init
  storefront users list
  storefront users add --name David --email david@example.com
  storefront products update 2 --name Phone --price 599.99
  storefront --format json products get 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: storefront.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed the database if it does not exist yet
    Init {
        /// Also write the resolved database path to the config file
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Show row counts per table
    Stats,
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,
    /// Show one user
    Get { id: i64 },
    /// Create a user
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Replace a user's name and email
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Show one product
    Get { id: i64 },
    /// Create a product
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Replace a product's name and price
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete a product
    Delete { id: i64 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let loaded = config::load_config(cli.config.as_deref())?;
    let database = config::resolve_database_path(cli.database.clone(), loaded.as_ref());
    let store = SqliteStore::new(&database);

    // The store must be usable before any command touches it.
    let outcome = store
        .initialize_store()
        .context("cannot start without an initialized store")?;

    let format = cli.format;
    match cli.command {
        Commands::Init { write_config, force } => {
            if write_config {
                let path = cli.config.clone().unwrap_or_else(config::default_config_path);
                let contents = StorefrontConfig {
                    database: Some(database.display().to_string()),
                };
                config::write_config(&path, &contents, force)?;
                tracing::info!("Wrote config to {}", path.display());
            }

            emit(format, &outcome, || match outcome {
                InitOutcome::Created { users, products } => {
                    ui::header(Icons::SEED, "Store created");
                    ui::info("Database", &database.display().to_string());
                    ui::summary_row("Seeded users:", &users.to_string());
                    ui::summary_row("Seeded products:", &products.to_string());
                }
                InitOutcome::Existing => {
                    ui::header(Icons::DATABASE, "Store already initialized");
                    ui::info("Database", &database.display().to_string());
                }
            })?;
        }

        Commands::Users { action } => run_users(&store, format, action)?,

        Commands::Products { action } => run_products(&store, format, action)?,

        Commands::Stats => {
            let stats = store.stats()?;
            emit(format, &stats, || {
                ui::header(Icons::STATS, &format!("Storefront Statistics ({})", database.display()));
                println!("{}", ui::stats_table(&stats));
            })?;
        }
    }

    Ok(())
}

fn run_users(store: &SqliteStore, format: OutputFormat, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::List => {
            let users = store.list_users()?;
            emit(format, &users, || {
                if users.is_empty() {
                    println!("{} No users.", Icons::EMPTY);
                } else {
                    println!("{}", ui::users_table(&users));
                }
            })?;
        }
        UserAction::Get { id } => {
            let user = store
                .get_user(id)?
                .ok_or(Error::NotFound { entity: "user", id })?;
            emit(format, &user, || {
                ui::header(Icons::PERSON, &user.name);
                ui::info("ID", &user.id.to_string());
                ui::info("Email", &user.email);
            })?;
        }
        UserAction::Add { name, email } => {
            let id = store.create_user(&UserFields { name, email })?;
            emit_created(format, "user", id)?;
        }
        UserAction::Update { id, name, email } => {
            let ack = store.update_user(id, &UserFields { name, email })?;
            emit_ack(format, "user", id, "Updated", ack)?;
        }
        UserAction::Delete { id } => {
            let ack = store.delete_user(id)?;
            emit_ack(format, "user", id, "Deleted", ack)?;
        }
    }
    Ok(())
}

fn run_products(store: &SqliteStore, format: OutputFormat, action: ProductAction) -> anyhow::Result<()> {
    match action {
        ProductAction::List => {
            let products = store.list_products()?;
            emit(format, &products, || {
                if products.is_empty() {
                    println!("{} No products.", Icons::EMPTY);
                } else {
                    println!("{}", ui::products_table(&products));
                }
            })?;
        }
        ProductAction::Get { id } => {
            let product = store
                .get_product(id)?
                .ok_or(Error::NotFound { entity: "product", id })?;
            emit(format, &product, || {
                ui::header(Icons::PACKAGE, &product.name);
                ui::info("ID", &product.id.to_string());
                ui::info("Price", &format!("{:.2}", product.price));
            })?;
        }
        ProductAction::Add { name, price } => {
            let id = store.create_product(&ProductFields { name, price })?;
            emit_created(format, "product", id)?;
        }
        ProductAction::Update { id, name, price } => {
            let ack = store.update_product(id, &ProductFields { name, price })?;
            emit_ack(format, "product", id, "Updated", ack)?;
        }
        ProductAction::Delete { id } => {
            let ack = store.delete_product(id)?;
            emit_ack(format, "product", id, "Deleted", ack)?;
        }
    }
    Ok(())
}

/// Print `value` as JSON, or run the human renderer in text mode.
fn emit<T: Serialize>(format: OutputFormat, value: &T, human: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => human(),
    }
    Ok(())
}

fn emit_created(format: OutputFormat, entity: &str, id: i64) -> anyhow::Result<()> {
    emit(format, &serde_json::json!({ "id": id }), || {
        ui::success(&format!("Created {} {}", entity, id));
    })
}

fn emit_ack(
    format: OutputFormat,
    entity: &str,
    id: i64,
    verb: &str,
    ack: Ack,
) -> anyhow::Result<()> {
    emit(format, &ack, || {
        if ack.matched() {
            ui::success(&format!("{} {} {}", verb, entity, id));
        } else {
            ui::warn(&format!("No {} with id {}; nothing changed", entity, id));
        }
    })
}
