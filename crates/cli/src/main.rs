//! Pitii CLI - browse and manage the restaurant menu.
//!
//! # Usage
//!
//! ```bash
//! # Show the menu
//! pitii menu
//!
//! # Add a product (staff)
//! pitii product add -n "Burger" -p 10 -i ./burger.png
//!
//! # Edit only the price of product 1 (staff)
//! pitii product edit 1 -p 12.50
//!
//! # Show and edit ingredients
//! pitii ingredients list 1
//! pitii ingredients add 1 "Cheddar"
//! pitii ingredients remove 1 4
//!
//! # Register a new user
//! pitii register -n "Ana" -e ana@pitii.com -p "..."
//! ```
//!
//! # Environment Variables
//!
//! - `PITII_API_BASE_URL` - Backend origin
//! - `PITII_STAFF_EMAIL` / `PITII_STAFF_PASSWORD` - Staff login for write commands
//! - `SENTRY_DSN` - Optional error reporting
//! - `RUST_LOG` - Log filter (default: `pitii=info,pitii_client=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pitii_client::ClientConfig;
use pitii_core::{IngredientId, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pitii")]
#[command(author, version, about = "Pitii menu CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu
    Menu,
    /// Manage products (staff)
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Show or manage a product's ingredients
    Ingredients {
        #[command(subcommand)]
        action: IngredientAction,
    },
    /// Register a new user
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Manage users (staff)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Add a product to the menu
    Add {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Price, e.g. 10 or 12.50
        #[arg(short, long)]
        price: String,

        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Edit a product; omitted fields keep their current value
    Edit {
        /// Product id
        id: ProductId,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New price
        #[arg(short, long)]
        price: Option<String>,

        /// New image file (the stored image is kept otherwise)
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum IngredientAction {
    /// List a product's ingredients
    List {
        /// Product id
        product: ProductId,
    },
    /// Add an ingredient (staff)
    Add {
        /// Product id
        product: ProductId,

        /// Ingredient name
        name: String,
    },
    /// Remove an ingredient (staff)
    Remove {
        /// Product id
        product: ProductId,

        /// Ingredient id
        ingredient: IngredientId,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List registered users
    List,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(with_sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pitii=info,pitii_client=info".into());

    let sentry_layer =
        with_sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let sentry_guard = init_sentry(&config);
    init_tracing(sentry_guard.is_some());

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::new(config)?;

    match cli.command {
        Commands::Menu => commands::menu::show(&ctx).await?,
        Commands::Product { action } => match action {
            ProductAction::Add { name, price, image } => {
                commands::menu::add(&ctx, name, price, image).await?;
            }
            ProductAction::Edit {
                id,
                name,
                price,
                image,
            } => commands::menu::edit(&ctx, id, name, price, image).await?,
            ProductAction::Delete { id } => commands::menu::delete(&ctx, id).await?,
        },
        Commands::Ingredients { action } => match action {
            IngredientAction::List { product } => {
                commands::ingredients::list(&ctx, product).await?;
            }
            IngredientAction::Add { product, name } => {
                commands::ingredients::add(&ctx, product, name).await?;
            }
            IngredientAction::Remove {
                product,
                ingredient,
            } => commands::ingredients::remove(&ctx, product, ingredient).await?,
        },
        Commands::Register {
            name,
            email,
            password,
        } => commands::users::register(&ctx, name, email, password).await?,
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&ctx).await?,
        },
    }
    Ok(())
}
