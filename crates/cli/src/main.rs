//! Mini Vendas CLI - Storefront catalog, cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered and sorted
//! mv-cli catalog --search caneca --sort price-asc
//!
//! # Work with the persisted cart
//! mv-cli cart add 1
//! mv-cli cart set 2 3
//! mv-cli cart remove 2
//! mv-cli cart show
//! mv-cli cart clear
//!
//! # Submit the cart as an order
//! mv-cli checkout --customer "Ana"
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products (falls back to sample products if the API is down)
//! - `cart` - Show or change the cart
//! - `checkout` - Place an order for the cart contents

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mini_vendas_core::ProductId;
use mini_vendas_storefront::catalog::{CatalogQuery, SortOrder};
use mini_vendas_storefront::config::StorefrontConfig;
use mini_vendas_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::CartChange;
use commands::{CommandError, Outcome};

#[derive(Parser)]
#[command(name = "mv-cli")]
#[command(author, version, about = "Mini Vendas storefront CLI")]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Catalog {
        /// Only show products whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Ordering (`default`, `name`, `price-asc`, `price-desc`)
        #[arg(long, default_value = "default")]
        sort: SortOrder,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout {
        /// Customer name for the order
        #[arg(short, long)]
        customer: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product ID
        id: ProductId,
        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

impl CartAction {
    /// The cart mutation this action requests, or `None` for `show`.
    fn into_change(self) -> Option<CartChange> {
        match self {
            Self::Show => None,
            Self::Add { id } => Some(CartChange::Add(id)),
            Self::Set { id, quantity } => Some(CartChange::Set(id, quantity)),
            Self::Remove { id } => Some(CartChange::Remove(id)),
            Self::Clear => Some(CartChange::Clear),
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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

fn init_tracing(json_logs: bool) {
    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mini_vendas_storefront=warn,mv_cli=info".into());

    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(io::stderr)
    });
    let text_layer = (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(cli.json_logs);
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(cli.json_logs);

    match run(cli, config).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<Outcome, CommandError> {
    let mut state = AppState::from_config(config)?;
    let mut out = io::stdout().lock();

    let outcome = match cli.command {
        Commands::Catalog { search, sort } => {
            let query = CatalogQuery { search, sort };
            commands::catalog::list(&mut state, &query, &mut out).await?
        }
        Commands::Cart { action } => match action.into_change() {
            Some(change) => commands::cart::apply(&mut state, change, &mut out).await?,
            None => commands::cart::show(&mut state, &mut out).await?,
        },
        Commands::Checkout { customer } => {
            commands::checkout::run(&mut state, &customer, &mut out).await?
        }
    };

    out.flush()?;
    Ok(outcome)
}
