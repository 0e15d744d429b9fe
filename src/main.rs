//! Asset Inventory CLI - menu-driven and scriptable access to the inventory database

mod commands;

use anyhow::Context;
use asset_inventory::config::{InventoryConfig, CONFIG_FILE};
use asset_inventory::storage::InventoryStore;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "asset-inventory")]
#[command(version)]
#[command(about = "Track users and the assets assigned to them")]
#[command(long_about = r#"
Asset Inventory keeps users and physical assets in a single SQLite file.
Every asset belongs to an existing user, and users can only be removed once
no asset points at them.

Run without a subcommand to open the interactive menu.

Example usage:
  asset-inventory
  asset-inventory add-user --name Ada --email a@x.com --department Eng
  asset-inventory add-asset --name Laptop --category HW --purchase-date 2024-01-15 \
      --purchase-price 999 --status Available --location HQ --user-id 1
  asset-inventory assets --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file
    #[arg(short, long, global = true, env = "ASSET_INVENTORY_DB")]
    database: Option<PathBuf>,

    /// Path to the config file (defaults to inventory.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive menu (default)
    Menu,

    /// Create the database if needed and report its state
    Init {
        /// Also write a config file pointing at the database
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List users
    Users {
        /// Only users with no assigned assets
        #[arg(long)]
        idle: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List assets together with their users
    Assets {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Add a user
    AddUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        department: String,
    },

    /// Add an asset assigned to an existing user
    AddAsset {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        /// Purchase date as YYYY-MM-DD
        #[arg(long)]
        purchase_date: String,

        #[arg(long, allow_hyphen_values = true)]
        purchase_price: String,

        /// Free text, e.g. Available, In Use, Out of Service
        #[arg(long, default_value = "Available")]
        status: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long)]
        user_id: String,
    },

    /// Remove a user that has no assets
    RemoveUser {
        /// User ID
        id: i64,
    },

    /// Remove an asset
    RemoveAsset {
        /// Asset ID
        id: i64,
    },

    /// Show inventory statistics
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps the menu output clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = InventoryConfig::load(cli.config.as_deref())?;
    let database = settings.database_path(cli.database.as_deref())?;

    tracing::debug!("Using database {}", database.display());
    let store = InventoryStore::open(&database)
        .with_context(|| format!("failed to open database {}", database.display()))?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => commands::run_menu(&store, &database),
        Commands::Init { write_config, force } => {
            let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
            commands::run_init(&store, &database, write_config.then_some(config_path.as_path()), force)
        }
        Commands::Users { idle, format } => commands::run_users(&store, idle, format),
        Commands::Assets { format } => commands::run_assets(&store, format),
        Commands::AddUser { name, email, department } => {
            commands::run_add_user(&store, name, email, department)
        }
        Commands::AddAsset {
            name,
            category,
            purchase_date,
            purchase_price,
            status,
            location,
            user_id,
        } => commands::run_add_asset(
            &store,
            asset_inventory::AssetDraft {
                name,
                category,
                purchase_date,
                purchase_price,
                status,
                location,
                user_id,
            },
        ),
        Commands::RemoveUser { id } => commands::run_remove_user(&store, id),
        Commands::RemoveAsset { id } => commands::run_remove_asset(&store, id),
        Commands::Stats { format } => commands::run_stats(&store, format),
    }
}
