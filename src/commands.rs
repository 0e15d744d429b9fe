use crate::OutputFormat;
use asset_inventory::config::InventoryConfig;
use asset_inventory::shell::Shell;
use asset_inventory::storage::{InventoryStore, StoreStatus};
use asset_inventory::ui::{self, Icons};
use asset_inventory::{AssetDraft, Inventory, NewUser};
use std::path::Path;

fn announce(store: &InventoryStore, database: &Path) {
    match store.status() {
        StoreStatus::Created => ui::success(&format!(
            "Database '{}' created along with 'users' and 'assets' tables.",
            database.display()
        )),
        StoreStatus::Existing => {
            ui::info(&format!("{} Database", Icons::DATABASE), &format!("'{}' loaded.", database.display()))
        }
    }
}

pub fn run_menu(store: &InventoryStore, database: &Path) -> anyhow::Result<()> {
    announce(store, database);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(store, stdin.lock(), stdout.lock());
    shell.run()
}

pub fn run_init(
    store: &InventoryStore,
    database: &Path,
    config_path: Option<&Path>,
    force: bool,
) -> anyhow::Result<()> {
    announce(store, database);

    if let Some(path) = config_path {
        InventoryConfig::for_database(database).save(path, force)?;
        ui::success(&format!("Config written to {}", path.display()));
    }
    Ok(())
}

pub fn run_users(store: &InventoryStore, idle: bool, format: OutputFormat) -> anyhow::Result<()> {
    let users = if idle {
        store.list_users_without_assets()?
    } else {
        store.list_users()?
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        ui::warn("No users found.");
    } else {
        ui::header(if idle { "Users without assets" } else { "User List" });
        println!("{}", ui::users_table(&users));
    }
    Ok(())
}

pub fn run_assets(store: &InventoryStore, format: OutputFormat) -> anyhow::Result<()> {
    let rows = store.list_assets_with_user()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        ui::warn("No assets found.");
    } else {
        ui::header("Asset Inventory");
        println!("{}", ui::assets_table(&rows));
    }
    Ok(())
}

pub fn run_add_user(
    store: &InventoryStore,
    name: String,
    email: String,
    department: String,
) -> anyhow::Result<()> {
    let user_id = Inventory::new(store).add_user(&NewUser::new(name, email, department))?;
    ui::success(&format!("User added successfully! (User ID: {})", user_id));
    Ok(())
}

pub fn run_add_asset(store: &InventoryStore, draft: AssetDraft) -> anyhow::Result<()> {
    let id = Inventory::new(store).submit_asset(&draft)?;
    ui::success(&format!("Asset added successfully! (Asset ID: {})", id));
    Ok(())
}

pub fn run_remove_user(store: &InventoryStore, id: i64) -> anyhow::Result<()> {
    Inventory::new(store).remove_user(id)?;
    ui::success(&format!("User with ID {} removed successfully!", id));
    Ok(())
}

pub fn run_remove_asset(store: &InventoryStore, id: i64) -> anyhow::Result<()> {
    if Inventory::new(store).remove_asset(id)? {
        ui::success(&format!("Asset with ID {} removed successfully!", id));
    } else {
        ui::warn(&format!("Asset {} not found.", id));
    }
    Ok(())
}

pub fn run_stats(store: &InventoryStore, format: OutputFormat) -> anyhow::Result<()> {
    let stats = store.stats()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    ui::section(&format!("{} Inventory Statistics", Icons::STATS));
    println!("{}", ui::stats_table(&stats));
    ui::summary_row("Linked assets:", &store.list_assets_with_user()?.len().to_string());
    Ok(())
}
