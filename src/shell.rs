//! Interactive menu shell
//!
//! Drives the inventory from line-oriented input: each field is read,
//! validated on its own and asked for again until it parses. Records are
//! only written once every field has been accepted. Entering `0` at a
//! removal prompt cancels, and closing the input leaves the menu cleanly.

use std::io::{BufRead, Write};

use owo_colors::OwoColorize;
use tracing::debug;

use crate::inventory::Inventory;
use crate::model::{self, AssetEdit, NewAsset, NewUser, UserEdit, SUGGESTED_STATUSES};
use crate::storage::InventoryStore;
use crate::ui::{assets_table, theme, users_table, Icons};
use crate::validate::{self, Field, UserResolution, ValidationError};
use crate::Error;

/// Input ended while a prompt was waiting
#[derive(Debug, thiserror::Error)]
#[error("input closed")]
struct InputClosed;

const MAIN_MENU: &[&str] = &[
    "Add Users and/or Assets",
    "Remove an entry from the Database",
    "View Database Tables",
    "Edit an Entry",
    "Exit",
];
const ADD_MENU: &[&str] = &["Add User", "Add Asset", "Return to Menu"];
const REMOVE_MENU: &[&str] = &["Remove an Asset", "Remove a User", "Return to Menu"];
const VIEW_MENU: &[&str] = &["View Inventory", "View Users", "Return to Menu"];
const EDIT_MENU: &[&str] = &["Edit User Entry", "Edit Asset Entry", "Return to Menu"];

/// Menu loop over an input/output pair
pub struct Shell<'a, R, W> {
    inventory: Inventory<'a>,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(store: &'a InventoryStore, input: R, out: W) -> Self {
        Self {
            inventory: Inventory::new(store),
            input,
            out,
        }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the main menu until the operator exits or the input closes.
    /// Only storage and terminal faults come back as errors.
    pub fn run(&mut self) -> anyhow::Result<()> {
        match self.main_menu() {
            Err(e) if e.downcast_ref::<InputClosed>().is_some() => {
                debug!("Input closed, leaving menu");
                Ok(())
            }
            other => other,
        }
    }

    fn main_menu(&mut self) -> anyhow::Result<()> {
        loop {
            match self.choose("Asset Inventory Management", MAIN_MENU)? {
                1 => self.add_menu()?,
                2 => self.remove_menu()?,
                3 => self.view_menu()?,
                4 => self.edit_menu()?,
                _ => {
                    self.say("Exiting program...")?;
                    return Ok(());
                }
            }
        }
    }

    fn add_menu(&mut self) -> anyhow::Result<()> {
        loop {
            match self.choose("Adding assets and/or users", ADD_MENU)? {
                1 => self.add_user()?,
                2 => self.add_asset()?,
                _ => return self.say("Returning to menu..."),
            }
        }
    }

    fn remove_menu(&mut self) -> anyhow::Result<()> {
        loop {
            match self.choose("Removing entries", REMOVE_MENU)? {
                1 => self.remove_asset()?,
                2 => self.remove_user()?,
                _ => return self.say("Returning to menu..."),
            }
        }
    }

    fn view_menu(&mut self) -> anyhow::Result<()> {
        loop {
            match self.choose("Viewing asset or user tables", VIEW_MENU)? {
                1 => self.view_inventory()?,
                2 => self.view_users()?,
                _ => return self.say("Returning to menu..."),
            }
        }
    }

    fn edit_menu(&mut self) -> anyhow::Result<()> {
        loop {
            match self.choose("Edit Entries", EDIT_MENU)? {
                1 => self.edit_user()?,
                2 => self.edit_asset()?,
                _ => return self.say("Returning to menu..."),
            }
        }
    }

    // ========== Adding ==========

    fn add_user(&mut self) -> anyhow::Result<()> {
        let name = self.ask("Enter user name: ", |s| validate::require_text(Field::Name, s))?;
        let email = self.ask("Enter user email: ", |s| validate::require_text(Field::Email, s))?;
        let department =
            self.ask("Enter user department: ", |s| validate::require_text(Field::Department, s))?;

        match self.inventory.add_user(&NewUser::new(name, email, department)) {
            Ok(user_id) => self.success(&format!("User added successfully! (User ID: {})", user_id)),
            Err(e) => self.report(e),
        }
    }

    fn add_asset(&mut self) -> anyhow::Result<()> {
        let name = self.ask("Enter asset name: ", |s| validate::require_text(Field::Name, s))?;
        let category =
            self.ask("Enter asset category: ", |s| validate::require_text(Field::Category, s))?;
        let purchase_date =
            self.ask("Enter purchase date (YYYY-MM-DD): ", |s| validate::validate_date(s.trim()))?;
        let purchase_price = self.ask("Enter purchase price: ", validate::validate_price)?;
        let status = self.read_line(&format!("Enter status ({}): ", SUGGESTED_STATUSES.join("/")))?;
        let location = self.read_line("Enter asset location: ")?;

        let user_id = loop {
            let text = self.read_line("Enter user ID to assign the asset to: ")?;
            match self.inventory.resolve_user(&text)? {
                UserResolution::Valid(user) => break user.user_id,
                UserResolution::NotFound(id) => {
                    self.warn(&format!("The user ID {} was not found. Please add the user now.", id))?;
                    self.add_user()?;
                }
                UserResolution::Malformed(e) => self.error(&e.to_string())?,
            }
        };

        let asset = NewAsset {
            name,
            category,
            purchase_date,
            purchase_price,
            status: status.trim().to_string(),
            location: location.trim().to_string(),
            user_id,
        };
        match self.inventory.add_asset(&asset) {
            Ok(id) => self.success(&format!("Asset added successfully! (Asset ID: {})", id)),
            Err(e) => self.report(e),
        }
    }

    // ========== Removing ==========

    fn remove_asset(&mut self) -> anyhow::Result<()> {
        if self.inventory.store().count_assets()? == 0 {
            return self.say("There are no assets in the inventory.");
        }
        self.view_inventory()?;

        let id = self.ask("Enter asset ID to remove or type 0 to cancel: ", validate::parse_id)?;
        if id == 0 {
            return self.say("Operation cancelled.");
        }

        if self.inventory.remove_asset(id)? {
            self.success(&format!("Asset with ID {} removed successfully!", id))
        } else {
            self.error("Asset not found.")
        }
    }

    fn remove_user(&mut self) -> anyhow::Result<()> {
        let users = self.inventory.deletable_users()?;
        if users.is_empty() {
            return self.say("There are no users that can be removed as all are linked to existing assets.");
        }

        self.heading("Users without assets")?;
        let table = users_table(&users);
        writeln!(self.out, "{}", table)?;

        let user_id = self.ask("Enter user ID to remove or type 0 to cancel: ", validate::parse_id)?;
        if user_id == 0 {
            return self.say("Operation cancelled.");
        }

        match self.inventory.remove_user(user_id) {
            Ok(()) => self.success(&format!("User with ID {} removed successfully!", user_id)),
            Err(e) if e.is_recoverable() => {
                self.error(&format!("User not found or user is linked to an asset ({}).", e))
            }
            Err(e) => Err(e.into()),
        }
    }

    // ========== Viewing ==========

    fn view_inventory(&mut self) -> anyhow::Result<()> {
        let rows = self.inventory.store().list_assets_with_user()?;
        if rows.is_empty() {
            return self.say("No assets found.");
        }
        self.heading("Asset Inventory")?;
        let table = assets_table(&rows);
        writeln!(self.out, "{}", table)?;
        Ok(())
    }

    fn view_users(&mut self) -> anyhow::Result<()> {
        let users = self.inventory.store().list_users()?;
        if users.is_empty() {
            return self.say("No users found.");
        }
        self.heading("User List")?;
        let table = users_table(&users);
        writeln!(self.out, "{}", table)?;
        Ok(())
    }

    // ========== Editing ==========

    fn edit_user(&mut self) -> anyhow::Result<()> {
        self.view_users()?;
        let user_id = self.ask("Enter the user ID to edit: ", validate::parse_id)?;

        let Some(user) = self.inventory.store().find_user_by_id(user_id)? else {
            return self.error("User not found.");
        };

        let name = self.read_line(&format!("Enter new name (current: {}): ", user.name))?;
        let email = self.read_line(&format!("Enter new email (current: {}): ", user.email))?;
        let department =
            self.read_line(&format!("Enter new department (current: {}): ", user.department))?;

        let edit = UserEdit::from_inputs(&name, &email, &department);
        match self.inventory.edit_user(user_id, &edit) {
            Ok(_) => self.success("User updated successfully!"),
            Err(e) => self.report(e),
        }
    }

    fn edit_asset(&mut self) -> anyhow::Result<()> {
        self.view_inventory()?;
        let id = self.ask("Enter the asset ID to edit: ", validate::parse_id)?;

        let asset = match self.inventory.store().find_asset_by_id(id) {
            Ok(Some(asset)) => asset,
            Ok(None) => return self.error("Asset not found."),
            Err(e) => return self.report(e),
        };

        let name = self.read_line(&format!("Enter new asset name (current: {}): ", asset.name))?;
        let category =
            self.read_line(&format!("Enter new category (current: {}): ", asset.category))?;
        let purchase_date = self.ask_optional(
            &format!("Enter new purchase date (current: {}): ", asset.purchase_date),
            |s| validate::validate_date(s).map(|_| ()),
        )?;
        let purchase_price = self.ask_optional(
            &format!("Enter new purchase price (current: {}): ", asset.purchase_price),
            |s| validate::validate_price(s).map(|_| ()),
        )?;
        let status = self.read_line(&format!("Enter new status (current: {}): ", asset.status))?;
        let location =
            self.read_line(&format!("Enter new location (current: {}): ", asset.location))?;

        let user_id = loop {
            let text = self.read_line(&format!("Enter new user ID (current: {}): ", asset.user_id))?;
            let Some(text) = model::non_blank(&text) else {
                break None;
            };
            match self.inventory.resolve_user(&text)? {
                UserResolution::Valid(_) => break Some(text),
                UserResolution::NotFound(_) => {
                    self.error("The user ID was not found. Please enter a valid user ID.")?
                }
                UserResolution::Malformed(e) => self.error(&e.to_string())?,
            }
        };

        let edit = AssetEdit {
            name: model::non_blank(&name),
            category: model::non_blank(&category),
            purchase_date,
            purchase_price,
            status: model::non_blank(&status),
            location: model::non_blank(&location),
            user_id,
        };
        match self.inventory.edit_asset(id, &edit) {
            Ok(_) => self.success("Asset updated successfully!"),
            Err(e) => self.report(e),
        }
    }

    // ========== Prompting ==========

    fn choose(&mut self, title: &str, options: &[&str]) -> anyhow::Result<usize> {
        loop {
            self.heading(title)?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.out, "{}. {}", i + 1, option)?;
            }

            let answer = self.read_line("Enter your choice: ")?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n),
                _ => self.error("Invalid choice. Please try again.")?,
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> anyhow::Result<String> {
        write!(self.out, "{}", prompt.style(theme().prompt.clone()))?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer
    fn ask<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> anyhow::Result<T> {
        loop {
            let line = self.read_line(prompt)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => self.error(&e.to_string())?,
            }
        }
    }

    /// Like `ask`, but a blank answer means "keep the current value" and
    /// yields `None`. Accepted answers are returned as trimmed text.
    fn ask_optional(
        &mut self,
        prompt: &str,
        check: impl Fn(&str) -> Result<(), ValidationError>,
    ) -> anyhow::Result<Option<String>> {
        loop {
            let line = self.read_line(prompt)?;
            let Some(text) = model::non_blank(&line) else {
                return Ok(None);
            };
            match check(&text) {
                Ok(()) => return Ok(Some(text)),
                Err(e) => self.error(&e.to_string())?,
            }
        }
    }

    /// Show a recoverable error and carry on; hand anything else back
    fn report(&mut self, err: Error) -> anyhow::Result<()> {
        if err.is_recoverable() {
            self.error(&err.to_string())
        } else {
            Err(err.into())
        }
    }

    // ========== Output ==========

    fn heading(&mut self, title: &str) -> anyhow::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", title.style(theme().header.clone()))?;
        writeln!(self.out, "{}", "-".repeat(28).style(theme().dim.clone()))?;
        Ok(())
    }

    fn say(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn success(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{} {}", Icons::CHECK, text.style(theme().success.clone()))?;
        Ok(())
    }

    fn warn(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{} {}", Icons::WARN, text.style(theme().warn.clone()))?;
        Ok(())
    }

    fn error(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{} {}", Icons::CROSS, text.style(theme().error.clone()))?;
        Ok(())
    }
}
