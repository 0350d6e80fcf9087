use std::path::PathBuf;

use anyhow::{Context, Result};
use buymeapie_core::{Account, Item, List, UniqueItem};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Command-line client for Buy Me a Pie shopping lists.
#[derive(Debug, Parser)]
#[command(name = "bmap", version, about)]
pub struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Show plan limits.
    Status,
    /// Show all lists.
    Lists,
    /// Show the items of a list.
    Items {
        /// List id or name.
        list: String,
        /// Include purchased and deleted items.
        #[arg(long)]
        all: bool,
    },
    /// Add an item to a list.
    Add {
        /// List id or name.
        list: String,
        /// Item title.
        name: String,
        /// Amount, e.g. "2 kg".
        #[arg(default_value = "")]
        amount: String,
    },
    /// Mark an item purchased.
    Buy {
        /// List id or name.
        list: String,
        /// Item id.
        item: String,
    },
    /// Change the amount of an item.
    Amount {
        /// List id or name.
        list: String,
        /// Item id.
        item: String,
        /// New amount.
        amount: String,
    },
    /// Delete an item.
    Remove {
        /// List id or name.
        list: String,
        /// Item id.
        item: String,
    },
    /// Create a list.
    CreateList {
        /// Name of the new list.
        name: String,
    },
    /// Rename a list.
    RenameList {
        /// List id or name.
        list: String,
        /// New name.
        name: String,
    },
    /// Delete a list.
    DeleteList {
        /// List id or name.
        list: String,
    },
    /// Show catalog entries, optionally filtered.
    Catalog {
        /// Case-insensitive substring filter.
        query: Option<String>,
    },
    /// Ask the server to drop its caches.
    ClearCache,
}

pub fn run(account: &mut Account, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            let restrictions = account.restrictions()?.clone();
            println!(
                "{}",
                format_status(
                    restrictions.premium,
                    restrictions.premium_expiration(),
                    restrictions.max_lists_count
                )
            );
        }
        Command::Lists => {
            for list in account.lists()? {
                println!("{}", format_list(list));
            }
        }
        Command::Items { list, all } => {
            let api = account.api().clone();
            let list = account.find_list(&list)?;
            let items: Vec<&Item> = if all {
                list.items(&api)?.iter().collect()
            } else {
                list.not_purchased(&api)?
            };
            for item in items {
                println!("{}", format_item(item));
            }
        }
        Command::Add { list, name, amount } => {
            let list_id = resolve(account, &list)?;
            let item = account
                .add_item(&list_id, &name, &amount)
                .with_context(|| format!("failed to add {name} to {list}"))?;
            println!("{}", format_item(&item));
        }
        Command::Buy { list, item } => {
            let list_id = resolve(account, &list)?;
            let item = account.purchase_item(&list_id, &item)?;
            println!("{}", format_item(&item));
        }
        Command::Amount { list, item, amount } => {
            let list_id = resolve(account, &list)?;
            let item = account.set_item_amount(&list_id, &item, &amount)?;
            println!("{}", format_item(&item));
        }
        Command::Remove { list, item } => {
            let list_id = resolve(account, &list)?;
            let removed = account.delete_item(&list_id, &item)?;
            println!("removed {removed}");
        }
        Command::CreateList { name } => {
            let list = account.create_list(&name)?;
            println!("created {list}");
        }
        Command::RenameList { list, name } => {
            let list_id = resolve(account, &list)?;
            let renamed = account.rename_list(&list_id, &name)?;
            println!("renamed to {renamed}");
        }
        Command::DeleteList { list } => {
            let list_id = resolve(account, &list)?;
            account.delete_list(&list_id)?;
            println!("deleted {list}");
        }
        Command::Catalog { query } => {
            let catalog = account.catalog()?;
            for entry in catalog.matching(query.as_deref().unwrap_or_default()) {
                println!("{}", format_unique(entry));
            }
        }
        Command::ClearCache => {
            account.clear_server_cache()?;
            println!("server cache cleared");
        }
    }
    Ok(())
}

fn resolve(account: &mut Account, list: &str) -> Result<String> {
    Ok(account.find_list(list)?.id().to_string())
}

fn format_status(premium: bool, expires: Option<DateTime<Utc>>, max_lists: u32) -> String {
    let plan = match (premium, expires) {
        (true, Some(expires)) => format!("premium until {}", expires.format("%Y-%m-%d")),
        (true, None) => "premium".to_string(),
        (false, _) => "free".to_string(),
    };
    format!("plan: {plan}\nmax lists: {max_lists}")
}

fn format_list(list: &List) -> String {
    let mut line = format!(
        "{:>10}  {}  [{} open, {} done]",
        list.id(),
        list.name(),
        list.not_purchased_count(),
        list.purchased_count()
    );
    if !list.emails().is_empty() {
        line.push_str(&format!("  shared with {}", list.emails().join(", ")));
    }
    line
}

fn format_item(item: &Item) -> String {
    let mark = if item.purchased() { 'x' } else { ' ' };
    format!("[{mark}] {:>10}  {item}", item.id())
}

fn format_unique(entry: &UniqueItem) -> String {
    format!(
        "#{}  {}  used {}x",
        entry.color(),
        entry,
        entry.use_count()
    )
}
