//! Account session: authentication, lazily fetched reference data and the
//! structural operations that keep the caches honest.

mod cache;
mod catalog;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    entities::{unique_item::unique_item_endpoint, Item, List, UniqueItem},
    error::{Error, Result},
    models::{ListRecord, NewList, NewUniqueItem, Restrictions, UniqueItemRecord},
    transport::{Api, HttpTransport, Method},
};

pub use cache::Cached;
pub use catalog::Catalog;

/// A logged-in account and everything fetched through it.
///
/// Every cache belongs to this value, so several sessions can live side by
/// side. A session is single-threaded: it is neither `Send` nor `Sync`.
#[derive(Debug)]
pub struct Account {
    api: Api,
    account_info: Option<Value>,
    restrictions: Cached<Restrictions>,
    lists: Cached<Vec<List>>,
    catalog: Cached<Catalog>,
}

impl Account {
    /// Open a session over HTTP, logging in right away when configured to.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let mut account = Self::with_api(Api::new(config.base_url.clone(), transport));
        if config.autologin {
            account.login()?;
        }
        Ok(account)
    }

    /// Session over an existing API handle. Nothing is fetched yet.
    pub fn with_api(api: Api) -> Self {
        Self {
            api,
            account_info: None,
            restrictions: Cached::unloaded(),
            lists: Cached::unloaded(),
            catalog: Cached::unloaded(),
        }
    }

    /// Handle for calling entity methods directly.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Authenticate. The answer is kept as-is.
    pub fn login(&mut self) -> Result<&Value> {
        let info = self.api.request(Method::GET, "bauth", None)?;
        info!("logged in to {}", self.api.base_url());
        Ok(self.account_info.insert(info))
    }

    /// Whatever the auth endpoint answered, if logged in.
    pub fn account_info(&self) -> Option<&Value> {
        self.account_info.as_ref()
    }

    /// Drop every local cache; the next access refetches.
    pub fn refresh_all(&mut self) {
        debug!("resetting all session caches");
        self.restrictions.reset();
        self.lists.reset();
        self.catalog.reset();
    }

    /// Ask the server to drop its caches. Local caches are left alone.
    pub fn clear_server_cache(&self) -> Result<()> {
        self.api.put_ignoring_answer::<Value>("clear_cache", None)?;
        Ok(())
    }

    /// Plan limits.
    pub fn restrictions(&mut self) -> Result<&Restrictions> {
        let api = &self.api;
        let restrictions = self.restrictions.get_or_try_load(|| {
            debug!("fetching restrictions");
            api.get("restrictions")
        })?;
        Ok(restrictions)
    }

    /// Whether the account has premium.
    pub fn premium(&mut self) -> Result<bool> {
        Ok(self.restrictions()?.premium)
    }

    /// When premium runs out.
    pub fn premium_expiration(&mut self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.restrictions()?.premium_expiration())
    }

    /// Maximum number of lists the plan allows.
    pub fn max_lists(&mut self) -> Result<u32> {
        Ok(self.restrictions()?.max_lists_count)
    }

    /// All lists of the account.
    pub fn lists(&mut self) -> Result<&[List]> {
        Ok(self.loaded_lists()?.as_slice())
    }

    /// List by id.
    pub fn list_mut(&mut self, list_id: &str) -> Result<&mut List> {
        self.loaded_lists()?
            .iter_mut()
            .find(|list| list.id() == list_id)
            .ok_or_else(|| Error::UnknownList(list_id.to_string()))
    }

    /// List by id, or else by exact name.
    pub fn find_list(&mut self, id_or_name: &str) -> Result<&mut List> {
        let lists = self.loaded_lists()?;
        let position = lists
            .iter()
            .position(|list| list.id() == id_or_name)
            .or_else(|| lists.iter().position(|list| list.name() == id_or_name))
            .ok_or_else(|| Error::UnknownList(id_or_name.to_string()))?;
        Ok(&mut lists[position])
    }

    /// The unique-item catalog with its name index.
    pub fn catalog(&mut self) -> Result<&mut Catalog> {
        let api = &self.api;
        self.catalog.get_or_try_load(|| {
            debug!("fetching unique items");
            Catalog::fetch(api)
        })
    }

    /// All unique items.
    pub fn unique_items(&mut self) -> Result<&[UniqueItem]> {
        Ok(self.catalog()?.items())
    }

    /// Catalog entry called `name`, created with one use if missing.
    pub fn get_or_create_unique(&mut self, name: &str, group_id: i64) -> Result<&mut UniqueItem> {
        let api = self.api.clone();
        self.catalog()?.get_or_create(&api, name, group_id)
    }

    /// Create a list. The cached lists are not updated.
    pub fn create_list(&self, name: &str) -> Result<List> {
        let body = NewList {
            items_not_purchased: 0,
            items_purchased: 0,
            name,
        };
        let record: ListRecord = self.api.post("lists", &body)?;
        let list = List::new(record);
        info!("created list {}", list);
        Ok(list)
    }

    /// Create an unused, non-permanent catalog entry. The cached catalog is
    /// not updated.
    pub fn create_unique_item(&self, name: &str, group_id: i64) -> Result<UniqueItem> {
        let body = NewUniqueItem {
            group_id,
            permanent: Some(false),
            use_count: 0,
        };
        let record: UniqueItemRecord = self.api.put(&unique_item_endpoint(name), &body)?;
        Ok(UniqueItem::new(record))
    }

    /// Rename a list, then reset every cache.
    pub fn rename_list(&mut self, list_id: &str, name: &str) -> Result<List> {
        let api = self.api.clone();
        let list = self.list_mut(list_id)?;
        let old_name = list.name().to_string();
        list.rename(&api, name)?;
        let renamed = list.clone();
        info!("renamed list {} to {}", old_name, renamed);
        self.refresh_all();
        Ok(renamed)
    }

    /// Delete a list. The list cache is invalidated whatever the outcome.
    pub fn delete_list(&mut self, list_id: &str) -> Result<()> {
        let api = self.api.clone();
        let lists = self.loaded_lists()?;
        let position = lists
            .iter()
            .position(|list| list.id() == list_id)
            .ok_or_else(|| Error::UnknownList(list_id.to_string()))?;
        let list = lists.remove(position);
        let result = list.delete(&api);
        self.lists.invalidate();
        result
    }

    /// Add an item to a list, bumping its catalog entry.
    pub fn add_item(&mut self, list_id: &str, name: &str, amount: &str) -> Result<Item> {
        let Self {
            api, lists, catalog, ..
        } = self;
        let catalog = catalog.get_or_try_load(|| Catalog::fetch(api))?;
        let list = lists
            .get_or_try_load(|| fetch_lists(api))?
            .iter_mut()
            .find(|list| list.id() == list_id)
            .ok_or_else(|| Error::UnknownList(list_id.to_string()))?;
        list.add_item(api, catalog, name, amount)
    }

    /// Mark an item of a list purchased.
    pub fn purchase_item(&mut self, list_id: &str, item_id: &str) -> Result<Item> {
        let api = self.api.clone();
        Ok(self.list_mut(list_id)?.purchase_item(&api, item_id)?.clone())
    }

    /// Change the amount of an item of a list.
    pub fn set_item_amount(&mut self, list_id: &str, item_id: &str, amount: &str) -> Result<Item> {
        let api = self.api.clone();
        Ok(self
            .list_mut(list_id)?
            .set_item_amount(&api, item_id, amount)?
            .clone())
    }

    /// Delete an item of a list.
    pub fn delete_item(&mut self, list_id: &str, item_id: &str) -> Result<Item> {
        let api = self.api.clone();
        self.list_mut(list_id)?.delete_item(&api, item_id)
    }

    fn loaded_lists(&mut self) -> Result<&mut Vec<List>> {
        let api = &self.api;
        self.lists.get_or_try_load(|| fetch_lists(api))
    }
}

fn fetch_lists(api: &Api) -> Result<Vec<List>> {
    debug!("fetching lists");
    let records: Vec<ListRecord> = api.get("lists")?;
    Ok(records.into_iter().map(List::new).collect())
}
