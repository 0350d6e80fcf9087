use std::fmt;

use tracing::{debug, info};

use crate::{
    account::{Cached, Catalog},
    error::{Error, Result},
    models::{ItemRecord, ListRecord, ListUpdate, NewItem},
    transport::Api,
};

use super::Item;

/// A shopping list and its lazily fetched items.
#[derive(Debug, Clone)]
pub struct List {
    record: ListRecord,
    items: Cached<Vec<Item>>,
}

impl List {
    /// Wrap a server record. Items are fetched on first access.
    pub fn new(record: ListRecord) -> Self {
        Self {
            record,
            items: Cached::unloaded(),
        }
    }

    /// Server-assigned id.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Collaborators the list is shared with.
    pub fn emails(&self) -> &[String] {
        &self.record.emails
    }

    /// Purchased item count as last reported by the server.
    pub fn purchased_count(&self) -> u32 {
        self.record.items_purchased
    }

    /// Outstanding item count as last reported by the server.
    pub fn not_purchased_count(&self) -> u32 {
        self.record.items_not_purchased
    }

    /// Last known server snapshot.
    pub fn record(&self) -> &ListRecord {
        &self.record
    }

    /// Endpoint of this list.
    pub fn endpoint(&self) -> String {
        format!("lists/{}", self.record.id)
    }

    /// Whether the items have been fetched.
    pub fn items_loaded(&self) -> bool {
        self.items.is_loaded()
    }

    /// All items, fetched once and then kept in sync locally.
    pub fn items(&mut self, api: &Api) -> Result<&[Item]> {
        Ok(self.loaded_items(api)?.as_slice())
    }

    /// Items that are neither purchased nor deleted.
    pub fn not_purchased(&mut self, api: &Api) -> Result<Vec<&Item>> {
        Ok(self
            .loaded_items(api)?
            .iter()
            .filter(|item| !item.purchased())
            .collect())
    }

    /// Look up an item by id.
    pub fn item_mut(&mut self, api: &Api, item_id: &str) -> Result<&mut Item> {
        let list_id = self.record.id.clone();
        self.loaded_items(api)?
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or_else(|| Error::UnknownItem {
                list: list_id,
                item: item_id.to_string(),
            })
    }

    /// Add `name` to the list.
    ///
    /// The catalog entry for `name` is bumped first (and created if missing),
    /// then the item is created. If the second step fails the usage count
    /// stays bumped.
    pub fn add_item(
        &mut self,
        api: &Api,
        catalog: &mut Catalog,
        name: &str,
        amount: &str,
    ) -> Result<Item> {
        catalog.get_or_create(api, name, 0)?.update_use(api)?;

        let body = NewItem {
            amount,
            is_purchased: false,
            title: name,
        };
        let record: ItemRecord = api.post(&format!("{}/items", self.endpoint()), &body)?;
        let item = Item::new(self.record.id.clone(), record);
        info!("added {} to list {}", item, self);

        if let Some(items) = self.items.get_mut() {
            items.push(item.clone());
        }
        Ok(item)
    }

    /// Mark an item purchased.
    pub fn purchase_item(&mut self, api: &Api, item_id: &str) -> Result<&Item> {
        let item = self.item_mut(api, item_id)?;
        item.purchase(api)?;
        Ok(item)
    }

    /// Change the amount of an item.
    pub fn set_item_amount(&mut self, api: &Api, item_id: &str, amount: &str) -> Result<&Item> {
        let item = self.item_mut(api, item_id)?;
        item.set_amount(api, amount)?;
        Ok(item)
    }

    /// Delete an item on the server and drop it from the local sequence.
    pub fn delete_item(&mut self, api: &Api, item_id: &str) -> Result<Item> {
        let list_id = self.record.id.clone();
        let items = self.loaded_items(api)?;
        let index = items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or_else(|| Error::UnknownItem {
                list: list_id,
                item: item_id.to_string(),
            })?;

        api.delete(&items[index].endpoint())?;
        let removed = items.remove(index);
        info!("deleted {} from list {}", removed, self.record.name);
        Ok(removed)
    }

    /// Items changed since `since` (server timestamp). Not cached.
    pub fn changed_items(&self, api: &Api, since: i64) -> Result<Vec<Item>> {
        let records: Vec<ItemRecord> =
            api.get(&format!("{}/changed_items/{}", self.endpoint(), since))?;
        Ok(records
            .into_iter()
            .map(|record| Item::new(self.record.id.clone(), record))
            .collect())
    }

    /// Rename on the server. The collaborators are resent since the API
    /// requires both fields. Session caches must be reset afterwards.
    pub(crate) fn rename(&mut self, api: &Api, name: &str) -> Result<()> {
        let update = ListUpdate {
            emails: &self.record.emails,
            name,
        };
        self.record = api.put(&self.endpoint(), &update)?;
        Ok(())
    }

    /// Delete on the server. The proxy is consumed.
    pub(crate) fn delete(self, api: &Api) -> Result<()> {
        api.delete(&self.endpoint())?;
        info!("deleted list {}", self);
        Ok(())
    }

    fn loaded_items(&mut self, api: &Api) -> Result<&mut Vec<Item>> {
        let list_id = &self.record.id;
        self.items.get_or_try_load(|| {
            debug!("fetching items of list {}", list_id);
            let records: Vec<ItemRecord> = api.get(&format!("lists/{list_id}/items"))?;
            Ok(records
                .into_iter()
                .map(|record| Item::new(list_id.clone(), record))
                .collect())
        })
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.record.name, self.record.id)
    }
}
